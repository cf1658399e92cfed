//! Wire types exchanged with the analysis service.

use serde::{Deserialize, Deserializer, Serialize};

/// One repository analysis produced by the service.
///
/// Results are replaced wholesale on every poll; nothing patches a single
/// entry. The service returns the newest analysis first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Service-assigned identifier.
    pub id: i64,
    /// `owner/name` of the analysed repository.
    pub repo_name: String,
    /// Link to the repository.
    pub repo_url: String,
    /// Raw timestamp as sent by the service. It is UTC even when it carries
    /// no zone designator.
    pub analysis_timestamp: String,
    /// Single-sentence summary.
    #[serde(default)]
    pub one_liner_summary: String,
    /// Languages, frameworks and libraries.
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Most important features or goals.
    #[serde(default)]
    pub key_features: Vec<String>,
    /// What the community appears to care about.
    #[serde(default)]
    pub community_focus: Vec<String>,
}

/// Server-side task configuration.
///
/// The service stores its config as a key/value table, so either key can be
/// missing from the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language whose trending page is analysed (opaque label).
    #[serde(default)]
    pub trending_language: Option<String>,
    /// Polling interval in minutes, string-encoded. Integers on the wire are
    /// accepted and kept in their decimal form.
    #[serde(default, deserialize_with = "string_or_integer")]
    pub schedule_interval_minutes: Option<String>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's utterance.
    pub message: String,
}

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The assistant's answer.
    pub reply: String,
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    }))
}
