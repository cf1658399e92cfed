//! HTTP client for the three service endpoints.

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::http::build_client;
use crate::types::{AnalysisResult, AppConfig, ChatReply, ChatRequest};
use serde::de::DeserializeOwned;
use tracing::debug;

const CONFIG_PATH: &str = "/api/config";
const RESULTS_PATH: &str = "/api/results";
const CHAT_PATH: &str = "/api/chat";

/// Client for the analysis service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish()
    }
}

impl ApiClient {
    /// Create a client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an invalid configuration and
    /// [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET /api/config`.
    pub async fn fetch_config(&self) -> Result<AppConfig> {
        self.get_json(CONFIG_PATH).await
    }

    /// `GET /api/results`. Order is preserved as received (newest first).
    pub async fn fetch_results(&self) -> Result<Vec<AnalysisResult>> {
        self.get_json(RESULTS_PATH).await
    }

    /// `POST /api/chat` and return the assistant's reply.
    ///
    /// # Errors
    ///
    /// Any non-2xx response is [`ApiError::Status`].
    pub async fn send_chat(&self, message: &str) -> Result<String> {
        let url = self.config.endpoint(CHAT_PATH);
        debug!(%url, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message: message.to_owned(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("{CHAT_PATH} request failed: {e}")))?;

        let reply: ChatReply = decode(CHAT_PATH, response).await?;
        Ok(reply.reply)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T> {
        let url = self.config.endpoint(path);
        debug!(%url, "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("{path} request failed: {e}")))?;

        decode(path, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Http(format!("{endpoint} body read failed: {e}")))?;

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
}
