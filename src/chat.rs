//! Conversational schedule adjustment.
//!
//! A chat instruction can change the server-side interval or tracked
//! language, so every successful reply is followed by one store refresh
//! before the reply is appended. The caller recomputes the schedule from the
//! refreshed store.

use crate::source::{AnalysisSource, ChatTransport};
use crate::store::DataStore;
use serde::Serialize;
use tracing::{debug, warn};

/// Who wrote a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person using the dashboard.
    User,
    /// The service's assistant.
    Bot,
}

/// One line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Monotonic within a session.
    pub id: u64,
    /// Author.
    pub sender: Sender,
    /// Message text. Bot replies may contain `**bold**` markup.
    pub text: String,
    /// Set on bot lines that report a failed exchange.
    pub is_error: bool,
}

/// Whether the post-reply refresh ran and how it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The exchange failed, so nothing was refreshed.
    NotAttempted,
    /// The store now holds fresh data.
    Refreshed,
    /// The store kept its previous data.
    Failed(String),
}

/// Result of one [`ChatSession::send`].
#[derive(Debug, Clone)]
pub struct ChatExchange {
    /// The user's line as appended to the transcript.
    pub user: ChatMessage,
    /// The bot's reply, or a bot-styled error line.
    pub reply: ChatMessage,
    /// What happened to the store afterwards.
    pub refresh: RefreshOutcome,
}

const GREETINGS: [&str; 2] = [
    "Hi! I'm your GitHub trending analysis assistant.",
    "Chat with me to adjust the analysis task settings.",
];

/// Transcript plus the transport used to talk to the assistant.
pub struct ChatSession<T> {
    transport: T,
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl<T> std::fmt::Debug for ChatSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("messages", &self.messages.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T: ChatTransport> ChatSession<T> {
    /// Start a conversation seeded with the greeting lines.
    pub fn new(transport: T) -> Self {
        let mut session = Self {
            transport,
            messages: Vec::new(),
            next_id: 1,
        };
        for line in GREETINGS {
            session.push(Sender::Bot, line.to_owned(), false);
        }
        session
    }

    /// Full transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send `text` and, if the assistant answered, refresh `store`.
    ///
    /// # Errors
    ///
    /// Only blank input is rejected. Transport failures are reported in the
    /// transcript as a bot error line.
    pub async fn send<S: AnalysisSource>(
        &mut self,
        text: &str,
        store: &mut DataStore<S>,
    ) -> crate::Result<ChatExchange> {
        let text = text.trim();
        if text.is_empty() {
            return Err(crate::WatchError::Chat("message is empty".into()));
        }

        let user = self.push(Sender::User, text.to_owned(), false);
        debug!(id = user.id, "sending chat message");

        match self.transport.send_chat(text).await {
            Ok(reply_text) => {
                let refresh = match store.refresh(false).await {
                    Ok(_) => RefreshOutcome::Refreshed,
                    Err(e) => RefreshOutcome::Failed(e.to_string()),
                };
                let reply = self.push(Sender::Bot, reply_text, false);
                Ok(ChatExchange {
                    user,
                    reply,
                    refresh,
                })
            }
            Err(e) => {
                warn!("chat exchange failed: {e}");
                let reply = self.push(Sender::Bot, format!("error: {e}"), true);
                Ok(ChatExchange {
                    user,
                    reply,
                    refresh: RefreshOutcome::NotAttempted,
                })
            }
        }
    }

    fn push(&mut self, sender: Sender, text: String, is_error: bool) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            sender,
            text,
            is_error,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}
