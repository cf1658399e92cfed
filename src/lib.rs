//! Trendwatch: a client for a GitHub-trending analysis service.
//!
//! The service periodically analyses trending repositories and exposes its
//! results, its task configuration and a chat endpoint that can change that
//! configuration. This crate keeps a local view of the service fresh without
//! polling blindly:
//!
//! - **store**: holds the last good `(config, results)` pair and fetches both
//!   together, all or nothing
//! - **scheduler**: derives the next poll from the newest result's timestamp
//!   plus the configured interval, and owns the single pending timer
//! - **chat**: sends instructions to the service and refreshes afterwards,
//!   because a reply may have changed the schedule
//! - **session**: runs all of the above on one task, one event at a time
//!
//! HTTP lives in the `trendwatch-api` workspace crate.

pub mod chat;
pub mod clock;
pub mod config;
pub mod dirs;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod status;
pub mod store;
pub mod theme;

#[cfg(test)]
mod test_utils;

pub use chat::{ChatMessage, ChatSession, Sender};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ClientConfig;
pub use error::{Result, WatchError};
pub use scheduler::{IdleReason, RefreshScheduler, SchedulePhase, ScheduleState};
pub use session::{Session, SessionCommand, SessionEvent, SessionHandle, SessionOptions};
pub use source::{AnalysisSource, ChatTransport};
pub use status::StatusSummary;
pub use store::{DataStore, LoadState};
pub use theme::ThemePreference;
pub use trendwatch_api::{AnalysisResult, ApiClient, ApiConfig, AppConfig};
