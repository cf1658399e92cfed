//! # trendwatch-api
//!
//! Typed client for the trending-repository analysis service.
//!
//! The service exposes three endpoints:
//!
//! - `GET /api/config` returns the server-side task configuration
//! - `GET /api/results` returns the latest analyses, newest first
//! - `POST /api/chat` takes a user instruction and returns a reply; the
//!   instruction may change the server-side configuration
//!
//! This crate only moves data. Scheduling and caching live in `trendwatch`.
//!
//! ```no_run
//! # async fn example() -> trendwatch_api::Result<()> {
//! let client = trendwatch_api::ApiClient::new(trendwatch_api::ApiConfig::default())?;
//! let results = client.fetch_results().await?;
//! for result in &results {
//!     println!("{}: {}", result.repo_name, result.one_liner_summary);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use types::{AnalysisResult, AppConfig, ChatReply, ChatRequest};
