//! Seams between the client core and the analysis service.
//!
//! The store and chat session are generic over these traits so they can be
//! driven by scripted sources in tests. [`ApiClient`] implements both.

use async_trait::async_trait;
use trendwatch_api::{AnalysisResult, ApiClient, ApiError, AppConfig};

/// Read side of the service.
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Fetch the server-side task configuration.
    async fn fetch_config(&self) -> Result<AppConfig, ApiError>;

    /// Fetch the latest results, newest first.
    async fn fetch_results(&self) -> Result<Vec<AnalysisResult>, ApiError>;
}

/// Conversational side of the service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user utterance and return the reply.
    async fn send_chat(&self, message: &str) -> Result<String, ApiError>;
}

#[async_trait]
impl AnalysisSource for ApiClient {
    async fn fetch_config(&self) -> Result<AppConfig, ApiError> {
        ApiClient::fetch_config(self).await
    }

    async fn fetch_results(&self) -> Result<Vec<AnalysisResult>, ApiError> {
        ApiClient::fetch_results(self).await
    }
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn send_chat(&self, message: &str) -> Result<String, ApiError> {
        ApiClient::send_chat(self, message).await
    }
}

#[async_trait]
impl<T: AnalysisSource + ?Sized> AnalysisSource for std::sync::Arc<T> {
    async fn fetch_config(&self) -> Result<AppConfig, ApiError> {
        (**self).fetch_config().await
    }

    async fn fetch_results(&self) -> Result<Vec<AnalysisResult>, ApiError> {
        (**self).fetch_results().await
    }
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for std::sync::Arc<T> {
    async fn send_chat(&self, message: &str) -> Result<String, ApiError> {
        (**self).send_chat(message).await
    }
}
