//! Shared test helpers: sample payloads and a scripted service.

use crate::source::{AnalysisSource, ChatTransport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use trendwatch_api::{AnalysisResult, ApiError, AppConfig};

/// A result whose only meaningful fields are `id` and the timestamp.
pub fn sample_result(id: i64, timestamp: &str) -> AnalysisResult {
    AnalysisResult {
        id,
        repo_name: format!("owner/repo-{id}"),
        repo_url: format!("https://github.com/owner/repo-{id}"),
        analysis_timestamp: timestamp.to_owned(),
        one_liner_summary: format!("Repository {id}."),
        tech_stack: vec!["Rust".to_owned()],
        key_features: Vec::new(),
        community_focus: Vec::new(),
    }
}

/// Config tracking python with the given interval.
pub fn sample_config(interval_minutes: &str) -> AppConfig {
    AppConfig {
        trending_language: Some("python".to_owned()),
        schedule_interval_minutes: Some(interval_minutes.to_owned()),
    }
}

/// Scripted responses, consumed in order. `Err(status)` becomes
/// [`ApiError::Status`]. An exhausted queue answers with HTTP 599.
#[derive(Default)]
pub struct ScriptedSource {
    configs: Mutex<VecDeque<Result<AppConfig, u16>>>,
    results: Mutex<VecDeque<Result<Vec<AnalysisResult>, u16>>>,
    replies: Mutex<VecDeque<Result<String, u16>>>,
    config_calls: AtomicUsize,
    chat_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_config(self, response: Result<AppConfig, u16>) -> Self {
        lock(&self.configs).push_back(response);
        self
    }

    pub fn push_results(self, response: Result<Vec<AnalysisResult>, u16>) -> Self {
        lock(&self.results).push_back(response);
        self
    }

    pub fn push_reply(self, response: Result<String, u16>) -> Self {
        lock(&self.replies).push_back(response);
        self
    }

    /// Number of `fetch_config` calls so far (one per refresh).
    pub fn refresh_count(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    pub fn chat_count(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, u16>>>, endpoint: &'static str) -> Result<T, ApiError> {
    lock(queue)
        .pop_front()
        .unwrap_or(Err(599))
        .map_err(|status| ApiError::Status { endpoint, status })
}

#[async_trait]
impl AnalysisSource for ScriptedSource {
    async fn fetch_config(&self) -> Result<AppConfig, ApiError> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.configs, "/api/config")
    }

    async fn fetch_results(&self) -> Result<Vec<AnalysisResult>, ApiError> {
        next(&self.results, "/api/results")
    }
}

#[async_trait]
impl ChatTransport for ScriptedSource {
    async fn send_chat(&self, _message: &str) -> Result<String, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.replies, "/api/chat")
    }
}
