//! Latest-known service data and the single coordinated fetch.

use crate::source::AnalysisSource;
use tracing::{error, info, warn};
use trendwatch_api::{AnalysisResult, ApiError, AppConfig};

/// Error produced by [`DataStore::refresh`].
pub type FetchError = ApiError;

/// What the view should show for the data area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// An initial load is in progress (blocking indicator).
    Loading,
    /// Data (possibly stale) is available, or nothing failed yet.
    Ready,
    /// No load has ever succeeded; show a full-screen error with reload.
    Failed {
        /// Human-readable description of the last failure.
        message: String,
    },
}

/// Holds the last good `(config, results)` pair.
///
/// [`refresh`](Self::refresh) is the only mutation entry point.
pub struct DataStore<S> {
    source: S,
    config: Option<AppConfig>,
    results: Vec<AnalysisResult>,
    last_error: Option<String>,
    load_state: LoadState,
    has_loaded: bool,
}

impl<S> std::fmt::Debug for DataStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("config", &self.config)
            .field("results", &self.results.len())
            .field("last_error", &self.last_error)
            .field("load_state", &self.load_state)
            .finish()
    }
}

impl<S: AnalysisSource> DataStore<S> {
    /// Create an empty store.
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: None,
            results: Vec::new(),
            last_error: None,
            load_state: LoadState::Ready,
            has_loaded: false,
        }
    }

    /// Latest config, if any load has succeeded.
    pub fn config(&self) -> Option<&AppConfig> {
        self.config.as_ref()
    }

    /// Latest results, newest first.
    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    /// Description of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// View-level load state.
    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Whether any refresh has ever succeeded.
    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    /// Fetch config and results concurrently and replace both on success.
    ///
    /// A failure on either side leaves both stored values untouched. When no
    /// load has ever succeeded the store moves to [`LoadState::Failed`];
    /// otherwise the failure is recorded and the stale data stays visible.
    /// `is_initial` only switches on [`LoadState::Loading`] for the duration.
    pub async fn refresh(
        &mut self,
        is_initial: bool,
    ) -> Result<(AppConfig, Vec<AnalysisResult>), FetchError> {
        if is_initial {
            self.load_state = LoadState::Loading;
        }
        info!("fetching config and results");

        let fetched = tokio::try_join!(self.source.fetch_config(), self.source.fetch_results());

        match fetched {
            Ok((config, results)) => {
                info!(results = results.len(), "data fetched");
                self.config = Some(config.clone());
                self.results = results.clone();
                self.last_error = None;
                self.has_loaded = true;
                self.load_state = LoadState::Ready;
                Ok((config, results))
            }
            Err(e) => {
                let message = e.to_string();
                if self.has_loaded {
                    warn!("refresh failed, keeping last good data: {message}");
                    self.load_state = LoadState::Ready;
                } else {
                    error!("initial load failed: {message}");
                    self.load_state = LoadState::Failed {
                        message: message.clone(),
                    };
                }
                self.last_error = Some(message);
                Err(e)
            }
        }
    }
}
