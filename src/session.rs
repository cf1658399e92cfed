//! Session event loop.
//!
//! A [`Session`] owns the store, the chat transcript and the refresh
//! scheduler, and runs on a single tokio task. Commands from a
//! [`SessionHandle`] and timer fires from the scheduler are handled one at a
//! time, each to completion, so no state is shared across tasks. Everything a
//! view needs to render arrives as [`SessionEvent`]s.

use crate::chat::{ChatMessage, ChatSession, RefreshOutcome};
use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::error::{Result, WatchError};
use crate::scheduler::{RefreshScheduler, ScheduleState, TimerFired, plan};
use crate::source::{AnalysisSource, ChatTransport};
use crate::store::DataStore;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use trendwatch_api::{AnalysisResult, AppConfig};

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Delay armed when the computed refresh instant is already past.
    pub catch_up_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            catch_up_delay: plan::DEFAULT_CATCH_UP_DELAY,
        }
    }
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            catch_up_delay: config.schedule.catch_up_delay(),
        }
    }
}

/// Input to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Send a chat message, then refresh.
    Chat(String),
    /// Refresh now, outside the schedule.
    Refresh,
    /// Repeat the initial load (the reload affordance after a failed start).
    Reload,
    /// Cancel the pending timer and stop.
    Shutdown,
}

/// Output of the session loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An initial load started.
    Loading,
    /// An initial load succeeded.
    Loaded {
        config: AppConfig,
        results: Vec<AnalysisResult>,
    },
    /// A background, chat or manual refresh succeeded.
    Refreshed {
        config: AppConfig,
        results: Vec<AnalysisResult>,
    },
    /// A refresh failed after data had been loaded; the last good data stays.
    RefreshFailed { message: String },
    /// No load has succeeded yet. Send [`SessionCommand::Reload`] to retry.
    LoadFailed { message: String },
    /// The schedule was recomputed.
    Scheduled(ScheduleState),
    /// A transcript line was appended.
    ChatMessage(ChatMessage),
    /// A chat message was refused before sending.
    ChatRejected(String),
    /// The loop has ended and its timer is cancelled.
    Stopped,
}

/// Cloneable sender side of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Queue a chat message.
    pub fn send_chat(&self, text: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::Chat(text.into()))
    }

    /// Queue an immediate refresh.
    pub fn refresh(&self) -> Result<()> {
        self.send(SessionCommand::Refresh)
    }

    /// Queue a reload.
    pub fn reload(&self) -> Result<()> {
        self.send(SessionCommand::Reload)
    }

    /// Ask the loop to stop.
    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown)
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| WatchError::Channel("session has stopped".into()))
    }
}

/// The event loop. Build with [`Session::new`], then [`Session::spawn`] or
/// await [`Session::run`].
pub struct Session<S, T, C> {
    store: DataStore<S>,
    chat: ChatSession<T>,
    scheduler: RefreshScheduler,
    fire_rx: mpsc::UnboundedReceiver<TimerFired>,
    clock: C,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl<S, T, C> std::fmt::Debug for Session<S, T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("chat", &self.chat)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<S, T, C> Session<S, T, C>
where
    S: AnalysisSource + 'static,
    T: ChatTransport + 'static,
    C: Clock + 'static,
{
    /// Create a session with its command handle and event stream.
    pub fn new(
        source: S,
        transport: T,
        clock: C,
        options: SessionOptions,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (scheduler, fire_rx) = RefreshScheduler::new();

        let session = Self {
            store: DataStore::new(source),
            chat: ChatSession::new(transport),
            scheduler: scheduler.with_catch_up_delay(options.catch_up_delay),
            fire_rx,
            clock,
            command_rx,
            event_tx,
        };
        (session, SessionHandle { command_tx }, event_rx)
    }

    /// Transcript so far, greetings included.
    pub fn transcript(&self) -> &[ChatMessage] {
        self.chat.messages()
    }

    /// Run the loop on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Load, then handle commands and timer fires until shut down or every
    /// handle is dropped.
    pub async fn run(mut self) {
        info!("session started");
        self.initial_load().await;

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        debug!("all session handles dropped");
                        break;
                    };
                    match command {
                        SessionCommand::Chat(text) => self.handle_chat(&text).await,
                        SessionCommand::Refresh => self.refresh().await,
                        SessionCommand::Reload => self.initial_load().await,
                        SessionCommand::Shutdown => break,
                    }
                }
                Some(fired) = self.fire_rx.recv() => {
                    if self.scheduler.begin_fire(fired) {
                        self.refresh().await;
                    }
                }
            }
        }

        self.scheduler.cancel();
        info!("session stopped");
        self.emit(SessionEvent::Stopped);
    }

    async fn initial_load(&mut self) {
        self.emit(SessionEvent::Loading);
        match self.store.refresh(true).await {
            Ok((config, results)) => {
                self.emit(SessionEvent::Loaded { config, results });
                self.reschedule();
            }
            Err(e) => self.emit_refresh_failure(e.to_string()),
        }
    }

    async fn refresh(&mut self) {
        let outcome = self.store.refresh(false).await;
        match outcome {
            Ok((config, results)) => self.emit(SessionEvent::Refreshed { config, results }),
            Err(e) => self.emit_refresh_failure(e.to_string()),
        }
        self.reschedule();
    }

    async fn handle_chat(&mut self, text: &str) {
        let exchange = match self.chat.send(text, &mut self.store).await {
            Ok(exchange) => exchange,
            Err(e) => {
                self.emit(SessionEvent::ChatRejected(e.to_string()));
                return;
            }
        };

        self.emit(SessionEvent::ChatMessage(exchange.user));
        match exchange.refresh {
            RefreshOutcome::NotAttempted => {}
            RefreshOutcome::Refreshed => {
                self.emit(SessionEvent::Refreshed {
                    config: self.store.config().cloned().unwrap_or_default(),
                    results: self.store.results().to_vec(),
                });
                self.reschedule();
            }
            RefreshOutcome::Failed(message) => {
                self.emit_refresh_failure(message);
                self.reschedule();
            }
        }
        self.emit(SessionEvent::ChatMessage(exchange.reply));
    }

    fn emit_refresh_failure(&self, message: String) {
        if self.store.has_loaded() {
            self.emit(SessionEvent::RefreshFailed { message });
        } else {
            self.emit(SessionEvent::LoadFailed { message });
        }
    }

    fn reschedule(&mut self) {
        let state = self
            .scheduler
            .recompute(self.store.results(), self.store.config(), &self.clock)
            .clone();
        self.emit(SessionEvent::Scheduled(state));
    }

    fn emit(&self, event: SessionEvent) {
        // The view may have gone away; the loop keeps running until shutdown.
        let _ = self.event_tx.send(event);
    }
}
