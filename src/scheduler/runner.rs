//! Refresh timer owner.
//!
//! [`RefreshScheduler`] holds at most one pending timer. Every
//! [`recompute`](RefreshScheduler::recompute) cancels the previous timer
//! before looking at the new data, even when the outcome is idle, so a timer
//! armed for a superseded schedule can never fire.
//!
//! Timer elapse is delivered as a [`TimerFired`] message rather than a
//! callback, so the owning session handles it in order with every other
//! event. Each armed timer carries a generation number; a fire that was
//! already queued when its timer got superseded is recognised as stale and
//! dropped.

use crate::clock::Clock;
use crate::scheduler::plan::{self, IdleReason, SchedulePhase, ScheduleState};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use trendwatch_api::{AnalysisResult, AppConfig};

/// Message sent when an armed timer elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    /// Generation of the timer that fired.
    pub generation: u64,
}

/// The single live timer.
#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the refresh timer and the derived [`ScheduleState`].
pub struct RefreshScheduler {
    state: ScheduleState,
    pending: Option<PendingTimer>,
    generation: u64,
    catch_up_delay: Duration,
    fire_tx: mpsc::UnboundedSender<TimerFired>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("state", &self.state)
            .field("pending_generation", &self.pending.as_ref().map(|p| p.generation))
            .field("catch_up_delay", &self.catch_up_delay)
            .finish()
    }
}

impl RefreshScheduler {
    /// Create an idle scheduler and the receiver its timers report to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (fire_tx, fire_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            state: ScheduleState::idle(IdleReason::NoResults),
            pending: None,
            generation: 0,
            catch_up_delay: plan::DEFAULT_CATCH_UP_DELAY,
            fire_tx,
        };
        (scheduler, fire_rx)
    }

    /// Override the catch-up delay (default 30 s).
    pub fn with_catch_up_delay(mut self, delay: Duration) -> Self {
        self.catch_up_delay = delay;
        self
    }

    /// Current derived state.
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Whether a timer is currently counting down.
    pub fn has_pending_timer(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    /// Re-derive the schedule from fresh `(results, config)` and arm at most
    /// one timer.
    pub fn recompute(
        &mut self,
        results: &[AnalysisResult],
        config: Option<&AppConfig>,
        clock: &dyn Clock,
    ) -> &ScheduleState {
        self.cancel_pending();

        let plan = plan::recompute(results, config, clock.now(), self.catch_up_delay);
        match (plan.state.phase, plan.delay) {
            (SchedulePhase::Armed, Some(delay)) => {
                info!(
                    "scheduling next refresh in {}s (at {})",
                    delay.as_secs(),
                    plan.state
                        .next_fire_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default()
                );
                self.arm(delay);
            }
            (SchedulePhase::CatchingUp, Some(delay)) => {
                info!(
                    "next refresh time has passed, checking again in {}s",
                    delay.as_secs()
                );
                self.arm(delay);
            }
            (SchedulePhase::Idle(reason), _) => {
                debug!(?reason, "refresh scheduler idle");
            }
            (phase, delay) => {
                debug!(?phase, ?delay, "plan without timer, staying idle");
            }
        }

        self.state = plan.state;
        &self.state
    }

    /// Accept a timer fire. Returns `true` when it belongs to the live timer,
    /// in which case the scheduler is now [`SchedulePhase::Firing`] and the
    /// caller must run exactly one refresh and then call
    /// [`recompute`](Self::recompute).
    pub fn begin_fire(&mut self, fired: TimerFired) -> bool {
        let is_live = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == fired.generation);
        if !is_live {
            debug!(generation = fired.generation, "ignoring stale timer fire");
            return false;
        }

        self.pending = None;
        self.state.phase = SchedulePhase::Firing;
        debug!(generation = fired.generation, "refresh timer fired");
        true
    }

    /// Tear down: cancel any pending timer and go idle.
    pub fn cancel(&mut self) {
        self.cancel_pending();
        self.state = ScheduleState::idle(IdleReason::Cancelled);
    }

    fn arm(&mut self, delay: Duration) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let fire_tx = self.fire_tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session ended; nothing to do.
            let _ = fire_tx.send(TimerFired { generation });
        });

        debug!(generation, delay_ms = delay.as_millis() as u64, "armed refresh timer");
        self.pending = Some(PendingTimer { generation, handle });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            debug!(generation = pending.generation, "cancelled refresh timer");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
