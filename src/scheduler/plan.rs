//! Pure schedule recomputation.
//!
//! [`recompute`] decides, from the latest results and config and an injected
//! `now`, which phase the refresh scheduler is in and how long to wait before
//! the next poll. It owns no timer; [`super::RefreshScheduler`] applies the
//! plan.

use crate::scheduler::{interval, timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use trendwatch_api::{AnalysisResult, AppConfig};

/// Default wait when the computed refresh time has already passed.
pub const DEFAULT_CATCH_UP_DELAY: Duration = Duration::from_secs(30);

/// Why no timer is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleReason {
    /// Nothing has been loaded yet, or the service returned no results.
    NoResults,
    /// No config has been loaded.
    NoConfig,
    /// The config carries no usable interval.
    NoInterval,
    /// The newest result's timestamp could not be interpreted.
    UnparsableTimestamp,
    /// The scheduler was torn down.
    Cancelled,
}

impl std::fmt::Display for IdleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResults => write!(f, "no results yet"),
            Self::NoConfig => write!(f, "no config loaded"),
            Self::NoInterval => write!(f, "no valid interval"),
            Self::UnparsableTimestamp => write!(f, "latest timestamp unreadable"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum SchedulePhase {
    /// No timer armed.
    Idle(IdleReason),
    /// Timer counting down to `next_fire_at`.
    Armed,
    /// `next_fire_at` already passed; timer armed for the catch-up delay.
    CatchingUp,
    /// Timer elapsed and a refresh is in flight.
    Firing,
}

/// Derived scheduling state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleState {
    /// Current phase.
    pub phase: SchedulePhase,
    /// Timestamp of `results[0]`, when it parsed.
    pub last_result_at: Option<DateTime<Utc>>,
    /// Resolved polling interval.
    pub interval: Option<Duration>,
    /// `last_result_at + interval`; present whenever both inputs are.
    pub next_fire_at: Option<DateTime<Utc>>,
}

impl ScheduleState {
    /// The state before anything has been loaded.
    pub fn idle(reason: IdleReason) -> Self {
        Self {
            phase: SchedulePhase::Idle(reason),
            last_result_at: None,
            interval: None,
            next_fire_at: None,
        }
    }

    /// Whether a timer is (or should be) counting down.
    pub fn is_armed(&self) -> bool {
        matches!(self.phase, SchedulePhase::Armed | SchedulePhase::CatchingUp)
    }
}

/// Result of [`recompute`]: the new state and the timer to arm, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePlan {
    /// New derived state.
    pub state: ScheduleState,
    /// Delay for the single timer to arm. `None` exactly when the phase is idle.
    pub delay: Option<Duration>,
}

/// Compute the next scheduling decision.
///
/// `results[0]` is taken as the newest analysis; the service contract is
/// newest-first and nothing here re-sorts.
pub fn recompute(
    results: &[AnalysisResult],
    config: Option<&AppConfig>,
    now: DateTime<Utc>,
    catch_up_delay: Duration,
) -> SchedulePlan {
    let Some(newest) = results.first() else {
        return idle(ScheduleState::idle(IdleReason::NoResults));
    };
    let Some(config) = config else {
        return idle(ScheduleState::idle(IdleReason::NoConfig));
    };
    let Some(interval) = interval::resolve(config.schedule_interval_minutes.as_deref()) else {
        return idle(ScheduleState::idle(IdleReason::NoInterval));
    };

    let Some(last_result_at) = timestamp::parse(Some(&newest.analysis_timestamp)) else {
        return idle(ScheduleState {
            interval: Some(interval),
            ..ScheduleState::idle(IdleReason::UnparsableTimestamp)
        });
    };

    let Some(next_fire_at) = chrono::Duration::from_std(interval)
        .ok()
        .and_then(|step| last_result_at.checked_add_signed(step))
    else {
        return idle(ScheduleState {
            last_result_at: Some(last_result_at),
            ..ScheduleState::idle(IdleReason::NoInterval)
        });
    };

    let (phase, delay) = match (next_fire_at - now).to_std() {
        Ok(delay) => (SchedulePhase::Armed, delay),
        // Negative: the window already elapsed.
        Err(_) => (SchedulePhase::CatchingUp, catch_up_delay),
    };

    SchedulePlan {
        state: ScheduleState {
            phase,
            last_result_at: Some(last_result_at),
            interval: Some(interval),
            next_fire_at: Some(next_fire_at),
        },
        delay: Some(delay),
    }
}

fn idle(state: ScheduleState) -> SchedulePlan {
    SchedulePlan { state, delay: None }
}
