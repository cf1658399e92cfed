//! Adaptive refresh scheduling.
//!
//! Decides when to re-poll the analysis service from the newest result's
//! timestamp and the server-configured interval, and owns the one timer
//! that triggers the poll.

pub mod interval;
pub mod plan;
pub mod runner;
pub mod timestamp;

pub use plan::{IdleReason, SchedulePhase, SchedulePlan, ScheduleState};
pub use runner::{RefreshScheduler, TimerFired};
