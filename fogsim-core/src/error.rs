//! Error types for the kernel.

use crate::types::EntityId;
use crate::SimTime;
use thiserror::Error;

/// Top-level error type for simulation operations.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("event error: {0}")]
    Event(#[from] EventError),

    #[error("no entity registered under {id}")]
    EntityNotFound { id: EntityId },
}

/// Errors raised by event submission and queueing.
#[derive(Debug, Error)]
pub enum EventError {
    /// The blank sentinel carries no schedule time and cannot be queued.
    #[error("blank events cannot be scheduled")]
    Blank,

    #[error("cannot schedule into the past: event time {time} is before clock {now}")]
    SchedulePast { time: SimTime, now: SimTime },
}
