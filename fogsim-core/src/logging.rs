//! Structured logging for simulation debugging.
//!
//! Kernel code logs through `tracing` with structured fields. Call one of
//! the init functions once at startup (or set `RUST_LOG` yourself):
//!
//! ```rust
//! fogsim_core::init_simulation_logging();
//! ```
//!
//! Level guidelines: TRACE for per-event scheduling and delivery, DEBUG for
//! registry changes, INFO for run start/completion, WARN for diagnostics
//! (unresolved destinations, queue growth, clock regression).

use crate::event::EventKind;
use crate::types::{EntityId, Serial};
use crate::SimTime;
use tracing::{debug, info, trace, warn, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with sensible defaults (`info` level).
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info");
}

/// Initialize logging at a specific level: "trace", "debug", "info",
/// "warn", or "error". `RUST_LOG` takes precedence when set. Safe to call
/// more than once; later calls are ignored.
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fogsim_core={level}").into());

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();
}

/// Span covering one simulation run.
pub fn simulation_span(name: &str) -> Span {
    tracing::info_span!("simulation", name = name)
}

/// Span covering the delivery of one event.
pub fn event_span(serial: Serial, kind: EventKind, time: SimTime) -> Span {
    tracing::trace_span!("event", serial = %serial, kind = ?kind, time = %time)
}

/// Helpers for common kernel events.
pub mod events {
    use super::*;

    pub fn simulation_started(time: SimTime) {
        info!(time = %time, "simulation started");
    }

    pub fn simulation_completed(final_time: SimTime, events_processed: u64) {
        info!(
            final_time = %final_time,
            events_processed = events_processed,
            "simulation completed"
        );
    }

    pub fn event_scheduled(
        serial: Serial,
        kind: EventKind,
        time: Option<SimTime>,
        destination: Option<EntityId>,
    ) {
        trace!(
            serial = %serial,
            kind = ?kind,
            time = ?time,
            destination = ?destination,
            "event scheduled"
        );
    }

    pub fn entity_registered(id: EntityId, name: &str) {
        debug!(entity = %id, name = name, "entity registered");
    }
}

/// Helpers for diagnostics and unusual conditions.
pub mod diagnostics {
    use super::*;

    /// The priority override popped an event scheduled before the current
    /// clock; the clock moves backwards. Intentional, and worth seeing.
    pub fn clock_regressed(from: SimTime, to: SimTime, serial: Option<Serial>) {
        warn!(
            from = %from,
            to = %to,
            serial = ?serial,
            "clock moved backwards under priority override"
        );
    }

    /// A popped event addressed an entity the registry cannot resolve.
    pub fn entity_unresolved(id: EntityId, serial: Option<Serial>) {
        warn!(
            entity = %id,
            serial = ?serial,
            "event dropped: destination entity not registered"
        );
    }

    /// The future event list crossed its growth threshold.
    pub fn queue_growth(queue_len: usize, threshold: usize) {
        warn!(
            queue_len = queue_len,
            threshold = threshold,
            "future event list growing past threshold"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_simulation_logging_with_level("debug");
        init_simulation_logging();
    }

    #[test]
    fn spans_and_helpers_do_not_panic() {
        let _span = simulation_span("test");
        let _span = event_span(Serial(1), EventKind::Send, SimTime::from_millis(5));
        events::simulation_started(SimTime::zero());
        events::event_scheduled(
            Serial(0),
            EventKind::Send,
            Some(SimTime::from_secs(1)),
            Some(EntityId(2)),
        );
        events::simulation_completed(SimTime::from_secs(1), 3);
        diagnostics::clock_regressed(SimTime::from_secs(2), SimTime::from_secs(1), None);
        diagnostics::entity_unresolved(EntityId(9), Some(Serial(4)));
        diagnostics::queue_growth(1000, 100);
    }
}
