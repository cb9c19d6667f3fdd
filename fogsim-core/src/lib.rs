//! Core discrete event simulation kernel for cloud/fog topologies.
//!
//! Entities exchange timestamped events through a central scheduler that
//! advances a logical simulation clock strictly by event time, never by the
//! wall clock. The kernel is the event representation, the scheduling order,
//! the future event list, and the dispatch loop; topology builders and
//! placement policies are collaborators that submit events and react to
//! deliveries.
//!
//! # Architecture Overview
//!
//! - [`Simulation`]: owns the clock, the [`FutureEventList`], and the
//!   [`EntityRegistry`]; drives the dispatch loop.
//! - [`Entity`]: the handler seam. Each broker, device, sensor, or actuator
//!   implements `handle` and schedules follow-up events through the
//!   [`Context`] it is handed.
//! - [`Event`]: plain data: addressing, schedule time, tag, payload, plus
//!   kernel bookkeeping (serial, dequeue stamp, processed flag).
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use fogsim_core::{Executor, Simulation};
//!
//! let mut sim = Simulation::default();
//! // register entities, submit initial events...
//! sim.execute(Executor::unbound());
//! ```
//!
//! # Time Model
//!
//! All scheduling uses [`SimTime`], a logical clock. The single wall-clock
//! reading is each event's creation stamp, consumed only by the
//! priority-override window: a higher-priority event created within a small
//! real-time window of another pending event is serviced first, even ahead
//! of simulated-time order. When that happens the clock can move backwards
//! by design; the dispatch loop records the pre-advance clock in each
//! event's dequeue stamp so traces can tell the two apart.
//!
//! # Concurrency
//!
//! Single-threaded, cooperative. Exactly one handler runs at a time, the
//! dispatch loop is not re-entrant, and handlers never block; waiting is
//! expressed by scheduling a `HoldDone` self-timer.

pub mod entity;
pub mod error;
pub mod event;
pub mod execute;
pub mod logging;
pub mod queue;
pub mod time;
pub mod types;

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{instrument, trace, warn};

pub use entity::{Context, Entity, EntityRegistry};
pub use error::{EventError, SimError};
pub use event::{scheduling_order, Event, EventKind, Payload, DEFAULT_PRIORITY_WINDOW};
pub use execute::{Execute, Executor};
pub use logging::{init_simulation_logging, init_simulation_logging_with_level};
pub use queue::FutureEventList;
pub use time::SimTime;
pub use types::{EntityId, Serial, Tag};

/// Kernel tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Real-time width of the window inside which a strictly higher
    /// priority overtakes simulated-time order. Zero disables the override.
    pub priority_window: Duration,
    /// Queue length that triggers a one-shot growth warning.
    pub queue_warn_threshold: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            priority_window: DEFAULT_PRIORITY_WINDOW,
            queue_warn_threshold: 100_000,
        }
    }
}

type Clock = Rc<Cell<SimTime>>;

/// Read-only handle onto the simulation clock.
///
/// The clock itself is owned by the [`Simulation`]; collaborators hold a
/// `ClockRef` to read the current time.
///
/// ```
/// # use fogsim_core::Simulation;
/// let sim = Simulation::default();
/// let clock = sim.clock();
/// assert_eq!(clock.time(), sim.time());
/// ```
pub struct ClockRef {
    clock: Clock,
}

impl ClockRef {
    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock.get()
    }
}

/// The simulation kernel: clock, future event list, and entity registry.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Simulation {
    queue: FutureEventList,
    registry: EntityRegistry,
    clock: Clock,
    next_entity_id: u64,
    events_processed: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation::new(KernelConfig::default())
    }
}

impl Simulation {
    pub fn new(config: KernelConfig) -> Self {
        Simulation {
            queue: FutureEventList::new(&config),
            registry: EntityRegistry::default(),
            clock: Rc::new(Cell::new(SimTime::zero())),
            next_entity_id: 0,
            events_processed: 0,
        }
    }

    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock.get()
    }

    /// Read-only clock handle for observers.
    #[must_use]
    pub fn clock(&self) -> ClockRef {
        ClockRef {
            clock: Rc::clone(&self.clock),
        }
    }

    /// The registry, for name resolution and [`Event::describe`].
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Register an entity and schedule its `Create` activation at the
    /// current time, so it can set up its first events when delivered.
    pub fn add_entity(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        logging::events::entity_registered(id, entity.name());
        self.registry.register(id, entity);
        let activation = Event::new(EventKind::Create, self.time(), None, Some(id), 0, None);
        self.queue.enqueue(activation);
        id
    }

    /// Raw submission of a fully built event at an absolute time.
    pub fn submit(&mut self, event: Event) -> Result<Serial, SimError> {
        let now = self.time();
        if let Some(time) = event.time() {
            if time < now {
                return Err(EventError::SchedulePast { time, now }.into());
            }
        }
        Ok(self.queue.insert(event)?)
    }

    /// Schedule a message to `destination`, `delay` after the current time.
    pub fn send(
        &mut self,
        source: EntityId,
        destination: EntityId,
        delay: SimTime,
        tag: Tag,
        payload: Option<Payload>,
    ) -> Serial {
        let event = Event::new(
            EventKind::Send,
            self.time() + delay,
            Some(source),
            Some(destination),
            tag,
            payload,
        );
        self.queue.enqueue(event)
    }

    /// Like [`Simulation::send`] with an explicit priority hint.
    pub fn send_with_priority(
        &mut self,
        source: EntityId,
        destination: EntityId,
        delay: SimTime,
        tag: Tag,
        payload: Option<Payload>,
        priority: i32,
    ) -> Serial {
        let event = Event::new(
            EventKind::Send,
            self.time() + delay,
            Some(source),
            Some(destination),
            tag,
            payload,
        )
        .with_priority(priority);
        self.queue.enqueue(event)
    }

    /// Schedule a `HoldDone` self-timer for `entity` after `delay`.
    pub fn hold(&mut self, entity: EntityId, delay: SimTime, tag: Tag) -> Serial {
        let event = Event::new(
            EventKind::HoldDone,
            self.time() + delay,
            Some(entity),
            Some(entity),
            tag,
            None,
        );
        self.queue.enqueue(event)
    }

    /// Withdraw pending events matching `predicate`.
    pub fn cancel_matching<F>(&mut self, predicate: F) -> Vec<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        self.queue.cancel_matching(predicate)
    }

    /// Schedule time of the next pending event, if any.
    pub fn peek_next_event_time(&self) -> Option<SimTime> {
        self.queue.peek().and_then(|event| event.time())
    }

    pub fn has_pending_events(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending_event_count(&self) -> usize {
        self.queue.len()
    }

    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// Events delivered so far in this run.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// One dispatch step: pop the earliest event, stamp it with the
    /// pre-advance clock, advance the clock to its schedule time, mark it
    /// processed, and deliver it. Returns `false` once the queue is empty,
    /// which ends the run.
    ///
    /// Under the priority override the popped event's time can lie below
    /// the clock; the clock then moves backwards, and the event's dequeue
    /// stamp keeps the pre-advance reading so the two stay distinguishable.
    pub fn step(&mut self) -> bool {
        let Some(mut event) = self.queue.pop_earliest() else {
            return false;
        };
        let now = self.clock.get();
        event.mark_dequeued(now);
        // Queued events always carry a schedule time; the blank sentinel is
        // rejected at insert.
        let event_time = event.time().unwrap_or(now);
        if event_time < now {
            logging::diagnostics::clock_regressed(now, event_time, event.serial());
        }
        self.clock.set(event_time);
        event.mark_processed();
        self.events_processed += 1;

        trace!(
            event = %event.describe(&self.registry),
            time = %event_time,
            "delivering event"
        );

        let serial = event.serial();
        let Some(destination) = event.destination() else {
            warn!(serial = ?serial, "event without destination dropped");
            return true;
        };
        let mut ctx = Context::new(&mut self.queue, event_time, &mut self.next_entity_id);
        if self.registry.deliver(destination, event, &mut ctx).is_err() {
            logging::diagnostics::entity_unresolved(destination, serial);
        }
        for (id, spawned) in ctx.take_spawned() {
            logging::events::entity_registered(id, spawned.name());
            self.registry.register(id, spawned);
            let activation = Event::new(
                EventKind::Create,
                event_time,
                Some(destination),
                Some(id),
                0,
                None,
            );
            self.queue.enqueue(activation);
        }
        true
    }

    /// Run the simulation under the given executor.
    #[instrument(skip(self, executor), fields(initial_time = %self.time()))]
    pub fn execute<E: Execute>(&mut self, executor: E) {
        logging::events::simulation_started(self.time());
        executor.execute(self);
        logging::events::simulation_completed(self.time(), self.events_processed);
    }
}
