//! Event representation and the scheduling order.
//!
//! An [`Event`] is a scheduled occurrence passed between entities: a kind
//! tag, a target simulation time, addressing, a user tag, an opaque payload,
//! and kernel bookkeeping (serial, dequeue stamp, processed flag). Routing
//! fields are fixed at construction; only the bookkeeping fields and the
//! priority hint change afterwards.
//!
//! [`scheduling_order`] defines the total order the future event list pops
//! in: simulated-time order with a FIFO tie-break, plus a real-time
//! priority-override window that lets an urgent event overtake routine
//! traffic created at nearly the same wall-clock instant.

use crate::entity::EntityRegistry;
use crate::types::{EntityId, Serial, Tag};
use crate::SimTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Internal event type.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Sentinel for a blank, uninitialized event. Never queued.
    Null,
    /// Payload-carrying message between entities.
    Send,
    /// Expiry of a self-timer.
    HoldDone,
    /// Activation notice delivered to a newly registered entity.
    Create,
}

/// Opaque event payload.
///
/// The kernel never inspects payload bytes; they belong to whichever entity
/// currently holds the event. Cloning shares the allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Payload(Arc<[u8]>);

impl Payload {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Payload(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload(bytes.into())
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload(s.as_bytes().into())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({} bytes)", self.0.len())
    }
}

/// A scheduled occurrence passed between entities.
///
/// Unset fields of the blank sentinel are `None`. An event acquires its
/// [`Serial`] when it is
/// inserted into the future event list, its dequeue stamp when it leaves the
/// queue for service, and its processed flag when it is delivered.
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    time: Option<SimTime>,
    end_waiting_time: Option<SimTime>,
    source: Option<EntityId>,
    destination: Option<EntityId>,
    tag: Tag,
    payload: Option<Payload>,
    priority: i32,
    serial: Option<Serial>,
    created_at: Instant,
    processed: bool,
}

impl Event {
    /// Create an event scheduled for `time` with default priority.
    pub fn new(
        kind: EventKind,
        time: SimTime,
        source: Option<EntityId>,
        destination: Option<EntityId>,
        tag: Tag,
        payload: Option<Payload>,
    ) -> Self {
        Event {
            kind,
            time: Some(time),
            end_waiting_time: None,
            source,
            destination,
            tag,
            payload,
            priority: 0,
            serial: None,
            created_at: Instant::now(),
            processed: false,
        }
    }

    /// Blank sentinel: kind [`EventKind::Null`], no schedule time, no
    /// addressing. Rejected by the future event list.
    pub fn blank() -> Self {
        Event {
            kind: EventKind::Null,
            time: None,
            end_waiting_time: None,
            source: None,
            destination: None,
            tag: 0,
            payload: None,
            priority: 0,
            serial: None,
            created_at: Instant::now(),
            processed: false,
        }
    }

    /// Set the scheduling priority hint at construction.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Simulation time this event is scheduled to occur at. `None` only on
    /// the blank sentinel.
    pub fn time(&self) -> Option<SimTime> {
        self.time
    }

    /// Clock reading at the moment this event left the queue for service.
    /// Set once, at dequeue; under a priority override it can differ from
    /// [`Event::time`].
    pub fn end_waiting_time(&self) -> Option<SimTime> {
        self.end_waiting_time
    }

    pub fn source(&self) -> Option<EntityId> {
        self.source
    }

    pub fn destination(&self) -> Option<EntityId> {
        self.destination
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Take the payload out of the event, leaving `None` behind.
    pub fn take_payload(&mut self) -> Option<Payload> {
        self.payload.take()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Change the priority hint. Only meaningful before insertion; the
    /// ordering reads priority when events are compared in the queue.
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Insertion-order serial, `None` until the event is inserted.
    pub fn serial(&self) -> Option<Serial> {
        self.serial
    }

    /// Wall-clock creation stamp. Independent of simulation time; read only
    /// by the priority-override window test.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn processed(&self) -> bool {
        self.processed
    }

    /// True for the blank sentinel, which must never be queued.
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, EventKind::Null) || self.time.is_none()
    }

    /// Copy with a fresh identity: same kind, time, addressing, tag, and
    /// payload, but priority back at the default, no serial, no dequeue
    /// stamp, not processed, and a new creation stamp.
    ///
    /// Priority is deliberately not carried over; it is a one-shot
    /// scheduling hint, not a durable property of the event.
    pub fn duplicate(&self) -> Event {
        Event {
            kind: self.kind,
            time: self.time,
            end_waiting_time: None,
            source: self.source,
            destination: self.destination,
            tag: self.tag,
            payload: self.payload.clone(),
            priority: 0,
            serial: None,
            created_at: Instant::now(),
            processed: false,
        }
    }

    /// Human-readable description, resolving entity ids to names through the
    /// registry capability. Unknown ids render as a placeholder instead of
    /// failing.
    pub fn describe(&self, registry: &EntityRegistry) -> String {
        let resolve = |id: Option<EntityId>| -> String {
            match id {
                Some(id) => match registry.resolve(id) {
                    Some(name) => name.to_owned(),
                    None => format!("<not found: {id}>"),
                },
                None => "<none>".to_owned(),
            }
        };
        let time = self
            .time
            .map_or_else(|| "<unset>".to_owned(), |t| t.to_string());
        format!(
            "{:?} tag={} {} -> {} at {}",
            self.kind,
            self.tag,
            resolve(self.source),
            resolve(self.destination),
            time,
        )
    }

    pub(crate) fn assign_serial(&mut self, serial: Serial) {
        self.serial = Some(serial);
    }

    pub(crate) fn mark_dequeued(&mut self, at: SimTime) {
        if self.end_waiting_time.is_none() {
            self.end_waiting_time = Some(at);
        }
    }

    pub(crate) fn mark_processed(&mut self) {
        self.processed = true;
    }
}

/// Two events are equal iff they agree on payload, destination, source,
/// kind, and priority. `time`, `tag`, and `serial` are deliberately
/// excluded: collaborators rely on this to de-duplicate logically identical
/// traffic scheduled at different instants. Surprising, and load-bearing;
/// do not widen.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
            && self.destination == other.destination
            && self.source == other.source
            && self.kind == other.kind
            && self.priority == other.priority
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.payload.hash(state);
        self.destination.hash(state);
        self.source.hash(state);
        self.kind.hash(state);
        self.priority.hash(state);
    }
}

/// Default real-time width of the priority-override window.
///
/// The window compares wall-clock creation stamps, not simulation time. At
/// this width two events must be created within ten nanoseconds of each
/// other for a higher priority to overtake time order, so in practice the
/// override almost never fires; widen it through
/// [`KernelConfig`](crate::KernelConfig) when modeling control-plane
/// preemption.
pub const DEFAULT_PRIORITY_WINDOW: Duration = Duration::from_nanos(10);

/// The total scheduling order used by the future event list.
///
/// In order:
/// 1. a missing comparand sorts as minimal, so `a` goes after it;
/// 2. if `a` has strictly higher priority than `b` and the two were created
///    within `window` of each other in real time, `a` goes first regardless
///    of simulated time;
/// 3. smaller schedule time goes first;
/// 4. at equal times, smaller serial (earlier insertion) goes first, an
///    unassigned serial ordering before any assigned one;
/// 5. identical serials mean the same queued event and compare equal;
/// 6. anything else sorts `a` after `b`.
///
/// Rule 2 means the queue can yield an event whose time is below the clock:
/// the clock then moves backwards. That is intentional, surfaced by the
/// dispatch loop's distinct dequeue stamp rather than hidden.
pub fn scheduling_order(a: &Event, b: Option<&Event>, window: Duration) -> Ordering {
    let Some(b) = b else {
        return Ordering::Greater;
    };
    if a.priority > b.priority && created_within(a, b, window) {
        return Ordering::Less;
    }
    match a.time.cmp(&b.time) {
        Ordering::Less => Ordering::Less,
        Ordering::Greater => Ordering::Greater,
        Ordering::Equal => match (a.serial, b.serial) {
            (Some(sa), Some(sb)) if sa < sb => Ordering::Less,
            (Some(sa), Some(sb)) if sa == sb => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            _ => Ordering::Greater,
        },
    }
}

fn created_within(a: &Event, b: &Event, window: Duration) -> bool {
    let (earlier, later) = if a.created_at <= b.created_at {
        (a.created_at, b.created_at)
    } else {
        (b.created_at, a.created_at)
    };
    later.duration_since(earlier) < window
}
