//! Future event list: the priority queue of not-yet-delivered events.

use crate::error::EventError;
use crate::event::{scheduling_order, Event};
use crate::logging;
use crate::types::Serial;
use crate::KernelConfig;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// A pending event plus the comparison window it was queued under.
///
/// `BinaryHeap` is a max-heap, so the order is reversed here to make the
/// heap yield the scheduling minimum.
#[derive(Debug)]
struct QueuedEvent {
    event: Event,
    window: Duration,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        scheduling_order(&self.event, Some(&other.event), self.window).reverse()
    }
}

/// The future event list.
///
/// Owns the monotonic serial counter: serials are assigned here, exactly
/// once per event, at insert time. The counter lives and dies with the
/// list; it is never ambient state and never resets mid-run.
///
/// Events that compare equal under [`Event`]'s equality are all retained
/// and all delivered; equality is a lookup convenience for collaborators,
/// not an insertion constraint.
pub struct FutureEventList {
    heap: BinaryHeap<QueuedEvent>,
    next_serial: u64,
    last_serial: Option<Serial>,
    window: Duration,
    warn_threshold: usize,
    warned_growth: bool,
}

impl FutureEventList {
    pub fn new(config: &KernelConfig) -> Self {
        FutureEventList {
            heap: BinaryHeap::new(),
            next_serial: 0,
            last_serial: None,
            window: config.priority_window,
            warn_threshold: config.queue_warn_threshold,
            warned_growth: false,
        }
    }

    /// Insert `event`, assigning it the next serial. The blank sentinel is
    /// rejected; everything else is accepted, duplicates included.
    pub fn insert(&mut self, event: Event) -> Result<Serial, EventError> {
        if event.is_blank() {
            return Err(EventError::Blank);
        }
        Ok(self.enqueue(event))
    }

    /// Insertion path for events the kernel built itself; the caller
    /// guarantees the event is not blank.
    pub(crate) fn enqueue(&mut self, mut event: Event) -> Serial {
        let serial = Serial(self.next_serial);
        // A repeated or regressing serial means the insertion path is broken
        // and the run can no longer be trusted to order events.
        if let Some(last) = self.last_serial {
            assert!(
                serial > last,
                "serial counter regressed: assigned {serial} after {last}"
            );
        }
        self.next_serial += 1;
        self.last_serial = Some(serial);
        event.assign_serial(serial);
        logging::events::event_scheduled(serial, event.kind(), event.time(), event.destination());
        self.heap.push(QueuedEvent {
            event,
            window: self.window,
        });
        if !self.warned_growth && self.heap.len() >= self.warn_threshold {
            self.warned_growth = true;
            logging::diagnostics::queue_growth(self.heap.len(), self.warn_threshold);
        }
        serial
    }

    /// Remove and return the minimal event under the scheduling order, or
    /// `None` when the list is empty, the clean end-of-run condition.
    pub fn pop_earliest(&mut self) -> Option<Event> {
        self.heap.pop().map(|queued| queued.event)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|queued| &queued.event)
    }

    /// Remove and return every resident event matching `predicate`.
    /// Linear scan; queue sizes are simulation-scale.
    pub fn cancel_matching<F>(&mut self, mut predicate: F) -> Vec<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        let drained = std::mem::take(&mut self.heap).into_vec();
        let mut removed = Vec::new();
        for queued in drained {
            if predicate(&queued.event) {
                removed.push(queued.event);
            } else {
                self.heap.push(queued);
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
