//! Entities, the registry, and the handler-side scheduling context.

use crate::error::{EventError, SimError};
use crate::event::{Event, EventKind, Payload};
use crate::queue::FutureEventList;
use crate::types::{EntityId, Serial, Tag};
use crate::SimTime;
use std::collections::HashMap;

/// An addressable participant in the simulation.
///
/// This is the single dispatch seam of the kernel: every entity role
/// (broker, device, sensor, actuator) is one implementation of `handle`. Handlers run one at a time on the dispatch thread and must not
/// block; waiting is always expressed by scheduling a future event through
/// the [`Context`].
pub trait Entity {
    /// Display name used by [`Event::describe`] and diagnostics.
    fn name(&self) -> &str;

    /// React to a delivered event, scheduling follow-ups through `ctx`.
    fn handle(&mut self, self_id: EntityId, event: Event, ctx: &mut Context<'_>);
}

/// Maps entity ids to their handlers.
///
/// The kernel passes the registry into [`Event::describe`] and delivery as
/// a capability; events themselves never hold a reference back to it.
#[derive(Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Box<dyn Entity>>,
}

impl EntityRegistry {
    /// Resolve an id to the entity's display name.
    pub fn resolve(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(|entity| entity.name())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn register(&mut self, id: EntityId, entity: Box<dyn Entity>) {
        self.entities.insert(id, entity);
    }

    /// Deliver `event` to the entity registered under `id`. An unknown id is
    /// an explicit not-found result, never a panic.
    pub(crate) fn deliver(
        &mut self,
        id: EntityId,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Result<(), SimError> {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.handle(id, event, ctx);
                Ok(())
            }
            None => Err(SimError::EntityNotFound { id }),
        }
    }
}

/// Handler-side view of the kernel, passed into [`Entity::handle`].
///
/// Borrows the future event list for the duration of one delivery. Entities
/// handed to [`Context::spawn`] are registered once the current handler
/// returns, then activated through the queue.
pub struct Context<'a> {
    queue: &'a mut FutureEventList,
    now: SimTime,
    next_entity_id: &'a mut u64,
    spawned: Vec<(EntityId, Box<dyn Entity>)>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        queue: &'a mut FutureEventList,
        now: SimTime,
        next_entity_id: &'a mut u64,
    ) -> Self {
        Context {
            queue,
            now,
            next_entity_id,
            spawned: Vec::new(),
        }
    }

    /// Current simulation time: the schedule time of the event being
    /// delivered.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Raw submission of a fully built event at an absolute time.
    pub fn submit(&mut self, event: Event) -> Result<Serial, EventError> {
        if let Some(time) = event.time() {
            if time < self.now {
                return Err(EventError::SchedulePast {
                    time,
                    now: self.now,
                });
            }
        }
        self.queue.insert(event)
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
            self.now + delay,
            Some(source),
            Some(destination),
            tag,
            payload,
        );
        self.queue.enqueue(event)
    }

    /// Like [`Context::send`] with an explicit priority hint.
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
            self.now + delay,
            Some(source),
            Some(destination),
            tag,
            payload,
        )
        .with_priority(priority);
        self.queue.enqueue(event)
    }

    /// Schedule a self-timer for `entity`: a `HoldDone` event delivered back
    /// to it after `delay`.
    pub fn hold(&mut self, entity: EntityId, delay: SimTime, tag: Tag) -> Serial {
        let event = Event::new(
            EventKind::HoldDone,
            self.now + delay,
            Some(entity),
            Some(entity),
            tag,
            None,
        );
        self.queue.enqueue(event)
    }

    /// Withdraw pending events matching `predicate`; already-popped events
    /// are beyond recall.
    pub fn cancel_matching<F>(&mut self, predicate: F) -> Vec<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        self.queue.cancel_matching(predicate)
    }

    /// Hand a new entity to the kernel. It is registered after the current
    /// handler returns and receives a `Create` activation event at the
    /// current time; the returned id is valid for addressing immediately.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId(*self.next_entity_id);
        *self.next_entity_id += 1;
        self.spawned.push((id, entity));
        id
    }

    pub(crate) fn take_spawned(self) -> Vec<(EntityId, Box<dyn Entity>)> {
        self.spawned
    }
}
