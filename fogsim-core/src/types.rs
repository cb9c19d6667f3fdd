//! Identifier newtypes shared across the kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel-assigned entity identifier.
///
/// Ids are dense integers handed out in registration order, which keeps logs
/// short and runs reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity-{}", self.0)
    }
}

/// Insertion-order serial assigned by the future event list, exactly once,
/// at insert time. Breaks ties among events scheduled for the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Serial(pub u64);

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// User-defined event discriminator, interpreted by the destination entity.
pub type Tag = u32;
