//! Simulation time management.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A point in simulation time, stored as nanoseconds since simulation start.
///
/// Simulation time is logical: it advances only when the dispatch loop
/// services an event, never with the wall clock. Arithmetic saturates rather
/// than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Simulation start (time zero).
    pub const fn zero() -> Self {
        SimTime(0)
    }

    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    pub const fn from_micros(micros: u64) -> Self {
        SimTime(micros * 1_000)
    }

    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis * 1_000_000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    pub fn from_duration(duration: Duration) -> Self {
        SimTime(duration.as_nanos() as u64)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    /// Raw nanosecond value.
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Elapsed simulated duration since `earlier`, saturating at zero.
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl Add<SimTime> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0.saturating_add(rhs.as_nanos() as u64))
    }
}

impl Sub<Duration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: Duration) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.as_nanos() as u64))
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Duration {
        self.duration_since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.as_duration();
        if d.as_secs() > 0 {
            write!(f, "{}.{:03}s", d.as_secs(), d.subsec_millis())
        } else if d.subsec_millis() > 0 {
            write!(f, "{}.{:03}ms", d.subsec_millis(), d.subsec_micros() % 1000)
        } else if d.subsec_micros() > 0 {
            write!(f, "{}µs", d.subsec_micros())
        } else {
            write!(f, "{}ns", d.subsec_nanos())
        }
    }
}
