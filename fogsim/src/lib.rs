//! # fogsim: discrete event simulation of cloud/fog topologies
//!
//! fogsim models distributed cloud/fog systems without running real
//! networked processes: entities exchange timestamped events through a
//! central scheduler that advances a logical clock strictly by event time.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! fogsim = "0.1"
//! ```
//!
//! ```rust,no_run
//! use fogsim::prelude::*;
//!
//! let mut sim = Simulation::default();
//! // register entities, submit initial events...
//! sim.execute(Executor::unbound());
//! ```
//!
//! ## Examples
//!
//! See `examples/fog_pipeline.rs` for a sensor → broker → actuator
//! topology exercising timers, spawning, and cancellation.

pub use fogsim_core as core;

pub mod prelude {
    //! Commonly used types and traits.

    pub use fogsim_core::{
        Context, Entity, EntityId, EntityRegistry, Event, EventError, EventKind, Execute,
        Executor, FutureEventList, KernelConfig, Payload, Serial, SimError, SimTime, Simulation,
        Tag,
    };

    pub use fogsim_core::{init_simulation_logging, init_simulation_logging_with_level};
}
