//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for marshal operations.
//!
//! Counters are owned by each stream, so concurrent operations on
//! independent streams never share telemetry state; callers `merge` them.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
