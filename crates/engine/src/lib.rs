//! Simulation engine for cloudsim
//!
//! This crate owns the mutable side of the simulator:
//! - Registry: reservations, instance records and id allocation
//! - LifecycleEngine: delayed, abortable transition chains per instance
//! - QueryEngine: filtered instance queries with synthetic latency and fault
//!   injection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lifecycle;
pub mod query;
pub mod registry;

pub use lifecycle::{plan_transition, LifecycleEngine, LifecycleMetrics};
pub use query::QueryEngine;
pub use registry::{InstanceSlot, Registry};
