//! Public types for the cloudsim API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Identity
pub use cloudsim_core::{InstanceId, ReservationId, Tag};

// Lifecycle
pub use cloudsim_core::{InstanceState, Operation};

// Requests and snapshots
pub use cloudsim_core::{
    DescribeInstancesOutput, Image, Instance, InstanceStateChange, LaunchRequest, Reservation,
};

// Queries
pub use cloudsim_core::{Filter, InstanceQuery};

// Errors
pub use cloudsim_core::{Error, Result};

// Configuration
pub use cloudsim_core::{SimConfig, WaiterConfig};

// Waiters
pub use cloudsim_waiter::{WaitCondition, WaitOutcome};

// Cancellation for waiters
pub use tokio_util::sync::CancellationToken;
