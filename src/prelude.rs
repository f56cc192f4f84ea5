//! Convenient imports for cloudsim.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```ignore
//! use cloudsim::prelude::*;
//!
//! let sim = Simulator::new()?;
//! let reservation = sim.launch(1)?;
//! ```

// Main entry point
pub use crate::simulator::{Simulator, SimulatorBuilder, SimulatorMetrics};

// Error handling
pub use crate::types::{Error, Result};

// Core types
pub use crate::types::{InstanceId, InstanceState, Reservation, Instance, Tag};

// Requests and queries
pub use crate::types::{Filter, InstanceQuery, LaunchRequest};

// Waiters
pub use crate::types::{CancellationToken, WaitCondition, WaitOutcome};

// Configuration
pub use crate::types::SimConfig;
