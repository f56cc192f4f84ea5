//! # cloudsim
//!
//! In-memory simulator of a cloud provider's instance lifecycle.
//!
//! cloudsim lets code that provisions and drives virtual machines run against
//! a local, deterministic stand-in: instances are launched into reservations,
//! move through the provider's lifecycle states after realistic delays, can
//! be queried with filters, tagged, and waited on.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cloudsim::prelude::*;
//!
//! let sim = Simulator::new()?;
//!
//! // Launch two instances; both start out pending
//! let ids = sim.launch(2)?.instance_ids();
//!
//! // Block until one is running
//! sim.wait_until_instance_running(&ids, &CancellationToken::new()).await?;
//!
//! // Filtered query
//! let running = sim
//!     .describe_instances(&InstanceQuery::new().filter(Filter::state([InstanceState::Running])))
//!     .await?;
//!
//! // Stop and terminate run in the background
//! sim.stop_instances(&ids)?;
//! sim.terminate_instances(&ids)?;
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Pending ──► Running ──► Stopping ──► Stopped
//!    ▲                                    │
//!    └────────────────────────────────────┘
//! any non-terminal ──► ShuttingDown ──► Terminated
//! ```
//!
//! Each step lands after the configured state change delay (5s by default).
//! Timing runs on `tokio::time`, so tests can use tokio's paused clock.
//!
//! ## Components
//!
//! - [`Simulator`] - Facade over every operation
//! - [`SimulatorBuilder`] - Timing and runtime configuration
//! - [`cloudsim_engine`] - Registry, lifecycle engine, query engine
//! - [`cloudsim_waiter`] - Polling waiters

#![warn(missing_docs)]

mod simulator;
mod types;

pub mod operations;
pub mod prelude;

// Re-export main entry points
pub use simulator::{Simulator, SimulatorBuilder, SimulatorMetrics};

// Re-export types
pub use types::*;
