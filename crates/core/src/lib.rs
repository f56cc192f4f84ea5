//! Core types for the cloud instance simulator
//!
//! This crate holds the data model shared by the engine, the waiter and the
//! public facade:
//! - Identity: [`InstanceId`], [`ReservationId`], [`Tag`]
//! - Lifecycle: [`InstanceState`], [`Operation`]
//! - Queries: [`Filter`], [`InstanceQuery`]
//! - Snapshots: [`Instance`], [`Reservation`], [`DescribeInstancesOutput`]
//! - Errors: [`Error`], [`Result`]
//! - Configuration: [`SimConfig`], [`WaiterConfig`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod filter;
pub mod instance;
pub mod state;
pub mod types;

pub use config::{SimConfig, WaiterConfig};
pub use error::{Error, Result};
pub use filter::{Filter, InstanceQuery, INSTANCE_STATE_NAME_FILTER, TAG_FILTER_PREFIX};
pub use instance::{
    DescribeInstancesOutput, Image, Instance, InstanceStateChange, LaunchRequest, Reservation,
    DEFAULT_IMAGE_ID, DEFAULT_INSTANCE_TYPE,
};
pub use state::{InstanceState, Operation};
pub use types::{InstanceId, ReservationId, Tag};
