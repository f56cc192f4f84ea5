//! Request and response shapes for instances and reservations
//!
//! These are point-in-time snapshots: mutating a returned [`Instance`] has no
//! effect on the registry.

use crate::state::InstanceState;
use crate::types::{InstanceId, ReservationId, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image launched when a request does not name one
pub const DEFAULT_IMAGE_ID: &str = "ami-00000000";

/// Instance type launched when a request does not name one
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// Snapshot of a simulated instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance id
    pub instance_id: InstanceId,
    /// Reservation the instance was launched in
    pub reservation_id: ReservationId,
    /// Image the instance was launched from
    pub image_id: String,
    /// Instance type
    pub instance_type: String,
    /// Launch time
    pub launch_time: DateTime<Utc>,
    /// Lifecycle state at snapshot time
    pub state: InstanceState,
    /// Tags, in insertion order
    pub tags: Vec<Tag>,
}

impl Instance {
    /// Values of every tag with this key, in insertion order
    pub fn tag_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.key == key)
            .map(|t| t.value.as_str())
    }
}

/// Snapshot of the instances created by one launch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation id
    pub reservation_id: ReservationId,
    /// Instances, in allocation order
    pub instances: Vec<Instance>,
}

impl Reservation {
    /// Ids of the instances in this reservation
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|i| i.instance_id.clone()).collect()
    }
}

/// Launch parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Image to launch
    pub image_id: String,
    /// Instance type
    pub instance_type: String,
    /// Number of instances (must be at least 1)
    pub count: u32,
}

impl LaunchRequest {
    /// Launch `count` instances of the default image and type
    pub fn new(count: u32) -> Self {
        LaunchRequest {
            image_id: DEFAULT_IMAGE_ID.to_string(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            count,
        }
    }

    /// Set the image
    pub fn image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = image_id.into();
        self
    }

    /// Set the instance type
    pub fn instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }
}

/// Outcome of an accepted start/stop/terminate request for one instance
///
/// Transitions land after a delay, so `current_state` is the state at the
/// time the request was accepted and `target_state` is where the scheduled
/// (or already in-flight) transition ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStateChange {
    /// Instance id
    pub instance_id: InstanceId,
    /// State when the request was accepted
    pub current_state: InstanceState,
    /// State the instance is heading to
    pub target_state: InstanceState,
}

/// Result of an instance query
///
/// Matching instances from every reservation are flattened into one group,
/// in registry order. Grouping does not mirror launch grouping; use
/// [`Instance::reservation_id`] to regroup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeInstancesOutput {
    /// Matching instances
    pub instances: Vec<Instance>,
}

impl DescribeInstancesOutput {
    /// Check if nothing matched
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of matching instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Find a matching instance by id
    pub fn get(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.iter().find(|i| &i.instance_id == id)
    }
}

/// Machine image known to the simulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image id
    pub image_id: String,
}
