//! Instance operations.
//!
//! | Operation | Sync | Latency |
//! |-----------|------|---------|
//! | `launch`, `run_instances` | yes | none, `Running` after one step |
//! | `describe_instances` | no | `describe_delay` |
//! | `start/stop/terminate_instances` | yes | none, steps run in background |

use crate::simulator::Simulator;
use cloudsim_core::{
    DescribeInstancesOutput, InstanceId, InstanceQuery, InstanceStateChange, LaunchRequest,
    Operation, Reservation, Result,
};

impl Simulator {
    /// Launch `count` instances of the default image and type.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: `count` is zero
    pub fn launch(&self, count: u32) -> Result<Reservation> {
        self.run_instances(LaunchRequest::new(count))
    }

    /// Launch a reservation.
    ///
    /// Every instance is returned `Pending` and becomes `Running` after one
    /// state change delay.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let reservation = sim.run_instances(
    ///     LaunchRequest::new(3).image_id("ami-12345678").instance_type("m5.large"),
    /// )?;
    /// assert_eq!(reservation.instances.len(), 3);
    /// ```
    pub fn run_instances(&self, request: LaunchRequest) -> Result<Reservation> {
        self.lifecycle.launch(&request)
    }

    /// Describe instances matching `query`, after the query latency.
    ///
    /// An empty query matches every instance. Unknown ids match nothing.
    ///
    /// # Errors
    ///
    /// - `QueryFailed`: an injected fault was consumed
    pub async fn describe_instances(&self, query: &InstanceQuery) -> Result<DescribeInstancesOutput> {
        self.queries.describe_instances(query).await
    }

    /// Start instances.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: an id is unknown
    /// - `IncorrectInstanceState`: an instance is stopping, shutting down,
    ///   terminated, or already heading to termination
    pub fn start_instances(&self, ids: &[InstanceId]) -> Result<Vec<InstanceStateChange>> {
        self.lifecycle.change_state(Operation::Start, ids)
    }

    /// Stop instances.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: an id is unknown
    /// - `IncorrectInstanceState`: an instance is pending, shutting down,
    ///   terminated, or already heading to termination
    pub fn stop_instances(&self, ids: &[InstanceId]) -> Result<Vec<InstanceStateChange>> {
        self.lifecycle.change_state(Operation::Stop, ids)
    }

    /// Terminate instances. Terminating a terminated instance is a no-op.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: an id is unknown
    pub fn terminate_instances(&self, ids: &[InstanceId]) -> Result<Vec<InstanceStateChange>> {
        self.lifecycle.change_state(Operation::Terminate, ids)
    }

    /// Make the next `n` queries fail with `QueryFailed`.
    pub fn fail_next_queries(&self, n: u32) {
        self.queries.fail_next_queries(n);
    }
}
