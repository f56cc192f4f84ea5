//! Simulator Comprehensive Test Suite
//!
//! End-to-end tests of the public `Simulator` API on tokio's paused clock.
//!
//! ## Timing Conventions
//!
//! Default timing is used unless a test says otherwise: 5s per lifecycle
//! step, 1s query latency, waiters polling every 5s. Assertions are placed
//! half a step away from any transition so no test depends on the order of
//! timers that fire at the same instant.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all simulator tests
//! cargo test --test simulator_comprehensive
//!
//! # Run waiter tests only
//! cargo test --test simulator_comprehensive waiters::
//! ```

pub use cloudsim::prelude::*;
pub use cloudsim::{DescribeInstancesOutput, InstanceStateChange, Operation};
pub use std::time::Duration;

// Test modules
pub mod concurrency;
pub mod launch;
pub mod tags;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Default lifecycle step delay
pub const STEP: Duration = Duration::from_secs(5);

/// Half a lifecycle step
pub const HALF_STEP: Duration = Duration::from_millis(2_500);

/// Install a test-writer subscriber once per process
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

/// Create a simulator with default timing on the current runtime
pub fn create_simulator() -> Simulator {
    init_tracing();
    Simulator::new().expect("Failed to create simulator")
}

/// Current state of an instance, read without query latency
pub fn state_of(sim: &Simulator, id: &InstanceId) -> InstanceState {
    sim.instance(id).expect("instance should exist").state
}

/// Launch `count` instances and wait until they are running
pub async fn launch_running(sim: &Simulator, count: u32) -> Vec<InstanceId> {
    let ids = sim.launch(count).unwrap().instance_ids();
    sim.settle(&ids).await.unwrap();
    ids
}

/// Launch `count` instances and wait until they are stopped
pub async fn launch_stopped(sim: &Simulator, count: u32) -> Vec<InstanceId> {
    let ids = launch_running(sim, count).await;
    sim.stop_instances(&ids).unwrap();
    sim.settle(&ids).await.unwrap();
    ids
}

/// Advance virtual time
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Query filtering on instance state
pub fn state_query(states: impl IntoIterator<Item = InstanceState>) -> InstanceQuery {
    InstanceQuery::new().filter(Filter::state(states))
}
