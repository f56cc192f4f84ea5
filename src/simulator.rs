//! Main simulator entry point.
//!
//! This module provides the `Simulator` struct, which wires the registry, the
//! lifecycle engine, the query engine and the waiter together. The operations
//! themselves live in [`crate::operations`].

use cloudsim_core::{Error, Instance, InstanceId, Reservation, Result, SimConfig};
use cloudsim_engine::{LifecycleEngine, QueryEngine, Registry};
use cloudsim_waiter::Waiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

/// The instance lifecycle simulator.
///
/// Create one with [`Simulator::new`] or [`Simulator::builder`] from inside a
/// tokio runtime; lifecycle transitions run as tasks on that runtime.
/// Dropping the simulator aborts every in-flight transition.
///
/// # Example
///
/// ```ignore
/// use cloudsim::prelude::*;
///
/// let sim = Simulator::new()?;
/// let reservation = sim.launch(2)?;
/// let ids = reservation.instance_ids();
///
/// sim.wait_until_instance_running(&ids, &CancellationToken::new()).await?;
/// sim.stop_instances(&ids)?;
/// ```
pub struct Simulator {
    pub(crate) registry: Arc<Registry>,
    pub(crate) lifecycle: LifecycleEngine,
    pub(crate) queries: Arc<QueryEngine>,
    pub(crate) waiter: Waiter<QueryEngine>,
    config: SimConfig,
}

impl Simulator {
    /// Create a simulator with default timing on the current runtime.
    ///
    /// # Errors
    ///
    /// - `Runtime`: called outside a tokio runtime
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a simulator from a configuration.
    pub fn from_config(config: SimConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a builder for simulator configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let sim = Simulator::builder()
    ///     .state_change_delay(Duration::from_millis(50))
    ///     .describe_delay(Duration::ZERO)
    ///     .build()?;
    /// ```
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    /// Effective configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Snapshot every reservation, in launch order.
    ///
    /// Unlike `describe_instances` this has no latency and is not counted as
    /// a query.
    pub fn reservations(&self) -> Vec<Reservation> {
        self.registry.reservations()
    }

    /// Snapshot one instance without latency.
    pub fn instance(&self, id: &InstanceId) -> Option<Instance> {
        self.registry.get(id).map(|slot| slot.snapshot())
    }

    /// Wait until the given instances have no transition in flight.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: an id is unknown
    pub async fn settle(&self, ids: &[InstanceId]) -> Result<()> {
        self.lifecycle.settle(ids).await
    }

    /// Wait until no instance has a transition in flight.
    pub async fn settle_all(&self) {
        self.lifecycle.settle_all().await
    }

    /// Get simulator metrics.
    pub fn metrics(&self) -> SimulatorMetrics {
        let lifecycle = self.lifecycle.metrics();
        SimulatorMetrics {
            reservations: self.registry.reservation_count(),
            instances: self.registry.instance_count(),
            queries_issued: self.queries.queries_issued(),
            transitions_applied: lifecycle.transitions_applied,
            chains_scheduled: lifecycle.chains_scheduled,
            chains_superseded: lifecycle.chains_superseded,
            pending_transitions: self.lifecycle.pending_chains(),
        }
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        debug!(instances = self.registry.instance_count(), "Shutting down simulator");
        self.lifecycle.shutdown();
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("metrics", &self.metrics())
            .finish()
    }
}

/// Simulator metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorMetrics {
    /// Reservations launched
    pub reservations: usize,
    /// Instances launched
    pub instances: usize,
    /// Queries issued (instance and image queries, waiter polls included)
    pub queries_issued: u64,
    /// Lifecycle steps applied
    pub transitions_applied: u64,
    /// Transition chains installed
    pub chains_scheduled: u64,
    /// Transition chains aborted before completing
    pub chains_superseded: u64,
    /// Instances with a transition in flight
    pub pending_transitions: usize,
}

/// Builder for simulator configuration.
///
/// Starts from [`SimConfig::default`]; individual setters override one value.
///
/// # Example
///
/// ```ignore
/// // Fast lifecycle for tests
/// let sim = Simulator::builder()
///     .state_change_delay(Duration::from_millis(10))
///     .waiter_delay(Duration::from_millis(10))
///     .build()?;
///
/// // From a config file
/// let sim = Simulator::builder()
///     .config(SimConfig::from_file("cloudsim.toml")?)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulatorBuilder {
    config: SimConfig,
    runtime: Option<Handle>,
}

impl SimulatorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the delay before each lifecycle step.
    pub fn state_change_delay(mut self, delay: Duration) -> Self {
        self.config.state_change_delay_ms = millis(delay);
        self
    }

    /// Set the query latency.
    pub fn describe_delay(mut self, delay: Duration) -> Self {
        self.config.describe_delay_ms = millis(delay);
        self
    }

    /// Set the waiter poll interval.
    pub fn waiter_delay(mut self, delay: Duration) -> Self {
        self.config.waiter.delay_ms = millis(delay);
        self
    }

    /// Set the waiter attempt budget.
    pub fn waiter_max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.waiter.max_attempts = max_attempts;
        self
    }

    /// Set the image catalog.
    pub fn images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.images = images.into_iter().map(Into::into).collect();
        self
    }

    /// Spawn lifecycle tasks on this runtime instead of the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the simulator.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: the configuration does not validate
    /// - `Runtime`: no runtime was given and none is current
    pub fn build(self) -> Result<Simulator> {
        self.config.validate()?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?,
        };

        let registry = Arc::new(Registry::new());
        let lifecycle = LifecycleEngine::new(
            Arc::clone(&registry),
            runtime,
            self.config.state_change_delay(),
        );
        let queries = Arc::new(QueryEngine::new(
            Arc::clone(&registry),
            self.config.describe_delay(),
            self.config.images.clone(),
        ));
        let waiter = Waiter::new(Arc::clone(&queries), self.config.waiter.clone());

        Ok(Simulator {
            registry,
            lifecycle,
            queries,
            waiter,
            config: self.config,
        })
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
