//! Query engine
//!
//! Read-only access to the registry with a fixed synthetic latency. Matching
//! instances from every reservation are flattened into one result group, in
//! registry order.
//!
//! Faults can be injected with [`QueryEngine::fail_next_queries`]; the next
//! `n` queries then fail with `QueryFailed` after the usual latency.

use crate::registry::Registry;
use cloudsim_core::{DescribeInstancesOutput, Error, Image, InstanceId, InstanceQuery, Result};
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Answers instance and image queries
#[derive(Debug)]
pub struct QueryEngine {
    registry: Arc<Registry>,
    latency: Duration,
    images: Vec<Image>,
    queries_issued: AtomicU64,
    pending_faults: AtomicU32,
}

impl QueryEngine {
    /// Create a query engine over `registry`
    pub fn new(registry: Arc<Registry>, latency: Duration, images: Vec<String>) -> Self {
        Self {
            registry,
            latency,
            images: images
                .into_iter()
                .map(|image_id| Image { image_id })
                .collect(),
            queries_issued: AtomicU64::new(0),
            pending_faults: AtomicU32::new(0),
        }
    }

    /// Synthetic latency of every query
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Describe the instances matching `query`
    ///
    /// The query is counted when it is issued, before the latency elapses.
    ///
    /// # Errors
    ///
    /// - `QueryFailed`: an injected fault was consumed
    pub async fn describe_instances(&self, query: &InstanceQuery) -> Result<DescribeInstancesOutput> {
        let issued = self.queries_issued.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.latency).await;
        self.take_fault(issued)?;

        let output = self.evaluate(query);
        debug!(
            query = issued,
            ids = query.ids().len(),
            filters = query.filters().len(),
            matched = output.len(),
            "Served instance query"
        );
        Ok(output)
    }

    /// Describe the image catalog
    pub async fn describe_images(&self) -> Result<Vec<Image>> {
        let issued = self.queries_issued.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.latency).await;
        self.take_fault(issued)?;
        Ok(self.images.clone())
    }

    /// Match `query` against the registry without latency
    pub fn evaluate(&self, query: &InstanceQuery) -> DescribeInstancesOutput {
        let wanted: FxHashSet<&InstanceId> = query.ids().iter().collect();
        let mut instances = Vec::new();
        self.registry.scan(|slot, record| {
            if !wanted.is_empty() && !wanted.contains(slot.id()) {
                return;
            }
            if query.filters_match(record.state, &record.tags) {
                instances.push(slot.snapshot_with(record));
            }
        });
        DescribeInstancesOutput { instances }
    }

    /// Make the next `n` queries fail
    pub fn fail_next_queries(&self, n: u32) {
        self.pending_faults.fetch_add(n, Ordering::SeqCst);
    }

    /// Number of queries issued so far
    pub fn queries_issued(&self) -> u64 {
        self.queries_issued.load(Ordering::SeqCst)
    }

    fn take_fault(&self, query: u64) -> Result<()> {
        let consumed = self
            .pending_faults
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            warn!(query, "Injected query fault");
            return Err(Error::QueryFailed(format!("injected fault on query {}", query)));
        }
        Ok(())
    }
}
