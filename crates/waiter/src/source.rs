//! Where a waiter gets its observations from

use async_trait::async_trait;
use cloudsim_core::{DescribeInstancesOutput, InstanceQuery, Result};
use cloudsim_engine::QueryEngine;

/// Anything that can answer instance queries
#[async_trait]
pub trait InstanceSource: Send + Sync + 'static {
    /// Describe the instances matching `query`
    async fn describe_instances(&self, query: &InstanceQuery) -> Result<DescribeInstancesOutput>;
}

#[async_trait]
impl InstanceSource for QueryEngine {
    async fn describe_instances(&self, query: &InstanceQuery) -> Result<DescribeInstancesOutput> {
        QueryEngine::describe_instances(self, query).await
    }
}
