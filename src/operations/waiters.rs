//! Waiter operations.
//!
//! Every waiter polls `describe_instances` with the configured delay and
//! attempt budget. Polls count as queries.
//!
//! | Waiter | Condition |
//! |--------|-----------|
//! | `wait_until_instance_running` | some matching instance is running |
//! | `wait_until_instance_stopped` | some matching instance is stopped |
//! | `wait_until_instance_terminated` | some matching instance is terminated |
//! | `wait_until_instance_exists` | at least one instance matches |

use crate::simulator::Simulator;
use cloudsim_core::{InstanceId, InstanceQuery, InstanceState, Result};
use cloudsim_waiter::{WaitCondition, WaitOutcome};
use tokio_util::sync::CancellationToken;

impl Simulator {
    /// Poll `query` until `condition` holds.
    ///
    /// # Errors
    ///
    /// - `ExceededWaitAttempts`: the budget ran out
    /// - `Cancelled`: `cancel` fired first
    /// - `QueryFailed`: a poll failed
    pub async fn wait_until(
        &self,
        query: InstanceQuery,
        condition: WaitCondition,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        self.waiter.wait(query, condition, cancel).await
    }

    /// Wait until one of `ids` is running.
    pub async fn wait_until_instance_running(
        &self,
        ids: &[InstanceId],
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        self.wait_for_state(ids, InstanceState::Running, cancel).await
    }

    /// Wait until one of `ids` is stopped.
    pub async fn wait_until_instance_stopped(
        &self,
        ids: &[InstanceId],
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        self.wait_for_state(ids, InstanceState::Stopped, cancel).await
    }

    /// Wait until one of `ids` is terminated.
    pub async fn wait_until_instance_terminated(
        &self,
        ids: &[InstanceId],
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        self.wait_for_state(ids, InstanceState::Terminated, cancel).await
    }

    /// Wait until one of `ids` exists.
    pub async fn wait_until_instance_exists(
        &self,
        ids: &[InstanceId],
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        self.wait_until(
            InstanceQuery::for_ids(ids.iter().cloned()),
            WaitCondition::InstanceExists,
            cancel,
        )
        .await
    }

    async fn wait_for_state(
        &self,
        ids: &[InstanceId],
        state: InstanceState,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        self.wait_until(
            InstanceQuery::for_ids(ids.iter().cloned()),
            WaitCondition::InstanceInState(state),
            cancel,
        )
        .await
    }
}
