//! Bounded polling waiter
//!
//! ## Protocol
//!
//! For `attempt` in `1..=max_attempts`:
//! 1. Sleep `delay` (cancellable)
//! 2. Issue one query; a query error ends the wait with that error
//! 3. Succeed if the condition holds
//! 4. Stop with `Cancelled` if the token fired meanwhile
//!
//! After the last attempt the wait fails with `ExceededWaitAttempts`.
//!
//! The polling loop runs as its own task. The caller's future races that task
//! against the cancellation token, and the task is aborted on every exit path,
//! including the caller dropping the future.

use crate::condition::{WaitCondition, WaitOutcome};
use crate::source::InstanceSource;
use cloudsim_core::{Error, InstanceQuery, Result, WaiterConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Polls an [`InstanceSource`] until a [`WaitCondition`] holds
#[derive(Debug)]
pub struct Waiter<S: InstanceSource> {
    source: Arc<S>,
    config: WaiterConfig,
}

impl<S: InstanceSource> Clone for Waiter<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
        }
    }
}

impl<S: InstanceSource> Waiter<S> {
    /// Create a waiter over `source`
    pub fn new(source: Arc<S>, config: WaiterConfig) -> Self {
        Self { source, config }
    }

    /// Pacing of this waiter
    pub fn config(&self) -> &WaiterConfig {
        &self.config
    }

    /// Wait until `condition` holds for the result of `query`
    ///
    /// # Errors
    ///
    /// - `ExceededWaitAttempts`: the condition never held within the budget
    /// - `Cancelled`: `cancel` fired first
    /// - any error returned by the source, unchanged
    /// - `Runtime`: the polling task panicked
    pub async fn wait(
        &self,
        query: InstanceQuery,
        condition: WaitCondition,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        let token = cancel.child_token();
        let mut task = AbortOnDrop(tokio::spawn(poll(
            Arc::clone(&self.source),
            query,
            condition,
            self.config.clone(),
            token.clone(),
        )));

        let joined = tokio::select! {
            biased;
            joined = &mut task.0 => Some(joined),
            _ = cancel.cancelled() => None,
        };

        match joined {
            Some(Ok(result)) => result,
            Some(Err(e)) => Err(Error::Runtime(format!("waiter task failed: {}", e))),
            None => {
                token.cancel();
                task.0.abort();
                let _ = (&mut task.0).await;
                debug!(%condition, "Waiter cancelled");
                Err(Error::Cancelled)
            }
        }
    }
}

async fn poll<S: InstanceSource>(
    source: Arc<S>,
    query: InstanceQuery,
    condition: WaitCondition,
    config: WaiterConfig,
    cancel: CancellationToken,
) -> Result<WaitOutcome> {
    let delay = config.delay();
    for attempt in 1..=config.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        let output = source.describe_instances(&query).await?;
        let satisfied = condition.is_satisfied(&output);
        debug!(attempt, matched = output.len(), satisfied, %condition, "Waiter attempt");

        if satisfied {
            info!(attempts = attempt, %condition, "Wait condition satisfied");
            return Ok(WaitOutcome { attempts: attempt });
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
    }

    info!(attempts = config.max_attempts, %condition, "Waiter exhausted its attempts");
    Err(Error::ExceededWaitAttempts {
        attempts: config.max_attempts,
    })
}
