//! Lifecycle engine
//!
//! Executes instance state transitions in the background, one fixed delay per
//! step, independent of the caller.
//!
//! ## Transition Table
//!
//! | Operation | From | Steps |
//! |-----------|------|-------|
//! | start | Stopped | Pending, Running |
//! | start | Pending | Running |
//! | start | Running | (no-op) |
//! | stop | Running | Stopping, Stopped |
//! | stop | Stopping | Stopped |
//! | stop | Stopped | (no-op) |
//! | terminate | Pending, Running, Stopping, Stopped | ShuttingDown, Terminated |
//! | terminate | ShuttingDown | Terminated |
//! | terminate | Terminated | (no-op) |
//!
//! Anything else is rejected with `IncorrectInstanceState` before any work is
//! scheduled. Launch has its own one-step chain, Pending → Running.
//!
//! ## Chains
//!
//! Each accepted request installs a chain: a spawned task that sleeps, then
//! applies one step under the instance lock, until the last step. The chain
//! is owned by the instance record together with an epoch number.
//!
//! - Same target as the in-flight chain: the in-flight chain is kept.
//! - Different target: the in-flight chain is aborted and its epoch retired
//!   (last writer wins). A retired chain that already passed its sleep sees
//!   the epoch mismatch under the lock and writes nothing.
//! - A chain heading to `Terminated` cannot be overridden by start or stop.
//! - Each step re-checks the edge before writing.

use crate::registry::{Chain, InstanceRecord, InstanceSlot, Registry};
use cloudsim_core::{
    Error, InstanceId, InstanceState, InstanceStateChange, LaunchRequest, Operation, Reservation,
    Result,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Steps that `operation` schedules from `current`
///
/// Returns `None` when the operation has no edge from `current`, and an
/// empty slice when the request is already satisfied.
pub fn plan_transition(
    operation: Operation,
    current: InstanceState,
) -> Option<&'static [InstanceState]> {
    use InstanceState::*;
    match (operation, current) {
        (Operation::Start, Stopped) => Some(&[Pending, Running]),
        (Operation::Start, Pending) => Some(&[Running]),
        (Operation::Start, Running) => Some(&[]),
        (Operation::Stop, Running) => Some(&[Stopping, Stopped]),
        (Operation::Stop, Stopping) => Some(&[Stopped]),
        (Operation::Stop, Stopped) => Some(&[]),
        (Operation::Terminate, Pending | Running | Stopping | Stopped) => {
            Some(&[ShuttingDown, Terminated])
        }
        (Operation::Terminate, ShuttingDown) => Some(&[Terminated]),
        (Operation::Terminate, Terminated) => Some(&[]),
        _ => None,
    }
}

const LAUNCH_STEPS: &[InstanceState] = &[InstanceState::Running];

/// What an accepted request does to one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    /// The in-flight chain already heads to the target
    Keep,
    /// Already satisfied; retire any chain heading elsewhere
    Settle,
    /// Install a new chain
    Schedule(&'static [InstanceState]),
}

fn decide(
    operation: Operation,
    id: &InstanceId,
    record: &InstanceRecord,
) -> Result<(Decision, InstanceState)> {
    let in_flight = record.chain.as_ref().map(|chain| chain.target);
    let incorrect = || Error::IncorrectInstanceState {
        instance_id: id.clone(),
        state: record.state,
        operation,
    };

    if in_flight == Some(InstanceState::Terminated) && operation != Operation::Terminate {
        return Err(incorrect());
    }

    let steps = plan_transition(operation, record.state).ok_or_else(incorrect)?;
    let target = steps.last().copied().unwrap_or(record.state);
    let decision = match in_flight {
        Some(t) if t == target => Decision::Keep,
        _ if steps.is_empty() => Decision::Settle,
        _ => Decision::Schedule(steps),
    };
    Ok((decision, target))
}

#[derive(Debug, Default)]
struct LifecycleCounters {
    transitions_applied: AtomicU64,
    chains_scheduled: AtomicU64,
    chains_superseded: AtomicU64,
}

/// Lifecycle counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleMetrics {
    /// Steps written to instance records
    pub transitions_applied: u64,
    /// Chains installed (launch chains included)
    pub chains_scheduled: u64,
    /// Chains aborted by a later request or by shutdown
    pub chains_superseded: u64,
}

/// Drives delayed state transitions for the instances of a registry
#[derive(Debug)]
pub struct LifecycleEngine {
    registry: Arc<Registry>,
    runtime: Handle,
    step_delay: Duration,
    counters: Arc<LifecycleCounters>,
}

impl LifecycleEngine {
    /// Create an engine spawning its chains on `runtime`
    pub fn new(registry: Arc<Registry>, runtime: Handle, step_delay: Duration) -> Self {
        Self {
            registry,
            runtime,
            step_delay,
            counters: Arc::new(LifecycleCounters::default()),
        }
    }

    /// Delay before each step
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Launch a reservation
    ///
    /// Returns the new reservation synchronously, every instance `Pending`.
    /// Each instance moves to `Running` after one step delay.
    pub fn launch(&self, request: &LaunchRequest) -> Result<Reservation> {
        let (reservation_id, slots) = self.registry.allocate(request)?;

        let instances = slots
            .iter()
            .map(|slot| {
                let mut record = slot.lock();
                self.install_chain(slot, &mut record, LAUNCH_STEPS);
                slot.snapshot_with(&record)
            })
            .collect();

        info!(
            reservation_id = %reservation_id,
            count = request.count,
            image_id = %request.image_id,
            "Launched reservation"
        );
        Ok(Reservation {
            reservation_id,
            instances,
        })
    }

    /// Apply a start/stop/terminate request to a set of instances
    ///
    /// The request is all-or-nothing: every id must exist and every instance
    /// must have an edge for `operation`, otherwise nothing is scheduled.
    /// All involved records stay locked, in id order, from validation until
    /// the chains are installed.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: an id is not in the registry
    /// - `IncorrectInstanceState`: an instance has no edge for `operation`
    pub fn change_state(
        &self,
        operation: Operation,
        ids: &[InstanceId],
    ) -> Result<Vec<InstanceStateChange>> {
        let slots = self.registry.resolve(ids)?;
        let mut records: Vec<_> = slots.iter().map(|slot| slot.lock()).collect();

        let decisions = slots
            .iter()
            .zip(records.iter())
            .map(|(slot, record)| decide(operation, slot.id(), record))
            .collect::<Result<Vec<_>>>()?;

        let mut changes = Vec::with_capacity(slots.len());
        for ((slot, record), (decision, target)) in
            slots.iter().zip(records.iter_mut()).zip(decisions)
        {
            match decision {
                Decision::Keep => {}
                Decision::Settle => self.retire_chain(slot, record),
                Decision::Schedule(steps) => self.install_chain(slot, record, steps),
            }
            debug!(
                instance_id = %slot.id(),
                %operation,
                state = %record.state,
                target = %target,
                ?decision,
                "Accepted state change"
            );
            changes.push(InstanceStateChange {
                instance_id: slot.id().clone(),
                current_state: record.state,
                target_state: target,
            });
        }
        Ok(changes)
    }

    /// Wait until the given instances have no chain in flight
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: an id is not in the registry
    pub async fn settle(&self, ids: &[InstanceId]) -> Result<()> {
        let slots = self.registry.resolve(ids)?;
        for slot in slots {
            slot.settled().await;
        }
        Ok(())
    }

    /// Wait until no instance has a chain in flight
    pub async fn settle_all(&self) {
        for slot in self.registry.slots() {
            slot.settled().await;
        }
    }

    /// Abort every in-flight chain
    pub fn shutdown(&self) {
        for slot in self.registry.slots() {
            let mut record = slot.lock();
            self.retire_chain(&slot, &mut record);
        }
    }

    /// Current counters
    pub fn metrics(&self) -> LifecycleMetrics {
        LifecycleMetrics {
            transitions_applied: self.counters.transitions_applied.load(Ordering::Relaxed),
            chains_scheduled: self.counters.chains_scheduled.load(Ordering::Relaxed),
            chains_superseded: self.counters.chains_superseded.load(Ordering::Relaxed),
        }
    }

    /// Number of instances with a chain in flight
    pub fn pending_chains(&self) -> usize {
        self.registry
            .slots()
            .iter()
            .filter(|slot| slot.pending_target().is_some())
            .count()
    }

    /// Replace the record's chain with a new one running `steps`
    ///
    /// Must be called with the record locked. The spawned task cannot observe
    /// its epoch before the caller releases the lock.
    fn install_chain(
        &self,
        slot: &Arc<InstanceSlot>,
        record: &mut InstanceRecord,
        steps: &'static [InstanceState],
    ) {
        let Some(&target) = steps.last() else {
            return;
        };
        self.abort_in_flight(record);
        record.epoch += 1;

        let task = run_chain(
            Arc::clone(slot),
            record.epoch,
            steps,
            self.step_delay,
            Arc::clone(&self.counters),
        );
        record.chain = Some(Chain {
            epoch: record.epoch,
            target,
            handle: self.runtime.spawn(task),
        });
        slot.publish_activity(Some(target));
        self.counters.chains_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Abort the record's chain, if any, and mark the instance idle
    fn retire_chain(&self, slot: &InstanceSlot, record: &mut InstanceRecord) {
        if self.abort_in_flight(record) {
            record.epoch += 1;
            slot.publish_activity(None);
        }
    }

    fn abort_in_flight(&self, record: &mut InstanceRecord) -> bool {
        match record.chain.take() {
            Some(chain) => {
                debug!(epoch = chain.epoch, target = %chain.target, "Superseding transition chain");
                chain.handle.abort();
                self.counters.chains_superseded.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

/// Body of a transition chain
async fn run_chain(
    slot: Arc<InstanceSlot>,
    epoch: u64,
    steps: &'static [InstanceState],
    delay: Duration,
    counters: Arc<LifecycleCounters>,
) {
    for (i, &next) in steps.iter().enumerate() {
        tokio::time::sleep(delay).await;

        let mut record = slot.lock();
        if record.epoch != epoch {
            debug!(instance_id = %slot.id(), epoch, "Transition chain retired, dropping step");
            return;
        }

        let from = record.state;
        let legal = from.can_transition_to(next);
        if legal {
            record.state = next;
            counters.transitions_applied.fetch_add(1, Ordering::Relaxed);
            debug!(instance_id = %slot.id(), %from, to = %next, "Applied transition");
        } else {
            warn!(instance_id = %slot.id(), %from, to = %next, "Rejected illegal transition");
        }

        if !legal || i + 1 == steps.len() {
            record.chain = None;
            slot.publish_activity(None);
            return;
        }
    }
}
