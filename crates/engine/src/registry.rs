//! Instance registry
//!
//! Holds every provisioned instance, grouped into reservations, plus the id
//! counters. The registry has no behavior of its own: the lifecycle engine
//! drives state and the query engine reads it.
//!
//! # Design
//!
//! - Reservation list: `RwLock<Vec<_>>`, append-only, preserves launch order
//! - Id index: `DashMap` for O(1) lookup by instance id
//! - Per-instance record: `Mutex`, guards state, tags and the in-flight
//!   transition chain
//!
//! # Lock Order
//!
//! reservation list → instance records, and instance records in ascending
//! id order. No lock is ever held across an `.await`.

use cloudsim_core::{
    Error, Instance, InstanceId, InstanceState, LaunchRequest, Reservation, ReservationId, Result,
    Tag,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background transition chain owned by an instance record
#[derive(Debug)]
pub(crate) struct Chain {
    /// Epoch the chain was installed under
    pub(crate) epoch: u64,
    /// Final state of the chain
    pub(crate) target: InstanceState,
    pub(crate) handle: JoinHandle<()>,
}

/// Mutable part of an instance, guarded by the slot's lock
#[derive(Debug)]
pub(crate) struct InstanceRecord {
    pub(crate) state: InstanceState,
    pub(crate) tags: Vec<Tag>,
    /// Bumped whenever a chain is installed or retired. A chain step only
    /// writes while its epoch is current.
    pub(crate) epoch: u64,
    pub(crate) chain: Option<Chain>,
}

/// One instance: immutable launch metadata plus its guarded record
#[derive(Debug)]
pub struct InstanceSlot {
    id: InstanceId,
    reservation_id: ReservationId,
    image_id: String,
    instance_type: String,
    launch_time: DateTime<Utc>,
    record: Mutex<InstanceRecord>,
    /// Target of the in-flight chain, `None` when idle
    activity: watch::Sender<Option<InstanceState>>,
}

impl InstanceSlot {
    fn new(id: InstanceId, reservation_id: ReservationId, request: &LaunchRequest) -> Self {
        let (activity, _) = watch::channel(None);
        Self {
            id,
            reservation_id,
            image_id: request.image_id.clone(),
            instance_type: request.instance_type.clone(),
            launch_time: Utc::now(),
            record: Mutex::new(InstanceRecord {
                state: InstanceState::Pending,
                tags: Vec::new(),
                epoch: 0,
                chain: None,
            }),
            activity,
        }
    }

    /// Instance id
    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> InstanceState {
        self.record.lock().state
    }

    /// Target of the in-flight transition chain, if any
    pub fn pending_target(&self) -> Option<InstanceState> {
        *self.activity.borrow()
    }

    /// Take a snapshot of this instance
    pub fn snapshot(&self) -> Instance {
        let record = self.record.lock();
        self.snapshot_with(&record)
    }

    /// Wait until no transition chain is in flight
    pub async fn settled(&self) {
        let mut rx = self.activity.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(Option::is_none).await;
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, InstanceRecord> {
        self.record.lock()
    }

    pub(crate) fn snapshot_with(&self, record: &InstanceRecord) -> Instance {
        Instance {
            instance_id: self.id.clone(),
            reservation_id: self.reservation_id.clone(),
            image_id: self.image_id.clone(),
            instance_type: self.instance_type.clone(),
            launch_time: self.launch_time,
            state: record.state,
            tags: record.tags.clone(),
        }
    }

    pub(crate) fn publish_activity(&self, target: Option<InstanceState>) {
        self.activity.send_replace(target);
    }
}

#[derive(Debug)]
struct ReservationEntry {
    id: ReservationId,
    instances: Vec<Arc<InstanceSlot>>,
}

impl ReservationEntry {
    fn snapshot(&self) -> Reservation {
        Reservation {
            reservation_id: self.id.clone(),
            instances: self.instances.iter().map(|slot| slot.snapshot()).collect(),
        }
    }
}

/// Process-wide store of reservations and instances
#[derive(Debug)]
pub struct Registry {
    reservations: RwLock<Vec<ReservationEntry>>,
    index: DashMap<InstanceId, Arc<InstanceSlot>>,
    next_instance: AtomicU64,
    next_reservation: AtomicU64,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(Vec::new()),
            index: DashMap::new(),
            next_instance: AtomicU64::new(1),
            next_reservation: AtomicU64::new(1),
        }
    }

    /// Allocate a new reservation of `request.count` pending instances
    ///
    /// Ids are drawn while the reservation list is write-locked, so the
    /// instances of one reservation get consecutive ids and reservations
    /// appear in allocation order.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: `count` is zero
    pub fn allocate(
        &self,
        request: &LaunchRequest,
    ) -> Result<(ReservationId, Vec<Arc<InstanceSlot>>)> {
        if request.count == 0 {
            return Err(Error::InvalidParameter(
                "launch count must be at least 1".into(),
            ));
        }

        let mut reservations = self.reservations.write();
        let reservation_id =
            ReservationId::from_sequence(self.next_reservation.fetch_add(1, Ordering::SeqCst));

        let instances: Vec<Arc<InstanceSlot>> = (0..request.count)
            .map(|_| {
                let id = InstanceId::from_sequence(self.next_instance.fetch_add(1, Ordering::SeqCst));
                let slot = Arc::new(InstanceSlot::new(id.clone(), reservation_id.clone(), request));
                self.index.insert(id, Arc::clone(&slot));
                slot
            })
            .collect();

        reservations.push(ReservationEntry {
            id: reservation_id.clone(),
            instances: instances.clone(),
        });
        Ok((reservation_id, instances))
    }

    /// Look up an instance
    pub fn get(&self, id: &InstanceId) -> Option<Arc<InstanceSlot>> {
        self.index.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Resolve ids to slots, deduplicated and sorted by id
    ///
    /// The returned order is the lock order for multi-instance requests.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: the first id (in request order) that is unknown
    pub fn resolve(&self, ids: &[InstanceId]) -> Result<Vec<Arc<InstanceSlot>>> {
        let mut slots = ids
            .iter()
            .map(|id| self.get(id).ok_or_else(|| Error::NoInstanceFound(id.clone())))
            .collect::<Result<Vec<_>>>()?;
        slots.sort_by(|a, b| a.id().cmp(b.id()));
        slots.dedup_by(|a, b| a.id() == b.id());
        Ok(slots)
    }

    /// Append tags to an instance
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: unknown id; nothing is mutated
    pub fn create_tags(&self, id: &InstanceId, tags: &[Tag]) -> Result<()> {
        let slot = self
            .get(id)
            .ok_or_else(|| Error::NoInstanceFound(id.clone()))?;
        slot.lock().tags.extend_from_slice(tags);
        Ok(())
    }

    /// Visit every instance record in registry order
    ///
    /// Each record is locked only for the duration of its visit.
    pub(crate) fn scan(&self, mut visit: impl FnMut(&InstanceSlot, &InstanceRecord)) {
        let reservations = self.reservations.read();
        for slot in reservations.iter().flat_map(|r| r.instances.iter()) {
            let record = slot.lock();
            visit(slot, &record);
        }
    }

    /// All slots in registry order
    pub fn slots(&self) -> Vec<Arc<InstanceSlot>> {
        self.reservations
            .read()
            .iter()
            .flat_map(|r| r.instances.iter().cloned())
            .collect()
    }

    /// Snapshot every reservation
    pub fn reservations(&self) -> Vec<Reservation> {
        self.reservations
            .read()
            .iter()
            .map(ReservationEntry::snapshot)
            .collect()
    }

    /// Number of reservations
    pub fn reservation_count(&self) -> usize {
        self.reservations.read().len()
    }

    /// Number of instances
    pub fn instance_count(&self) -> usize {
        self.index.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
