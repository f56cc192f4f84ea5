//! Launch Tests
//!
//! Tests for launch/run_instances: reservation shape, id allocation and the
//! launch transition.

use crate::*;

// =============================================================================
// RESERVATION SHAPE
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_launch_returns_pending_reservation() {
    let sim = create_simulator();

    let reservation = sim.launch(3).unwrap();

    assert_eq!(reservation.instances.len(), 3);
    for instance in &reservation.instances {
        assert_eq!(instance.state, InstanceState::Pending);
        assert_eq!(instance.reservation_id, reservation.reservation_id);
        assert!(instance.tags.is_empty());
    }
    assert_eq!(sim.reservations().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_launch_zero_rejected() {
    let sim = create_simulator();

    let err = sim.launch(0).unwrap_err();

    assert!(matches!(err, Error::InvalidParameter(_)));
    assert_eq!(err.code(), "InvalidParameterValue");
    assert!(sim.reservations().is_empty());
    assert_eq!(sim.metrics().instances, 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_instances_records_image_and_type() {
    let sim = create_simulator();

    let reservation = sim
        .run_instances(
            LaunchRequest::new(2)
                .image_id("ami-12345678")
                .instance_type("m5.large"),
        )
        .unwrap();

    for instance in &reservation.instances {
        assert_eq!(instance.image_id, "ami-12345678");
        assert_eq!(instance.instance_type, "m5.large");
    }
}

#[tokio::test(start_paused = true)]
async fn test_launch_defaults() {
    let sim = create_simulator();

    let instance = sim.launch(1).unwrap().instances.remove(0);

    assert_eq!(instance.image_id, "ami-00000000");
    assert_eq!(instance.instance_type, "t2.micro");
}

// =============================================================================
// ID ALLOCATION
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_ids_have_provider_format() {
    let sim = create_simulator();

    let reservation = sim.launch(2).unwrap();

    assert_eq!(reservation.reservation_id.as_str(), "r-00000000000000001");
    assert_eq!(reservation.instances[0].instance_id.as_str(), "i-00000000000000001");
    assert_eq!(reservation.instances[1].instance_id.as_str(), "i-00000000000000002");
}

#[tokio::test(start_paused = true)]
async fn test_ids_unique_across_reservations() {
    let sim = create_simulator();

    let mut ids: Vec<InstanceId> = (1..=5)
        .flat_map(|n| sim.launch(n).unwrap().instance_ids())
        .collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();

    assert_eq!(total, 15);
    assert_eq!(ids.len(), total);
}

#[tokio::test(start_paused = true)]
async fn test_reservations_kept_in_launch_order() {
    let sim = create_simulator();

    let first = sim.launch(1).unwrap();
    let second = sim.launch(2).unwrap();

    let reservations = sim.reservations();
    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].reservation_id, first.reservation_id);
    assert_eq!(reservations[1].reservation_id, second.reservation_id);
    assert_eq!(reservations[1].instances.len(), 2);
}

// =============================================================================
// LAUNCH TRANSITION
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_all_running_after_one_delay() {
    let sim = create_simulator();
    let ids = sim.launch(4).unwrap().instance_ids();

    advance(HALF_STEP).await;
    assert!(ids.iter().all(|id| state_of(&sim, id) == InstanceState::Pending));

    advance(STEP).await;
    assert!(ids.iter().all(|id| state_of(&sim, id) == InstanceState::Running));

    let metrics = sim.metrics();
    assert_eq!(metrics.transitions_applied, 4);
    assert_eq!(metrics.pending_transitions, 0);
}

#[tokio::test(start_paused = true)]
async fn test_settle_waits_for_launch() {
    let sim = create_simulator();
    let ids = sim.launch(2).unwrap().instance_ids();
    let start = tokio::time::Instant::now();

    sim.settle(&ids).await.unwrap();

    assert_eq!(start.elapsed(), STEP);
    assert!(ids.iter().all(|id| state_of(&sim, id) == InstanceState::Running));
}

#[tokio::test(start_paused = true)]
async fn test_returned_reservation_is_a_snapshot() {
    let sim = create_simulator();
    let reservation = sim.launch(1).unwrap();
    let id = reservation.instances[0].instance_id.clone();

    sim.settle(&[id.clone()]).await.unwrap();

    assert_eq!(reservation.instances[0].state, InstanceState::Pending);
    assert_eq!(state_of(&sim, &id), InstanceState::Running);
}
