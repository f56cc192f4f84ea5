//! Concurrency Tests
//!
//! Tests for concurrent callers and for the supersede policy between
//! overlapping requests on the same instance.

use crate::*;
use std::sync::Arc;

// =============================================================================
// SUPERSEDE POLICY
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_retired_chain_never_writes() {
    let sim = create_simulator();
    let ids = launch_running(&sim, 1).await;
    let applied = sim.metrics().transitions_applied;

    sim.stop_instances(&ids).unwrap();
    advance(HALF_STEP).await;
    // No-op start retires the pending stop.
    sim.start_instances(&ids).unwrap();

    advance(STEP * 6).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Running);
    assert_eq!(sim.metrics().transitions_applied, applied);
    assert_eq!(sim.metrics().chains_superseded, 1);
}

#[tokio::test(start_paused = true)]
async fn test_terminate_supersedes_stop() {
    let sim = create_simulator();
    let ids = launch_running(&sim, 1).await;

    sim.stop_instances(&ids).unwrap();
    advance(HALF_STEP).await;
    sim.terminate_instances(&ids).unwrap();

    // The stop's first step would have landed here.
    advance(Duration::from_millis(3_750)).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Running);

    advance(HALF_STEP).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::ShuttingDown);

    advance(STEP).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Terminated);
}

#[tokio::test(start_paused = true)]
async fn test_terminate_supersedes_stopping() {
    let sim = create_simulator();
    let ids = launch_running(&sim, 1).await;
    sim.stop_instances(&ids).unwrap();
    advance(STEP + HALF_STEP).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Stopping);

    let changes = sim.terminate_instances(&ids).unwrap();
    assert_eq!(changes[0].current_state, InstanceState::Stopping);

    // The stop would have reached Stopped here; the terminate chain has not stepped yet.
    advance(HALF_STEP + Duration::from_millis(1_250)).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Stopping);

    advance(HALF_STEP).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::ShuttingDown);

    sim.settle(&ids).await.unwrap();
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Terminated);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_stop_does_not_restart_timer() {
    let sim = create_simulator();
    let ids = launch_running(&sim, 1).await;

    sim.stop_instances(&ids).unwrap();
    for _ in 0..4 {
        advance(Duration::from_secs(1)).await;
        sim.stop_instances(&ids).unwrap();
    }

    advance(Duration::from_millis(1_500)).await;
    assert_eq!(state_of(&sim, &ids[0]), InstanceState::Stopping);
    assert_eq!(sim.metrics().chains_superseded, 0);
}

// =============================================================================
// CONCURRENT CALLERS
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_launches_get_unique_ids() {
    init_tracing();
    let sim = Arc::new(Simulator::new().unwrap());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let sim = Arc::clone(&sim);
            tokio::spawn(async move {
                (0..5)
                    .flat_map(|_| sim.launch(2).unwrap().instance_ids())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.extend(handle.await.unwrap());
    }
    let total = ids.len();
    ids.sort();
    ids.dedup();

    assert_eq!(total, 16 * 5 * 2);
    assert_eq!(ids.len(), total);
    let metrics = sim.metrics();
    assert_eq!(metrics.instances, total);
    assert_eq!(metrics.reservations, 16 * 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_settle_in_stable_states() {
    init_tracing();
    let sim = Arc::new(
        Simulator::builder()
            .state_change_delay(Duration::from_millis(5))
            .build()
            .unwrap(),
    );
    let ids = sim.launch(8).unwrap().instance_ids();
    sim.settle(&ids).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let sim = Arc::clone(&sim);
            let ids = ids.clone();
            tokio::spawn(async move {
                let mut terminated = Vec::new();
                for round in 0..20usize {
                    let id = &ids[(worker + round) % ids.len()];
                    let result = match (worker + round) % 7 {
                        0 => sim.terminate_instances(std::slice::from_ref(id)),
                        1 | 2 | 3 => sim.stop_instances(std::slice::from_ref(id)),
                        _ => sim.start_instances(std::slice::from_ref(id)),
                    };
                    if (worker + round) % 7 == 0 && result.is_ok() {
                        terminated.push(id.clone());
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                terminated
            })
        })
        .collect();

    let mut terminated = Vec::new();
    for handle in handles {
        terminated.extend(handle.await.unwrap());
    }
    sim.settle_all().await;

    for id in &ids {
        let state = state_of(&sim, id);
        assert!(!state.is_transitional(), "{} left in {}", id, state);
    }
    for id in &terminated {
        assert_eq!(state_of(&sim, id), InstanceState::Terminated);
    }
    assert_eq!(sim.metrics().pending_transitions, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tagging_keeps_every_tag() {
    init_tracing();
    let sim = Arc::new(Simulator::new().unwrap());
    let id = sim.launch(1).unwrap().instance_ids().remove(0);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let sim = Arc::clone(&sim);
            let id = id.clone();
            tokio::spawn(async move {
                for n in 0..50 {
                    sim.create_tags(&id, [Tag::new(format!("w{}", worker), n.to_string())])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let instance = sim.instance(&id).unwrap();
    assert_eq!(instance.tags.len(), 8 * 50);
    for worker in 0..8 {
        let values: Vec<String> = instance
            .tag_values(&format!("w{}", worker))
            .map(str::to_string)
            .collect();
        let expected: Vec<String> = (0..50).map(|n: i32| n.to_string()).collect();
        assert_eq!(values, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_queries_during_transitions_see_whole_instances() {
    let sim = create_simulator();
    let ids = launch_running(&sim, 4).await;
    for id in &ids {
        sim.create_tags(id, [Tag::new("group", "a")]).unwrap();
    }
    sim.stop_instances(&ids).unwrap();

    for _ in 0..12 {
        let output = sim.describe_instances(&InstanceQuery::new()).await.unwrap();
        assert_eq!(output.len(), 4);
        for instance in &output.instances {
            assert!(matches!(
                instance.state,
                InstanceState::Running | InstanceState::Stopping | InstanceState::Stopped
            ));
            assert_eq!(instance.tags, vec![Tag::new("group", "a")]);
        }
    }
}
