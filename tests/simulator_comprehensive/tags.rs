//! Tag Tests
//!
//! Tests for create_tags: accumulation order, duplicate keys and unknown ids.

use crate::*;

#[tokio::test(start_paused = true)]
async fn test_tags_accumulate_in_call_order() {
    let sim = create_simulator();
    let ids = sim.launch(1).unwrap().instance_ids();

    sim.create_tags(&ids[0], [Tag::new("env", "dev")]).unwrap();
    sim.create_tags(&ids[0], [Tag::new("team", "core"), Tag::new("tier", "1")])
        .unwrap();

    let tags = sim.instance(&ids[0]).unwrap().tags;
    assert_eq!(
        tags,
        vec![
            Tag::new("env", "dev"),
            Tag::new("team", "core"),
            Tag::new("tier", "1"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_existing_key_is_not_overwritten() {
    let sim = create_simulator();
    let ids = sim.launch(1).unwrap().instance_ids();

    sim.create_tags(&ids[0], [Tag::new("env", "dev")]).unwrap();
    sim.create_tags(&ids[0], [Tag::new("env", "prod")]).unwrap();

    let instance = sim.instance(&ids[0]).unwrap();
    assert_eq!(instance.tag_values("env").collect::<Vec<_>>(), vec!["dev", "prod"]);

    // Either value matches a tag filter.
    let output = sim
        .describe_instances(&InstanceQuery::new().filter(Filter::tag("env", ["prod"])))
        .await
        .unwrap();
    assert_eq!(output.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_id_mutates_nothing() {
    let sim = create_simulator();
    let ids = sim.launch(2).unwrap().instance_ids();
    let missing = InstanceId::new("i-00000000000000fff");

    let err = sim
        .create_tags(&missing, [Tag::new("env", "dev")])
        .unwrap_err();

    assert_eq!(err, Error::NoInstanceFound(missing));
    assert!(err.is_not_found());
    for id in &ids {
        assert!(sim.instance(id).unwrap().tags.is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn test_empty_tag_list_is_accepted() {
    let sim = create_simulator();
    let ids = sim.launch(1).unwrap().instance_ids();

    sim.create_tags(&ids[0], Vec::new()).unwrap();

    assert!(sim.instance(&ids[0]).unwrap().tags.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tags_survive_transitions() {
    let sim = create_simulator();
    let ids = sim.launch(1).unwrap().instance_ids();
    sim.create_tags(&ids[0], [Tag::new("name", "web-1")]).unwrap();

    sim.settle(&ids).await.unwrap();
    sim.terminate_instances(&ids).unwrap();
    sim.settle(&ids).await.unwrap();

    let instance = sim.instance(&ids[0]).unwrap();
    assert_eq!(instance.state, InstanceState::Terminated);
    assert_eq!(instance.tags, vec![Tag::new("name", "web-1")]);
}
