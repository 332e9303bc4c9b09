//! Pull flow and bus routing over the in-process bus.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use gateway_sync::bus::{BusMessage, LocalBus, Publisher, DEFAULT_TOPIC};
use gateway_sync::config::loader::load_config;
use gateway_sync::lifecycle::Shutdown;
use gateway_sync::sync::sanitize::SANITIZED_FIELDS;
use gateway_sync::sync::{Command, ConfigSnapshotEnvelope, Dispatcher, Notification};

mod common;

use common::{push_payload, query_payload, remote_enabled, TestNode, HOSTNAME, NODE_ID, PID};

fn notification(command: Command, payload: String) -> BusMessage {
    BusMessage {
        topic: DEFAULT_TOPIC.to_string(),
        payload: Notification::new(command, payload).encode().unwrap(),
    }
}

#[tokio::test]
async fn test_scenario_c_query_gets_sanitized_snapshot() {
    let bus = Arc::new(LocalBus::default());
    let node = TestNode::start(remote_enabled(), bus.clone());

    let shutdown = Shutdown::new();
    let (tx, mut responses) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(node.coordinator.clone()).with_responses(tx);
    let task = tokio::spawn(dispatcher.run(bus.subscribe(), shutdown.subscribe()));

    let query = Notification::new(Command::GetConfig, query_payload(HOSTNAME, ""));
    bus.publish(DEFAULT_TOPIC, query.encode().unwrap()).unwrap();

    let response: ConfigSnapshotEnvelope = tokio::time::timeout(Duration::from_secs(5), responses.recv())
        .await
        .expect("no response within timeout")
        .expect("response channel closed");

    assert_eq!(response.responder_hostname, HOSTNAME);
    assert_eq!(response.responder_node_id, NODE_ID);
    for field in SANITIZED_FIELDS {
        assert!(!response.configuration.contains_key(field), "{field} leaked");
    }

    let on_disk = gateway_sync::config::loader::read_document(&node.config_path).unwrap();
    for (key, value) in &on_disk {
        if !SANITIZED_FIELDS.contains(&key.as_str()) {
            assert_eq!(response.configuration.get(key), Some(value));
        }
    }
    assert_eq!(response.configuration.len(), on_disk.len() - SANITIZED_FIELDS.len());

    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test]
async fn test_query_for_other_node_gets_no_answer() {
    let bus = Arc::new(LocalBus::default());
    let node = TestNode::start(remote_enabled(), bus.clone());
    let mut observer = bus.subscribe();

    let dispatcher = Dispatcher::new(node.coordinator.clone());
    let handle = dispatcher
        .dispatch(notification(Command::GetConfig, query_payload("gw-9", "node-9")))
        .expect("query should be handled");
    handle.await.unwrap();

    assert!(observer.try_recv().is_err());
}

#[tokio::test]
async fn test_push_over_bus_is_applied() {
    let bus = Arc::new(LocalBus::default());
    let node = TestNode::start(remote_enabled(), bus.clone());
    let dispatcher = Dispatcher::new(node.coordinator.clone());

    let payload = push_payload(
        "",
        NODE_ID,
        json!({ "cluster": { "watch_config": true } }),
    );
    dispatcher
        .dispatch(notification(Command::PushConfig, payload))
        .expect("push should be handled")
        .await
        .unwrap();

    assert!(load_config(&node.config_path).unwrap().cluster.watch_config);
    assert_eq!(node.backups().len(), 1);
    assert_eq!(node.reloader.calls(), vec![PID]);
}

#[tokio::test]
async fn test_unrelated_traffic_is_ignored() {
    let bus = Arc::new(LocalBus::default());
    let node = TestNode::start(remote_enabled(), bus.clone());
    let dispatcher = Dispatcher::new(node.coordinator.clone());

    let other_topic = BusMessage {
        topic: "gateway.keys".to_string(),
        payload: Notification::new(Command::GetConfig, query_payload(HOSTNAME, NODE_ID))
            .encode()
            .unwrap(),
    };
    assert!(dispatcher.dispatch(other_topic).is_none());

    let unknown = BusMessage {
        topic: DEFAULT_TOPIC.to_string(),
        payload: json!({ "command": "api-updated", "payload": "{}" }).to_string(),
    };
    assert!(dispatcher.dispatch(unknown).is_none());

    let garbage = BusMessage {
        topic: DEFAULT_TOPIC.to_string(),
        payload: "\u{0}\u{1}".to_string(),
    };
    assert!(dispatcher.dispatch(garbage).is_none());

    assert!(node.backups().is_empty());
    assert!(node.reloader.calls().is_empty());
}
