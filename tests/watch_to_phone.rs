//! Watch-to-phone sync integration test
//!
//! Exercises the full path over SimWearNetwork: sensor readings buffer on
//! the watch, flushes fail and retain data while no phone is reachable,
//! then deliver in order once a phone appears, and the phone-side
//! receiver decodes what actually went over the wire.
//!
//! Run with:
//!   cargo test --test watch_to_phone

use std::sync::Arc;

use pulselink::sync::{
    FlushOutcome, PhoneEvent, PhoneReceiver, SyncConfig, SyncCoordinator, DEFAULT_CAPABILITY,
};
use pulselink::transport::simulated::SimWearNetwork;
use pulselink::types::{Reading, ReadingBatch, ReadingStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_coordinator(network: &Arc<SimWearNetwork>) -> SyncCoordinator {
    SyncCoordinator::new(network.clone(), network.clone(), SyncConfig::default())
}

fn reading(bpm: u32, timestamp: i64) -> Reading {
    Reading::at(bpm, vec![60_000 / bpm], timestamp, ReadingStatus::Reliable)
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn buffered_readings_survive_outage_and_deliver_in_order() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);

    coordinator.on_reading(reading(70, 1)).await;
    coordinator.on_reading(reading(72, 2)).await;

    // No peers reachable: flush fails and loses nothing.
    assert_eq!(coordinator.flush().await, FlushOutcome::Failed);
    assert_eq!(coordinator.buffered().await, 2);
    assert!(!coordinator.check_connection().await);

    // Phone comes into range.
    let phone_id = network
        .add_node("Pixel 9", true, Some(DEFAULT_CAPABILITY))
        .await;
    assert!(coordinator.check_connection().await);

    assert_eq!(coordinator.flush().await, FlushOutcome::Delivered(2));
    assert_eq!(coordinator.buffered().await, 0);

    // The wire payload is one JSON batch in insertion order.
    let inbox = network.inbox(&phone_id).await;
    assert_eq!(inbox.len(), 1);
    let batch: ReadingBatch = serde_json::from_slice(&inbox[0].1).unwrap();
    let timestamps: Vec<i64> = batch.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1, 2]);
}

#[tokio::test]
async fn watch_payloads_decode_on_the_phone_side() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);
    let phone_id = network
        .add_node("Pixel 9", true, Some(DEFAULT_CAPABILITY))
        .await;

    assert!(coordinator.send_now(&reading(75, 10)).await);
    coordinator.on_reading(reading(70, 11)).await;
    coordinator.on_reading(reading(71, 12)).await;
    assert_eq!(coordinator.flush().await, FlushOutcome::Delivered(2));

    let receiver = PhoneReceiver::default();
    let mut events = receiver.events();
    for (path, payload) in network.inbox(&phone_id).await {
        receiver.on_message(&path, &payload);
    }

    match events.try_recv().unwrap() {
        PhoneEvent::Single(r) => assert_eq!(r.bpm, 75),
        other => panic!("expected single reading, got {:?}", other),
    }
    match events.try_recv().unwrap() {
        PhoneEvent::Batch(batch) => assert_eq!(batch.len(), 2),
        other => panic!("expected batch, got {:?}", other),
    }
}

#[tokio::test]
async fn single_send_falls_back_across_unreliable_nodes() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);

    // Two capable phones; the nearby one is failing at the transport
    // layer, so delivery must fall back to the second candidate.
    let flaky = network
        .add_node("Flaky phone", true, Some(DEFAULT_CAPABILITY))
        .await;
    let backup = network
        .add_node("Backup phone", false, Some(DEFAULT_CAPABILITY))
        .await;
    network.set_send_failure(&flaky, true).await;

    assert!(coordinator.send_now(&reading(80, 5)).await);
    assert!(network.inbox(&flaky).await.is_empty());
    assert_eq!(network.inbox(&backup).await.len(), 1);
    // Exactly one attempt per candidate, no duplicates.
    assert_eq!(network.send_attempt_count(), 2);
}

#[tokio::test]
async fn fallback_discovery_is_used_only_when_needed() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);
    network
        .add_node("Capable phone", true, Some(DEFAULT_CAPABILITY))
        .await;

    assert_eq!(coordinator.count_peers().await, 1);
    assert_eq!(network.connected_query_count(), 0);

    // Strip the capability advertisement: discovery now has to fall
    // back to the plain connected-nodes query.
    let network2 = SimWearNetwork::new();
    let coordinator2 = make_coordinator(&network2);
    network2.add_node("Plain phone", true, None).await;

    assert_eq!(coordinator2.count_peers().await, 1);
    assert_eq!(network2.connected_query_count(), 1);
}

#[tokio::test]
async fn probes_leave_the_buffer_untouched() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);
    coordinator.on_reading(reading(70, 1)).await;

    let before = coordinator.buffered().await;
    for _ in 0..3 {
        let _ = coordinator.check_connection().await;
        let _ = coordinator.count_peers().await;
    }
    assert_eq!(coordinator.buffered().await, before);
    assert_eq!(network.send_attempt_count(), 0);
}

#[tokio::test]
async fn concurrent_flushes_deliver_each_reading_exactly_once() {
    let network = SimWearNetwork::new();
    let coordinator = Arc::new(make_coordinator(&network));
    let phone_id = network
        .add_node("Pixel 9", true, Some(DEFAULT_CAPABILITY))
        .await;

    for i in 0..5i64 {
        coordinator.on_reading(reading(70 + i as u32, i)).await;
    }

    // Overlapping flushes must not drain the same batch twice: only
    // one may consume a given buffered reading.
    let mut handles = Vec::new();
    for _ in 0..4 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move { coordinator.flush().await }));
    }
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let delivered: usize = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            FlushOutcome::Delivered(n) => Some(*n),
            _ => None,
        })
        .sum();
    assert_eq!(delivered, 5);
    assert!(!outcomes.contains(&FlushOutcome::Failed));
    assert_eq!(coordinator.buffered().await, 0);

    // Every reading went over the wire exactly once, across however
    // many batches the flushes produced.
    let mut timestamps = Vec::new();
    for (_, payload) in network.inbox(&phone_id).await {
        let batch: ReadingBatch = serde_json::from_slice(&payload).unwrap();
        timestamps.extend(batch.iter().map(|r| r.timestamp));
    }
    timestamps.sort_unstable();
    assert_eq!(timestamps, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn peer_vanishing_between_probe_and_flush_fails_cleanly() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);
    let phone_id = network
        .add_node("Pixel 9", true, Some(DEFAULT_CAPABILITY))
        .await;
    coordinator.on_reading(reading(70, 1)).await;

    assert!(coordinator.check_connection().await);

    // Phone goes out of range before the flush resolves peers.
    network.remove_node(&phone_id).await;

    assert_eq!(coordinator.flush().await, FlushOutcome::Failed);
    assert_eq!(coordinator.buffered().await, 1);
    assert!(!coordinator.check_connection().await);
}

#[tokio::test]
async fn readings_appended_mid_outage_join_the_next_batch() {
    let network = SimWearNetwork::new();
    let coordinator = make_coordinator(&network);

    coordinator.on_reading(reading(70, 1)).await;
    assert_eq!(coordinator.flush().await, FlushOutcome::Failed);

    coordinator.on_reading(reading(71, 2)).await;
    let phone_id = network
        .add_node("Pixel 9", true, Some(DEFAULT_CAPABILITY))
        .await;

    assert_eq!(coordinator.flush().await, FlushOutcome::Delivered(2));

    let inbox = network.inbox(&phone_id).await;
    let batch: ReadingBatch = serde_json::from_slice(&inbox[0].1).unwrap();
    assert_eq!(batch.len(), 2);
}
