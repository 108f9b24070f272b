// src/bin/sim_sync_demo.rs
//! Walks the watch-to-phone sync flow over the simulated transport:
//! readings buffer while no phone is reachable, a flush fails and
//! retains them, then the phone appears and the batch goes through and
//! is decoded on the phone side.

use anyhow::Result;

use pulselink::sync::{PhoneEvent, PhoneReceiver, SyncConfig, SyncCoordinator, DEFAULT_CAPABILITY};
use pulselink::transport::simulated::SimWearNetwork;
use pulselink::types::{Reading, ReadingStatus};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let network = SimWearNetwork::new();
    let coordinator = SyncCoordinator::new(
        network.clone(),
        network.clone(),
        SyncConfig::default(),
    );

    // Sensor produces readings while the phone is out of range.
    for bpm in [68, 71, 69] {
        coordinator
            .on_reading(Reading::new(bpm, vec![60_000 / bpm], ReadingStatus::Reliable))
            .await;
    }
    println!("Buffered readings: {}", coordinator.buffered().await);

    println!("Phone connected: {}", coordinator.check_connection().await);
    println!("Flush without a phone: {:?}", coordinator.flush().await);
    println!("Still buffered: {}", coordinator.buffered().await);

    // The phone comes into range advertising the companion capability.
    let phone_id = network
        .add_node("Galaxy S24", true, Some(DEFAULT_CAPABILITY))
        .await;
    println!("Phone connected: {}", coordinator.check_connection().await);

    println!("Flush with a phone: {:?}", coordinator.flush().await);
    println!(
        "Send-now outcome: {}",
        coordinator
            .send_now(&Reading::new(74, vec![811], ReadingStatus::Reliable))
            .await
    );

    // Phone side: replay the inbox through the receiver.
    let receiver = PhoneReceiver::default();
    let mut events = receiver.events();
    for (path, payload) in network.inbox(&phone_id).await {
        receiver.on_message(&path, &payload);
    }
    while let Ok(event) = events.try_recv() {
        match event {
            PhoneEvent::Single(reading) => println!("Phone received reading: {} bpm", reading.bpm),
            PhoneEvent::Batch(batch) => println!("Phone received batch of {}", batch.len()),
        }
    }

    Ok(())
}
