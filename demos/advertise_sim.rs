//! Drive an advertising session against a simulated host advertiser.
//!
//! The simulated host answers start requests from a background thread after a
//! short delay and refuses payloads whose first byte is `0xff`.
//!
//! Run with: cargo run --example advertise_sim

use ble_wire::{
    AdvertiseFailure, AdvertisePayload, AdvertiseSettings, AdvertisingCallback, AdvertisingSession,
    AdvertisingState, Error, PlatformAdvertiser, Result, SessionEvent,
};
use std::time::Duration;
use tokio::sync::broadcast;

const HOST_LATENCY: Duration = Duration::from_millis(50);

struct SimulatedAdvertiser;

impl PlatformAdvertiser for SimulatedAdvertiser {
    fn start_advertising(
        &self,
        _settings: &AdvertiseSettings,
        payload: &AdvertisePayload,
        callback: AdvertisingCallback,
    ) {
        let refuse = payload.manufacturer.data.first() == Some(&0xff);
        std::thread::spawn(move || {
            std::thread::sleep(HOST_LATENCY);
            if refuse {
                callback.on_start_failure(AdvertiseFailure::InternalError.code());
            } else {
                callback.on_start_success();
            }
        });
    }

    fn stop_advertising(&self) {
        println!("  host: advertising stopped");
    }
}

/// Wait for the start outcome of the current request.
async fn wait_started(events: &mut broadcast::Receiver<SessionEvent>) -> Result<()> {
    loop {
        match events.recv().await {
            Ok(SessionEvent::StartFailed(failure)) => return Err(failure.into()),
            Ok(SessionEvent::StateChanged {
                to: AdvertisingState::Advertising,
                ..
            }) => return Ok(()),
            Ok(_) => {}
            Err(e) => return Err(Error::Internal(e.to_string())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ble_wire=debug".parse().unwrap()),
        )
        .init();

    let session = AdvertisingSession::new(
        Some(Box::new(SimulatedAdvertiser)),
        AdvertiseSettings::default(),
    );
    let mut events = session.subscribe();

    println!("Starting without a payload...");
    match session.start() {
        Err(e) => println!("  rejected: {}", e),
        Ok(()) => println!("  unexpectedly accepted"),
    }

    println!("Advertising manufacturer 0x0102...");
    session.set_payload(&[0x01, 0x02, 0xca, 0xfe])?;
    println!("  status right after the request: {:?}", session.status());
    wait_started(&mut events).await?;
    println!("  advertising: {}", session.is_advertising());

    println!("Replacing the payload with one the host refuses...");
    session.set_payload(&[0x01, 0x02, 0xff])?;
    match wait_started(&mut events).await {
        Err(Error::StartFailure { failure }) => println!("  host refused: {}", failure),
        other => println!("  unexpected outcome: {:?}", other),
    }
    println!("  state: {}", session.state());

    println!("Restarting with the refused payload replaced...");
    session.set_payload(&[0x01, 0x02, 0x00])?;
    wait_started(&mut events).await?;

    session.stop()?;
    println!("  advertising after stop: {}", session.is_advertising());

    session.shutdown()
}
