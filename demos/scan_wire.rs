//! Scan for nearby devices and print each wire scan result.
//!
//! Run with: cargo run --example scan_wire

use ble_wire::{BleScanner, ChannelTransport, Result, ScannerConfig, WireMessage};
use std::time::Duration;

const SCAN_DURATION: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ble_wire=debug".parse().unwrap()),
        )
        .init();

    println!("Scanning for {} seconds...\n", SCAN_DURATION.as_secs());

    let scanner = BleScanner::new(ScannerConfig::default()).await?;
    let (transport, mut messages) = ChannelTransport::new(ChannelTransport::DEFAULT_CAPACITY);
    let forwarder = scanner.forward_to(transport);

    scanner.start_scanning().await?;

    let deadline = tokio::time::sleep(SCAN_DURATION);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            Some(message) = messages.recv() => {
                if let WireMessage::ScanResult(result) = message {
                    let advertisement = &result.advertisement_data;
                    println!(
                        "{} {:<20} {:>4} dBm  connectable={} services={:?}",
                        result.device.remote_id,
                        result.device.name.as_deref().unwrap_or("(unnamed)"),
                        result.rssi,
                        advertisement.connectable,
                        advertisement.service_uuids,
                    );
                    for (company_id, data) in &advertisement.manufacturer_data {
                        println!("    manufacturer {:#06x}: {:02x?}", company_id, &data[..]);
                    }
                }
            }
            _ = &mut deadline => break,
        }
    }

    scanner.stop_scanning().await?;
    forwarder.abort();

    println!("\nSaw {} devices", scanner.discovered().len());

    Ok(())
}
