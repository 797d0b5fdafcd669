// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # ble-wire
//!
//! Translates what a host Bluetooth Low Energy stack reports into immutable
//! wire messages, and drives outbound advertising.
//!
//! Hosts hand back nothing in surprising places: a device without a name, a
//! scan record without flags, a service-data map with a null key. The
//! [`mapping`] functions turn those snapshots into clean, fully populated
//! [`wire`] values, skipping individual bad entries instead of failing the
//! whole message.
//!
//! ## Features
//!
//! - **Advertisement parsing**: raw manufacturer payloads and structured scan
//!   records, with UUIDs canonicalized
//! - **GATT mapping**: services, characteristics and descriptors, including
//!   characteristics owned by included services
//! - **Advertising**: an [`AdvertisingSession`] that tracks whether the host is
//!   actually advertising
//! - **Scanning**: a btleplug-backed [`BleScanner`] emitting wire scan results
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ble_wire::{BleScanner, ChannelTransport, Result, ScannerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scanner = BleScanner::new(ScannerConfig::default()).await?;
//!     let (transport, mut messages) = ChannelTransport::new(ChannelTransport::DEFAULT_CAPACITY);
//!     let _forwarder = scanner.forward_to(transport);
//!
//!     scanner.start_scanning().await?;
//!     while let Some(message) = messages.recv().await {
//!         println!("{:?}", message);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for wire types

// Public modules
pub mod advertiser;
pub mod error;
pub mod mapping;
pub mod platform;
pub mod scanner;
pub mod transport;
pub mod uuids;
pub mod wire;

// Re-exports for convenience
pub use advertiser::{
    AdvertiseEvent, AdvertiseFailure, AdvertiseMode, AdvertisePayload, AdvertiseSettings,
    AdvertiseTxPower, AdvertisingCallback, AdvertisingSession, AdvertisingState,
    AdvertisingStatus, PlatformAdvertiser, SessionEvent,
};
pub use error::{Error, Result};
pub use mapping::{
    map_characteristic, map_descriptor, map_device, map_device_state, map_scan_result,
    map_service, map_services, parse_manufacturer_payload, parse_scan_result,
    try_map_scan_result,
};
pub use scanner::{BleScanner, ScanEvent, ScannerConfig};
pub use transport::{ChannelTransport, WireMessage, WireTransport};
pub use wire::{
    AdvertisementData, CharacteristicNode, CharacteristicProperties, DescriptorNode,
    DeviceIdentity, DeviceState, DeviceStateResponse, DeviceType, ScanResult, ServiceNode,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that key types are exported
        let _ = std::any::TypeId::of::<AdvertisingSession>();
        let _ = std::any::TypeId::of::<BleScanner>();
        let _ = std::any::TypeId::of::<Error>();
        let _ = std::any::TypeId::of::<ScanResult>();
        let _ = std::any::TypeId::of::<ServiceNode>();
        let _ = std::any::TypeId::of::<WireMessage>();
    }

    #[test]
    fn test_manufacturer_payload_through_exports() {
        let data = parse_manufacturer_payload(&[0x4c, 0x00, 0x02, 0x15]).unwrap();
        assert_eq!(data.manufacturer(0x4c00).map(|b| &b[..]), Some(&[0x02, 0x15][..]));
    }
}
