//! Platform input snapshots.
//!
//! Plain structs mirroring what a host Bluetooth stack reports about devices,
//! scan records and GATT trees, including the places where the host is
//! allowed to hand back nothing. The [`native`] module builds them from a live
//! `btleplug` peripheral; other hosts fill them in directly.

pub mod device;
pub mod gatt;
pub mod native;
pub mod scan;

pub use device::PlatformDevice;
pub use gatt::{GattCharacteristic, GattDescriptor, GattGraph, GattService, ServiceKind, ServiceRef};
pub use scan::{AdvertisementSource, PlatformScanResult, ScanRecord};
