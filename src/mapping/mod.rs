//! Translation from platform snapshots to wire messages.
//!
//! Every function here is a synchronous, side-effect free mapping and is safe
//! to call from any thread.

pub mod advertisement;
pub mod device;
pub mod gatt;
pub mod properties;
pub mod scan;

pub use advertisement::{parse_manufacturer_payload, parse_scan_result};
pub use device::{map_device, map_device_state};
pub use gatt::{map_characteristic, map_descriptor, map_service, map_services};
pub use scan::{map_scan_result, try_map_scan_result};
