//! Wire message shapes.
//!
//! These are the immutable values handed to the transport. They are built
//! fresh by the [`mapping`](crate::mapping) functions on every call and never
//! mutated afterwards.

pub mod advertisement;
pub mod device;
pub mod gatt;

pub use advertisement::{AdvertisementData, ScanResult};
pub use device::{DeviceIdentity, DeviceState, DeviceStateResponse, DeviceType};
pub use gatt::{CharacteristicNode, CharacteristicProperties, DescriptorNode, ServiceNode};
