//! GATT topology messages.

use bytes::Bytes;

/// Capability flags of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacteristicProperties {
    pub broadcast: bool,
    pub read: bool,
    pub write_without_response: bool,
    pub write: bool,
    pub notify: bool,
    pub indicate: bool,
    pub authenticated_signed_writes: bool,
    pub extended_properties: bool,
    pub notify_encryption_required: bool,
    pub indicate_encryption_required: bool,
}

/// A descriptor of a characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorNode {
    /// Address of the device the descriptor lives on.
    pub remote_id: String,
    /// Descriptor UUID.
    pub uuid: String,
    /// UUID of the characteristic that owns the descriptor.
    pub characteristic_uuid: String,
    /// UUID of the service that owns the characteristic.
    pub service_uuid: String,
    /// Last known value.
    pub value: Option<Bytes>,
}

/// A characteristic and its descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacteristicNode {
    /// Address of the device the characteristic lives on.
    pub remote_id: String,
    /// Characteristic UUID.
    pub uuid: String,
    /// Capability flags.
    pub properties: CharacteristicProperties,
    /// Last read or notified value; `None` if never read.
    pub value: Option<Bytes>,
    /// Descriptors in platform order.
    pub descriptors: Vec<DescriptorNode>,
    /// UUID of the owning primary service.
    ///
    /// `None` when the characteristic belongs to an included service that
    /// could not be traced back to a primary service.
    pub service_uuid: Option<String>,
    /// UUID of the included service that owns the characteristic, if any.
    pub secondary_service_uuid: Option<String>,
}

impl CharacteristicNode {
    /// Check if this characteristic lives in an included service.
    pub fn is_in_secondary_service(&self) -> bool {
        self.secondary_service_uuid.is_some()
    }
}

/// A service with its characteristics and included services.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceNode {
    /// Address of the device the service lives on.
    pub remote_id: String,
    /// Service UUID.
    pub uuid: String,
    /// Whether this is a primary service.
    pub is_primary: bool,
    /// Characteristics in platform order.
    pub characteristics: Vec<CharacteristicNode>,
    /// Included services in platform order.
    pub included_services: Vec<ServiceNode>,
}

impl ServiceNode {
    /// Find a characteristic by canonical UUID, searching included services too.
    pub fn find_characteristic(&self, uuid: &str) -> Option<&CharacteristicNode> {
        self.characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .or_else(|| {
                self.included_services
                    .iter()
                    .find_map(|s| s.find_characteristic(uuid))
            })
    }
}
