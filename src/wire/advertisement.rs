//! Advertisement and scan result messages.

use bytes::Bytes;
use std::collections::BTreeMap;

use super::device::DeviceIdentity;

/// Decoded advertisement data.
///
/// Maps never carry absent keys or values and `service_uuids` never holds an
/// empty string; the parser drops such entries before they get here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvertisementData {
    /// Advertised local name.
    pub local_name: Option<String>,
    /// Advertised transmit power in dBm.
    pub tx_power_level: Option<i32>,
    /// Whether the advertiser accepts connections.
    pub connectable: bool,
    /// Manufacturer-specific data keyed by company id.
    pub manufacturer_data: BTreeMap<u16, Bytes>,
    /// Service data keyed by canonical service UUID.
    pub service_data: BTreeMap<String, Bytes>,
    /// Advertised service UUIDs in discovery order.
    pub service_uuids: Vec<String>,
}

impl AdvertisementData {
    /// Check if nothing at all was decoded.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Get the payload advertised under a manufacturer id.
    pub fn manufacturer(&self, company_id: u16) -> Option<&Bytes> {
        self.manufacturer_data.get(&company_id)
    }
}

/// One scan observation of a remote device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanResult {
    /// Device that was observed.
    pub device: DeviceIdentity,
    /// Decoded advertisement.
    pub advertisement_data: AdvertisementData,
    /// Signal strength in dBm.
    pub rssi: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_advertisement() {
        let data = AdvertisementData::default();
        assert!(data.is_empty());
        assert!(!data.connectable);

        let mut data = AdvertisementData::default();
        data.manufacturer_data
            .insert(0x0102, Bytes::from_static(&[0x41]));
        assert!(!data.is_empty());
        assert_eq!(data.manufacturer(0x0102).map(|b| b.as_ref()), Some(&[0x41][..]));
        assert!(data.manufacturer(0x0103).is_none());
    }
}
