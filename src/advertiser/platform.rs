//! The host's outbound advertising surface.

use super::settings::AdvertiseSettings;
use super::AdvertisingCallback;
use crate::mapping::advertisement::ManufacturerPayload;

/// Data handed to the host when advertising starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisePayload {
    /// The only AD structure carried.
    pub manufacturer: ManufacturerPayload,
    /// Whether the host should append the device name.
    pub include_device_name: bool,
    /// Whether the host should append the tx power level.
    pub include_tx_power_level: bool,
}

impl AdvertisePayload {
    /// A payload carrying manufacturer data and nothing else.
    pub fn manufacturer_only(manufacturer: ManufacturerPayload) -> Self {
        Self {
            manufacturer,
            include_device_name: false,
            include_tx_power_level: false,
        }
    }
}

/// Host advertiser.
///
/// Neither call blocks on the radio. The outcome of a start request is
/// reported later, possibly from another thread, through the
/// [`AdvertisingCallback`] passed with it. Stop has no outcome.
#[cfg_attr(test, mockall::automock)]
pub trait PlatformAdvertiser: Send + Sync {
    /// Ask the host to start advertising `payload`.
    fn start_advertising(
        &self,
        settings: &AdvertiseSettings,
        payload: &AdvertisePayload,
        callback: AdvertisingCallback,
    );

    /// Ask the host to stop advertising.
    fn stop_advertising(&self);
}
