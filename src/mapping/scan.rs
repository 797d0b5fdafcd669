//! Scan result assembly.

use tracing::warn;

use super::advertisement::{parse_manufacturer_payload, parse_scan_result};
use super::device::map_device;
use crate::error::{Error, Result};
use crate::platform::device::PlatformDevice;
use crate::platform::scan::AdvertisementSource;
use crate::wire::{AdvertisementData, ScanResult};

/// Build a scan result, degrading instead of failing.
///
/// If the advertisement cannot be assembled the result still carries the
/// device identity and RSSI, with an empty [`AdvertisementData`].
pub fn map_scan_result(
    device: &PlatformDevice,
    source: &AdvertisementSource,
    rssi: i32,
) -> ScanResult {
    match try_map_scan_result(device, source, rssi) {
        Ok(result) => result,
        Err(e) => {
            warn!("Delivering scan result for {} without advertisement: {}", device.address, e);
            ScanResult {
                device: map_device(device),
                advertisement_data: AdvertisementData::default(),
                rssi,
            }
        }
    }
}

/// Build a scan result, failing if the advertisement cannot be assembled.
///
/// # Errors
///
/// Returns [`Error::MappingFailure`] when a raw buffer is present but too
/// short to carry a manufacturer id.
pub fn try_map_scan_result(
    device: &PlatformDevice,
    source: &AdvertisementSource,
    rssi: i32,
) -> Result<ScanResult> {
    let advertisement_data = advertisement_from_source(source).map_err(|e| Error::MappingFailure {
        context: format!("advertisement for {}: {}", device.address, e),
    })?;

    Ok(ScanResult {
        device: map_device(device),
        advertisement_data,
        rssi,
    })
}

fn advertisement_from_source(source: &AdvertisementSource) -> Result<AdvertisementData> {
    match source {
        // Hosts hand over an empty buffer when nothing was advertised.
        AdvertisementSource::Raw(data) if data.is_empty() => Ok(AdvertisementData::default()),
        AdvertisementSource::Raw(data) => parse_manufacturer_payload(data),
        AdvertisementSource::Structured(result) => Ok(parse_scan_result(result)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::device::{DEVICE_TYPE_DUAL, DEVICE_TYPE_LE};
    use crate::platform::scan::{PlatformScanResult, ScanRecord};
    use crate::wire::{DeviceIdentity, DeviceType};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn device(name: Option<&str>) -> PlatformDevice {
        PlatformDevice::new("12:34:56:78:9A:BC", name.map(str::to_string), DEVICE_TYPE_LE)
    }

    #[test]
    fn test_raw_source() {
        let source = AdvertisementSource::Raw(Bytes::from_static(&[0x01, 0x02, 0x41, 0x42]));
        let result = map_scan_result(&device(Some("Tag")), &source, -42);

        assert_eq!(
            result.device,
            DeviceIdentity {
                remote_id: "12:34:56:78:9A:BC".to_string(),
                name: Some("Tag".to_string()),
                device_type: DeviceType::Le,
            }
        );
        assert_eq!(result.rssi, -42);
        assert_eq!(
            result.advertisement_data.manufacturer(0x0102).map(|b| b.to_vec()),
            Some(vec![0x41, 0x42])
        );
    }

    #[test]
    fn test_null_name_stays_absent() {
        let source = AdvertisementSource::Raw(Bytes::new());
        let result = map_scan_result(&device(None), &source, -80);
        assert_eq!(result.device.name, None);
        assert!(result.advertisement_data.is_empty());
    }

    #[test]
    fn test_malformed_raw_source_degrades() {
        let source = AdvertisementSource::Raw(Bytes::from_static(&[0x01]));
        let dev = PlatformDevice::new("AA", Some("X".to_string()), DEVICE_TYPE_DUAL);

        let result = map_scan_result(&dev, &source, -65);
        assert_eq!(result.rssi, -65);
        assert_eq!(result.device.device_type, DeviceType::Dual);
        assert_eq!(result.advertisement_data, AdvertisementData::default());

        let err = try_map_scan_result(&dev, &source, -65).unwrap_err();
        assert!(matches!(err, Error::MappingFailure { .. }));
    }

    #[test]
    fn test_structured_source() {
        let record = ScanRecord {
            device_name: Some("Scale".to_string()),
            service_uuids: Some(vec![Some("181d".to_string()), None]),
            ..Default::default()
        };
        let source = AdvertisementSource::Structured(PlatformScanResult {
            scan_record: Some(record),
            connectable: Some(true),
            rssi: -30,
        });

        let result = try_map_scan_result(&device(None), &source, -30).unwrap();
        assert_eq!(result.advertisement_data.local_name.as_deref(), Some("Scale"));
        assert!(result.advertisement_data.connectable);
        assert_eq!(
            result.advertisement_data.service_uuids,
            vec!["0000181d-0000-1000-8000-00805f9b34fb"]
        );
    }
}
