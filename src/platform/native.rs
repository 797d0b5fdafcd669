//! Snapshots built from a live `btleplug` peripheral.
//!
//! btleplug only speaks Low Energy, exposes neither the advertising flags byte
//! nor a connectable bit, and does not report included services, so those
//! parts of the snapshot stay empty.

use btleplug::api::{Peripheral as _, PeripheralProperties, Service};
use btleplug::platform::Peripheral;
use tracing::trace;

use super::device::{PlatformDevice, DEVICE_TYPE_LE};
use super::gatt::{GattCharacteristic, GattDescriptor, GattGraph, GattService, ServiceKind, ServiceRef};
use super::scan::{PlatformScanResult, ScanRecord, TX_POWER_NOT_PRESENT};
use crate::error::Result;

/// RSSI reported when btleplug has no reading yet.
pub const RSSI_UNKNOWN: i32 = -127;

/// Build the device snapshot for a peripheral.
pub fn device_from_properties(remote_id: &str, properties: &PeripheralProperties) -> PlatformDevice {
    PlatformDevice::new(remote_id, properties.local_name.clone(), DEVICE_TYPE_LE)
}

/// Build a structured scan result from cached advertisement properties.
pub fn scan_result_from_properties(properties: &PeripheralProperties) -> PlatformScanResult {
    let record = ScanRecord {
        advertise_flags: None,
        device_name: properties.local_name.clone(),
        tx_power_level: properties
            .tx_power_level
            .map(i32::from)
            .unwrap_or(TX_POWER_NOT_PRESENT),
        manufacturer_specific_data: Some(
            properties
                .manufacturer_data
                .iter()
                .map(|(id, data)| (i32::from(*id), Some(data.clone())))
                .collect(),
        ),
        service_data: Some(
            properties
                .service_data
                .iter()
                .map(|(uuid, data)| (Some(uuid.to_string()), Some(data.clone())))
                .collect(),
        ),
        service_uuids: Some(
            properties
                .services
                .iter()
                .map(|uuid| Some(uuid.to_string()))
                .collect(),
        ),
    };

    PlatformScanResult {
        scan_record: Some(record),
        connectable: None,
        rssi: properties.rssi.map(i32::from).unwrap_or(RSSI_UNKNOWN),
    }
}

/// Snapshot one discovered service.
pub fn service_from_btleplug(service: &Service) -> GattService {
    let kind = if service.primary {
        ServiceKind::Primary
    } else {
        ServiceKind::Secondary
    };
    let owner = ServiceRef {
        uuid: service.uuid,
        kind,
    };

    let characteristics = service
        .characteristics
        .iter()
        .map(|c| GattCharacteristic {
            uuid: c.uuid,
            service: owner,
            properties: u32::from(c.properties.bits()),
            value: None,
            descriptors: c
                .descriptors
                .iter()
                .map(|d| GattDescriptor {
                    uuid: d.uuid,
                    characteristic_uuid: d.characteristic_uuid,
                    service_uuid: d.service_uuid,
                    value: None,
                })
                .collect(),
        })
        .collect();

    GattService {
        uuid: service.uuid,
        kind,
        characteristics,
        included_services: Vec::new(),
    }
}

/// Snapshot the services of a connected peripheral.
///
/// Services must already have been discovered on the peripheral.
pub fn gatt_graph(peripheral: &Peripheral) -> GattGraph {
    let services = peripheral.services();
    trace!("Snapshotting {} services", services.len());
    GattGraph::new(services.iter().map(service_from_btleplug).collect())
}

/// Snapshot a peripheral's identity and latest advertisement.
///
/// Returns `Ok(None)` when btleplug has no properties cached for it yet.
pub async fn snapshot_peripheral(
    peripheral: &Peripheral,
) -> Result<Option<(PlatformDevice, PlatformScanResult)>> {
    let Some(properties) = peripheral.properties().await? else {
        return Ok(None);
    };

    let remote_id = peripheral.id().to_string();
    Ok(Some((
        device_from_properties(&remote_id, &properties),
        scan_result_from_properties(&properties),
    )))
}
