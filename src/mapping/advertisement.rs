//! Advertisement payload parsing.
//!
//! Two inputs produce the same [`AdvertisementData`]:
//!
//! - a raw manufacturer buffer (two-byte big-endian company id followed by
//!   the payload), see [`ManufacturerPayload`];
//! - a structured scan result from the host, see [`parse_scan_result`].
//!
//! Structured parsing runs each field extraction on its own. Every table entry
//! comes out as a `Result`, and a final consolidation step keeps only the
//! entries that are present and well formed. A bad entry never aborts the
//! rest of the parse.

use bytes::Bytes;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

use crate::error::{Error, Result};
use crate::platform::scan::{PlatformScanResult, ScanRecord, TX_POWER_NOT_PRESENT};
use crate::uuids::canonical_uuid;
use crate::wire::AdvertisementData;

/// Advertising flags bit set when the advertiser accepts connections.
const FLAG_CONNECTABLE: u8 = 0x02;

/// A manufacturer id and its payload, split out of a raw buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManufacturerPayload {
    /// Company identifier.
    pub company_id: u16,
    /// Bytes following the company identifier.
    pub data: Bytes,
}

impl ManufacturerPayload {
    /// Minimum size of a raw buffer.
    pub const MIN_SIZE: usize = 2;

    /// Split a raw buffer into company id and payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] if the buffer is shorter than
    /// [`Self::MIN_SIZE`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        let [hi, lo, payload @ ..] = data else {
            return Err(Error::MalformedPayload { len: data.len() });
        };

        Ok(Self {
            company_id: u16::from_be_bytes([*hi, *lo]),
            data: Bytes::copy_from_slice(payload),
        })
    }
}

impl From<ManufacturerPayload> for AdvertisementData {
    fn from(payload: ManufacturerPayload) -> Self {
        Self {
            manufacturer_data: BTreeMap::from([(payload.company_id, payload.data)]),
            ..Default::default()
        }
    }
}

/// Parse a raw manufacturer buffer into advertisement data.
///
/// Only `manufacturer_data` is populated and `connectable` is false.
pub fn parse_manufacturer_payload(data: &[u8]) -> Result<AdvertisementData> {
    ManufacturerPayload::parse(data).map(AdvertisementData::from)
}

/// Why a single advertisement entry was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
enum PartialDecodeSkip {
    #[error("manufacturer {0:#06x} has no payload")]
    MissingManufacturerPayload(i32),

    #[error("manufacturer id {0} is not a 16-bit value")]
    ManufacturerIdOutOfRange(i32),

    #[error("entry has no UUID")]
    MissingUuid,

    #[error("service data for {0} has no payload")]
    MissingServiceDataPayload(String),

    #[error("unparseable UUID {0:?}")]
    InvalidUuid(String),
}

type Entry<T> = std::result::Result<T, PartialDecodeSkip>;

/// Fields pulled out of a scan result before consolidation.
#[derive(Debug, Default)]
struct Extracted {
    connectable: bool,
    local_name: Option<String>,
    tx_power_level: Option<i32>,
    manufacturer_data: Vec<Entry<(u16, Bytes)>>,
    service_data: Vec<Entry<(String, Bytes)>>,
    service_uuids: Vec<Entry<String>>,
}

impl Extracted {
    fn from_scan_result(result: &PlatformScanResult) -> Self {
        let record = result.scan_record.as_ref();
        Self {
            connectable: extract_connectable(result.connectable, record),
            local_name: record.and_then(extract_local_name),
            tx_power_level: record.and_then(extract_tx_power_level),
            manufacturer_data: record.map(extract_manufacturer_data).unwrap_or_default(),
            service_data: record.map(extract_service_data).unwrap_or_default(),
            service_uuids: record.map(extract_service_uuids).unwrap_or_default(),
        }
    }

    /// Rebuild the output from present, well-formed fields only.
    fn consolidate(self) -> AdvertisementData {
        AdvertisementData {
            local_name: self.local_name,
            tx_power_level: self.tx_power_level,
            connectable: self.connectable,
            manufacturer_data: keep_present("manufacturer data", self.manufacturer_data).collect(),
            service_data: keep_present("service data", self.service_data).collect(),
            service_uuids: keep_present("service UUID", self.service_uuids)
                .filter(|uuid| !uuid.is_empty())
                .collect(),
        }
    }
}

fn keep_present<T>(field: &'static str, entries: Vec<Entry<T>>) -> impl Iterator<Item = T> {
    entries.into_iter().filter_map(move |entry| match entry {
        Ok(value) => Some(value),
        Err(skip) => {
            trace!("Dropping {} entry: {}", field, skip);
            None
        }
    })
}

fn extract_connectable(direct: Option<bool>, record: Option<&ScanRecord>) -> bool {
    match direct {
        Some(connectable) => connectable,
        None => record
            .and_then(|r| r.advertise_flags)
            .map(|flags| flags & FLAG_CONNECTABLE != 0)
            .unwrap_or(false),
    }
}

fn extract_local_name(record: &ScanRecord) -> Option<String> {
    record
        .device_name
        .as_ref()
        .filter(|name| !name.trim().is_empty())
        .cloned()
}

fn extract_tx_power_level(record: &ScanRecord) -> Option<i32> {
    Some(record.tx_power_level).filter(|&level| level != TX_POWER_NOT_PRESENT)
}

fn extract_manufacturer_data(record: &ScanRecord) -> Vec<Entry<(u16, Bytes)>> {
    let Some(table) = &record.manufacturer_specific_data else {
        return Vec::new();
    };

    table
        .iter()
        .map(|(id, payload)| {
            let company_id =
                u16::try_from(*id).map_err(|_| PartialDecodeSkip::ManufacturerIdOutOfRange(*id))?;
            let payload = payload
                .as_deref()
                .ok_or(PartialDecodeSkip::MissingManufacturerPayload(*id))?;
            Ok((company_id, Bytes::copy_from_slice(payload)))
        })
        .collect()
}

fn extract_service_data(record: &ScanRecord) -> Vec<Entry<(String, Bytes)>> {
    let Some(table) = &record.service_data else {
        return Vec::new();
    };

    table
        .iter()
        .map(|(uuid, payload)| {
            let uuid = canonicalize(uuid.as_deref())?;
            let payload = payload
                .as_deref()
                .ok_or_else(|| PartialDecodeSkip::MissingServiceDataPayload(uuid.clone()))?;
            Ok((uuid, Bytes::copy_from_slice(payload)))
        })
        .collect()
}

fn extract_service_uuids(record: &ScanRecord) -> Vec<Entry<String>> {
    let Some(list) = &record.service_uuids else {
        return Vec::new();
    };

    list.iter().map(|uuid| canonicalize(uuid.as_deref())).collect()
}

fn canonicalize(raw: Option<&str>) -> Entry<String> {
    let raw = raw.ok_or(PartialDecodeSkip::MissingUuid)?;
    canonical_uuid(raw).ok_or_else(|| PartialDecodeSkip::InvalidUuid(raw.to_string()))
}

/// Parse a structured scan result into advertisement data.
///
/// Never fails; entries with missing keys, missing payloads or unparseable
/// UUIDs are dropped individually.
pub fn parse_scan_result(result: &PlatformScanResult) -> AdvertisementData {
    Extracted::from_scan_result(result).consolidate()
}
