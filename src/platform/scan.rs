//! Scan record snapshots.

use bytes::Bytes;
use tracing::trace;
use uuid::Uuid;

use crate::uuids::{to_canonical, uuid_from_u16, uuid_from_u32};

/// Value the host reports for tx power when the record carries none.
pub const TX_POWER_NOT_PRESENT: i32 = i32::MIN;

// AD structure types (Core Specification Supplement, part A).
const AD_FLAGS: u8 = 0x01;
const AD_INCOMPLETE_16_BIT_UUIDS: u8 = 0x02;
const AD_COMPLETE_16_BIT_UUIDS: u8 = 0x03;
const AD_INCOMPLETE_32_BIT_UUIDS: u8 = 0x04;
const AD_COMPLETE_32_BIT_UUIDS: u8 = 0x05;
const AD_INCOMPLETE_128_BIT_UUIDS: u8 = 0x06;
const AD_COMPLETE_128_BIT_UUIDS: u8 = 0x07;
const AD_SHORTENED_LOCAL_NAME: u8 = 0x08;
const AD_COMPLETE_LOCAL_NAME: u8 = 0x09;
const AD_TX_POWER_LEVEL: u8 = 0x0a;
const AD_SERVICE_DATA_16_BIT: u8 = 0x16;
const AD_SERVICE_DATA_32_BIT: u8 = 0x20;
const AD_SERVICE_DATA_128_BIT: u8 = 0x21;
const AD_MANUFACTURER_SPECIFIC_DATA: u8 = 0xff;

/// A structured scan record.
///
/// Each table is `None` when the host did not produce it at all, and
/// individual entries may have missing keys or values. The advertisement
/// parser is responsible for dropping those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    /// Advertising flags byte, if the record had one.
    pub advertise_flags: Option<u8>,
    /// Advertised local name.
    pub device_name: Option<String>,
    /// Tx power in dBm, or [`TX_POWER_NOT_PRESENT`].
    pub tx_power_level: i32,
    /// Manufacturer id to payload table.
    pub manufacturer_specific_data: Option<Vec<(i32, Option<Vec<u8>>)>>,
    /// Service UUID string to payload table.
    pub service_data: Option<Vec<(Option<String>, Option<Vec<u8>>)>>,
    /// Advertised service UUID strings.
    pub service_uuids: Option<Vec<Option<String>>>,
}

impl Default for ScanRecord {
    fn default() -> Self {
        Self {
            advertise_flags: None,
            device_name: None,
            tx_power_level: TX_POWER_NOT_PRESENT,
            manufacturer_specific_data: None,
            service_data: None,
            service_uuids: None,
        }
    }
}

impl ScanRecord {
    /// Decode a raw legacy scan record made of length/type/value AD structures.
    ///
    /// Parsing stops at a zero length byte or at a structure that runs past the
    /// end of the buffer; everything decoded before that point is kept.
    /// Unknown AD types are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let mut record = Self::default();
        let mut offset = 0;

        while offset < data.len() {
            let len = data[offset] as usize;
            if len == 0 {
                break;
            }
            let end = offset + 1 + len;
            if end > data.len() {
                trace!(
                    "Truncated AD structure at offset {} ({} bytes claimed, {} left)",
                    offset,
                    len,
                    data.len() - offset - 1
                );
                break;
            }

            let ad_type = data[offset + 1];
            let value = &data[offset + 2..end];
            record.apply_structure(ad_type, value);

            offset = end;
        }

        record
    }

    fn apply_structure(&mut self, ad_type: u8, value: &[u8]) {
        match ad_type {
            AD_FLAGS => self.advertise_flags = value.first().copied(),
            AD_INCOMPLETE_16_BIT_UUIDS | AD_COMPLETE_16_BIT_UUIDS => {
                let uuids = value
                    .chunks_exact(2)
                    .map(|c| uuid_from_u16(u16::from_le_bytes([c[0], c[1]])));
                self.push_service_uuids(uuids);
            }
            AD_INCOMPLETE_32_BIT_UUIDS | AD_COMPLETE_32_BIT_UUIDS => {
                let uuids = value
                    .chunks_exact(4)
                    .map(|c| uuid_from_u32(u32::from_le_bytes([c[0], c[1], c[2], c[3]])));
                self.push_service_uuids(uuids);
            }
            AD_INCOMPLETE_128_BIT_UUIDS | AD_COMPLETE_128_BIT_UUIDS => {
                let uuids = value.chunks_exact(16).map(uuid_from_le_bytes);
                self.push_service_uuids(uuids);
            }
            AD_COMPLETE_LOCAL_NAME => {
                self.device_name = Some(String::from_utf8_lossy(value).into_owned());
            }
            AD_SHORTENED_LOCAL_NAME => {
                if self.device_name.is_none() {
                    self.device_name = Some(String::from_utf8_lossy(value).into_owned());
                }
            }
            AD_TX_POWER_LEVEL => {
                if let Some(&level) = value.first() {
                    self.tx_power_level = level as i8 as i32;
                }
            }
            AD_SERVICE_DATA_16_BIT if value.len() >= 2 => {
                let uuid = uuid_from_u16(u16::from_le_bytes([value[0], value[1]]));
                self.push_service_data(uuid, &value[2..]);
            }
            AD_SERVICE_DATA_32_BIT if value.len() >= 4 => {
                let uuid =
                    uuid_from_u32(u32::from_le_bytes([value[0], value[1], value[2], value[3]]));
                self.push_service_data(uuid, &value[4..]);
            }
            AD_SERVICE_DATA_128_BIT if value.len() >= 16 => {
                let uuid = uuid_from_le_bytes(&value[..16]);
                self.push_service_data(uuid, &value[16..]);
            }
            AD_MANUFACTURER_SPECIFIC_DATA if value.len() >= 2 => {
                let company_id = u16::from_le_bytes([value[0], value[1]]) as i32;
                self.manufacturer_specific_data
                    .get_or_insert_with(Vec::new)
                    .push((company_id, Some(value[2..].to_vec())));
            }
            other => trace!("Skipping AD structure type {:#04x}", other),
        }
    }

    fn push_service_uuids(&mut self, uuids: impl Iterator<Item = Uuid>) {
        self.service_uuids
            .get_or_insert_with(Vec::new)
            .extend(uuids.map(|u| Some(to_canonical(&u))));
    }

    fn push_service_data(&mut self, uuid: Uuid, payload: &[u8]) {
        self.service_data
            .get_or_insert_with(Vec::new)
            .push((Some(to_canonical(&uuid)), Some(payload.to_vec())));
    }
}

/// 128-bit UUIDs travel little-endian over the air.
fn uuid_from_le_bytes(chunk: &[u8]) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(chunk);
    bytes.reverse();
    Uuid::from_bytes(bytes)
}

/// A scan callback payload from a host with structured scan support.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformScanResult {
    /// Parsed scan record, if the host produced one.
    pub scan_record: Option<ScanRecord>,
    /// Direct connectable flag; only newer hosts report it.
    pub connectable: Option<bool>,
    /// Signal strength in dBm.
    pub rssi: i32,
}

/// Where a scan result's advertisement comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvertisementSource {
    /// Raw manufacturer buffer: two-byte big-endian company id, then payload.
    Raw(Bytes),
    /// Structured scan callback.
    Structured(PlatformScanResult),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_record() {
        let data = [
            0x02, 0x01, 0x06, // flags
            0x05, 0x09, b'P', b'r', b'o', b'b', // complete local name
            0x02, 0x0a, 0xf4, // tx power -12
            0x05, 0x03, 0x0d, 0x18, 0x0f, 0x18, // 16-bit uuids 180d, 180f
            0x04, 0x16, 0x0f, 0x18, 0x64, // service data 180f -> [0x64]
            0x05, 0xff, 0xc7, 0x09, 0xaa, 0xbb, // manufacturer 0x09c7
        ];

        let record = ScanRecord::parse(&data);
        assert_eq!(record.advertise_flags, Some(0x06));
        assert_eq!(record.device_name.as_deref(), Some("Prob"));
        assert_eq!(record.tx_power_level, -12);
        assert_eq!(
            record.service_uuids,
            Some(vec![
                Some("0000180d-0000-1000-8000-00805f9b34fb".to_string()),
                Some("0000180f-0000-1000-8000-00805f9b34fb".to_string()),
            ])
        );
        assert_eq!(
            record.service_data,
            Some(vec![(
                Some("0000180f-0000-1000-8000-00805f9b34fb".to_string()),
                Some(vec![0x64])
            )])
        );
        assert_eq!(
            record.manufacturer_specific_data,
            Some(vec![(0x09c7, Some(vec![0xaa, 0xbb]))])
        );
    }

    #[test]
    fn test_parse_128_bit_uuid() {
        let uuid = Uuid::parse_str("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap();
        let mut le = *uuid.as_bytes();
        le.reverse();

        let mut data = vec![17, AD_COMPLETE_128_BIT_UUIDS];
        data.extend_from_slice(&le);

        let record = ScanRecord::parse(&data);
        assert_eq!(
            record.service_uuids,
            Some(vec![Some(
                "6e400001-b5a3-f393-e0a9-e50e24dcca9e".to_string()
            )])
        );
    }

    #[test]
    fn test_parse_truncated_tail_keeps_prefix() {
        // Flags, then a name structure claiming 9 bytes with only 2 present.
        let data = [0x02, 0x01, 0x04, 0x0a, 0x09, b'A', b'B'];
        let record = ScanRecord::parse(&data);
        assert_eq!(record.advertise_flags, Some(0x04));
        assert_eq!(record.device_name, None);
    }

    #[test]
    fn test_parse_stops_at_padding() {
        let data = [0x02, 0x01, 0x02, 0x00, 0x00, 0x05, 0xff];
        let record = ScanRecord::parse(&data);
        assert_eq!(record.advertise_flags, Some(0x02));
        assert_eq!(record.manufacturer_specific_data, None);
    }

    #[test]
    fn test_shortened_name_does_not_override_complete() {
        let data = [
            0x03, AD_COMPLETE_LOCAL_NAME, b'A', b'B', 0x02, AD_SHORTENED_LOCAL_NAME, b'A',
        ];
        let record = ScanRecord::parse(&data);
        assert_eq!(record.device_name.as_deref(), Some("AB"));
    }

    #[test]
    fn test_empty_record() {
        let record = ScanRecord::parse(&[]);
        assert_eq!(record, ScanRecord::default());
        assert_eq!(record.tx_power_level, TX_POWER_NOT_PRESENT);
    }
}
