//! Bluetooth UUID constants and canonical string forms.
//!
//! Every UUID that reaches a wire message goes through [`canonical_uuid`] or
//! [`to_canonical`], so clients only ever see lowercase, hyphenated,
//! 128-bit strings.

use uuid::Uuid;

/// Bluetooth Base UUID (`00000000-0000-1000-8000-00805f9b34fb`).
pub const BLUETOOTH_BASE_UUID: Uuid = Uuid::from_u128(0x0000_0000_0000_1000_8000_00805f9b34fb);

/// Client Characteristic Configuration Descriptor UUID.
pub const CCCD_UUID: Uuid = Uuid::from_u128(0x0000_2902_0000_1000_8000_00805f9b34fb);

/// Expand a 16-bit assigned number into a full UUID.
pub const fn uuid_from_u16(short: u16) -> Uuid {
    uuid_from_u32(short as u32)
}

/// Expand a 32-bit assigned number into a full UUID.
pub const fn uuid_from_u32(short: u32) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID.as_u128() | ((short as u128) << 96))
}

/// Canonical wire form of a UUID.
pub fn to_canonical(uuid: &Uuid) -> String {
    uuid.hyphenated().to_string()
}

/// Parse a platform UUID string into its canonical wire form.
///
/// Accepts 16-bit (`"180d"`) and 32-bit short forms, which are expanded
/// against the Bluetooth Base UUID, as well as any 128-bit form the `uuid`
/// crate understands. Returns `None` for anything else.
pub fn canonical_uuid(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let uuid = match raw.len() {
        4 => uuid_from_u16(u16::from_str_radix(raw, 16).ok()?),
        8 => uuid_from_u32(u32::from_str_radix(raw, 16).ok()?),
        _ => Uuid::parse_str(raw).ok()?,
    };
    Some(to_canonical(&uuid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_uuid_expansion() {
        assert_eq!(
            uuid_from_u16(0x2902).to_string(),
            "00002902-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(uuid_from_u16(0x2902), CCCD_UUID);
        assert_eq!(
            uuid_from_u32(0x1234_5678).to_string(),
            "12345678-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_canonical_uuid() {
        assert_eq!(
            canonical_uuid("180D").as_deref(),
            Some("0000180d-0000-1000-8000-00805f9b34fb")
        );
        assert_eq!(
            canonical_uuid("6E400001-B5A3-F393-E0A9-E50E24DCCA9E").as_deref(),
            Some("6e400001-b5a3-f393-e0a9-e50e24dcca9e")
        );
        assert_eq!(
            canonical_uuid("6e400001b5a3f393e0a9e50e24dcca9e").as_deref(),
            Some("6e400001-b5a3-f393-e0a9-e50e24dcca9e")
        );
    }

    #[test]
    fn test_canonical_uuid_rejects_garbage() {
        assert_eq!(canonical_uuid(""), None);
        assert_eq!(canonical_uuid("   "), None);
        assert_eq!(canonical_uuid("zzzz"), None);
        assert_eq!(canonical_uuid("not-a-uuid"), None);
    }
}
