//! Characteristic properties bitmask decoding.

use btleplug::api::CharPropFlags;

use crate::wire::CharacteristicProperties;

const BROADCAST: u32 = 1;
const READ: u32 = 2;
const WRITE_WITHOUT_RESPONSE: u32 = 4;
const WRITE: u32 = 8;
const NOTIFY: u32 = 16;
const INDICATE: u32 = 32;
const AUTHENTICATED_SIGNED_WRITES: u32 = 64;
const EXTENDED_PROPERTIES: u32 = 128;
const NOTIFY_ENCRYPTION_REQUIRED: u32 = 256;
const INDICATE_ENCRYPTION_REQUIRED: u32 = 512;

impl CharacteristicProperties {
    /// Decode a host properties bitmask. Unknown bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            broadcast: bits & BROADCAST != 0,
            read: bits & READ != 0,
            write_without_response: bits & WRITE_WITHOUT_RESPONSE != 0,
            write: bits & WRITE != 0,
            notify: bits & NOTIFY != 0,
            indicate: bits & INDICATE != 0,
            authenticated_signed_writes: bits & AUTHENTICATED_SIGNED_WRITES != 0,
            extended_properties: bits & EXTENDED_PROPERTIES != 0,
            notify_encryption_required: bits & NOTIFY_ENCRYPTION_REQUIRED != 0,
            indicate_encryption_required: bits & INDICATE_ENCRYPTION_REQUIRED != 0,
        }
    }
}

impl From<CharPropFlags> for CharacteristicProperties {
    fn from(flags: CharPropFlags) -> Self {
        Self::from_bits(u32::from(flags.bits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_read_write_without_response_notify() {
        let props = CharacteristicProperties::from_bits(0b0000010110);
        assert_eq!(
            props,
            CharacteristicProperties {
                read: true,
                write_without_response: true,
                notify: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_encryption_required_bits() {
        let props = CharacteristicProperties::from_bits(256 | 512);
        assert!(props.notify_encryption_required);
        assert!(props.indicate_encryption_required);
        assert!(!props.notify);
        assert!(!props.indicate);
    }

    #[test]
    fn test_unknown_bits_ignored() {
        assert_eq!(
            CharacteristicProperties::from_bits(0xFFFF_FC00),
            CharacteristicProperties::default()
        );
    }

    #[test]
    fn test_from_char_prop_flags() {
        let props = CharacteristicProperties::from(CharPropFlags::WRITE | CharPropFlags::INDICATE);
        assert!(props.write);
        assert!(props.indicate);
        assert!(!props.read);
    }

    proptest! {
        #[test]
        fn prop_each_flag_tracks_its_bit(bits in any::<u32>()) {
            let p = CharacteristicProperties::from_bits(bits);
            let flags = [
                p.broadcast,
                p.read,
                p.write_without_response,
                p.write,
                p.notify,
                p.indicate,
                p.authenticated_signed_writes,
                p.extended_properties,
                p.notify_encryption_required,
                p.indicate_encryption_required,
            ];
            for (i, flag) in flags.iter().enumerate() {
                prop_assert_eq!(*flag, bits & (1 << i) != 0);
            }
        }
    }
}
