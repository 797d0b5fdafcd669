//! Device identity and connection-state mapping.

use tracing::debug;

use crate::platform::device::{
    PlatformDevice, DEVICE_TYPE_CLASSIC, DEVICE_TYPE_DUAL, DEVICE_TYPE_LE, STATE_CONNECTED,
    STATE_CONNECTING, STATE_DISCONNECTED, STATE_DISCONNECTING,
};
use crate::wire::{DeviceIdentity, DeviceState, DeviceStateResponse, DeviceType};

impl DeviceType {
    /// Create from the host's device-type constant.
    pub fn from_raw(value: i32) -> Self {
        match value {
            DEVICE_TYPE_LE => Self::Le,
            DEVICE_TYPE_CLASSIC => Self::Classic,
            DEVICE_TYPE_DUAL => Self::Dual,
            _ => Self::Unknown,
        }
    }
}

impl DeviceState {
    /// Create from the host's connection-state constant.
    ///
    /// Returns `None` for values the host does not define.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            STATE_DISCONNECTED => Some(Self::Disconnected),
            STATE_CONNECTING => Some(Self::Connecting),
            STATE_CONNECTED => Some(Self::Connected),
            STATE_DISCONNECTING => Some(Self::Disconnecting),
            _ => None,
        }
    }
}

/// Map a device snapshot to its wire identity.
pub fn map_device(device: &PlatformDevice) -> DeviceIdentity {
    DeviceIdentity {
        remote_id: device.address.clone(),
        name: device.name.clone(),
        device_type: DeviceType::from_raw(device.device_type),
    }
}

/// Map a connection-state change.
///
/// Unknown state values fall back to [`DeviceState::Disconnected`], the wire
/// enum's default.
pub fn map_device_state(device: &PlatformDevice, state: i32) -> DeviceStateResponse {
    let state = DeviceState::from_raw(state).unwrap_or_else(|| {
        debug!(
            "Unknown connection state {} for {}, reporting disconnected",
            state, device.address
        );
        DeviceState::default()
    });

    DeviceStateResponse {
        remote_id: device.address.clone(),
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_device_type_from_raw() {
        assert_eq!(DeviceType::from_raw(0), DeviceType::Unknown);
        assert_eq!(DeviceType::from_raw(1), DeviceType::Classic);
        assert_eq!(DeviceType::from_raw(2), DeviceType::Le);
        assert_eq!(DeviceType::from_raw(3), DeviceType::Dual);
        assert_eq!(DeviceType::from_raw(42), DeviceType::Unknown);
        assert_eq!(DeviceType::from_raw(-1), DeviceType::Unknown);
    }

    #[test]
    fn test_map_device() {
        let device = PlatformDevice::new("11:22:33:44:55:66", Some("Band".to_string()), 3);
        assert_eq!(
            map_device(&device),
            DeviceIdentity {
                remote_id: "11:22:33:44:55:66".to_string(),
                name: Some("Band".to_string()),
                device_type: DeviceType::Dual,
            }
        );
    }

    #[test]
    fn test_map_device_without_name() {
        let device = PlatformDevice::new("11:22:33:44:55:66", None, DEVICE_TYPE_LE);
        assert_eq!(map_device(&device).name, None);
    }

    #[test]
    fn test_map_device_state() {
        let device = PlatformDevice::new("AA", None, DEVICE_TYPE_LE);
        assert_eq!(map_device_state(&device, 0).state, DeviceState::Disconnected);
        assert_eq!(map_device_state(&device, 1).state, DeviceState::Connecting);
        assert_eq!(map_device_state(&device, 2).state, DeviceState::Connected);
        assert_eq!(map_device_state(&device, 3).state, DeviceState::Disconnecting);

        let response = map_device_state(&device, 99);
        assert_eq!(response.state, DeviceState::Disconnected);
        assert_eq!(response.remote_id, "AA");
    }
}
