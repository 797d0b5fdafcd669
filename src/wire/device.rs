//! Device identity and connection-state messages.

/// Transport type of a remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceType {
    /// Type could not be determined.
    #[default]
    Unknown,
    /// Low Energy only.
    Le,
    /// BR/EDR (classic) only.
    Classic,
    /// Dual mode, LE and classic.
    Dual,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Le => write!(f, "LE"),
            Self::Classic => write!(f, "CLASSIC"),
            Self::Dual => write!(f, "DUAL"),
        }
    }
}

/// Snapshot of a remote device's identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceIdentity {
    /// Stable platform address.
    pub remote_id: String,
    /// Advertised or cached device name, if the platform knows one.
    pub name: Option<String>,
    /// Transport type.
    pub device_type: DeviceType,
}

/// Connection state of a remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceState {
    /// Not connected.
    #[default]
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected.
    Connected,
    /// A disconnection is in progress.
    Disconnecting,
}

impl DeviceState {
    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if in a transitional state.
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Disconnecting)
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}

/// Connection-state change for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceStateResponse {
    /// Address of the device whose state changed.
    pub remote_id: String,
    /// The new state.
    pub state: DeviceState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_state() {
        assert!(!DeviceState::Disconnected.is_connected());
        assert!(DeviceState::Connected.is_connected());
        assert!(DeviceState::Connecting.is_transitioning());
        assert!(DeviceState::Disconnecting.is_transitioning());
        assert!(!DeviceState::Connected.is_transitioning());
        assert_eq!(DeviceState::default(), DeviceState::Disconnected);
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceState::Connected.to_string(), "Connected");
        assert_eq!(DeviceType::Le.to_string(), "LE");
        assert_eq!(DeviceType::default(), DeviceType::Unknown);
    }
}
