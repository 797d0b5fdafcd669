//! Device snapshot and the host's integer constants.

/// Device type: unknown.
pub const DEVICE_TYPE_UNKNOWN: i32 = 0;
/// Device type: BR/EDR only.
pub const DEVICE_TYPE_CLASSIC: i32 = 1;
/// Device type: Low Energy only.
pub const DEVICE_TYPE_LE: i32 = 2;
/// Device type: dual mode.
pub const DEVICE_TYPE_DUAL: i32 = 3;

/// Connection state: disconnected.
pub const STATE_DISCONNECTED: i32 = 0;
/// Connection state: connecting.
pub const STATE_CONNECTING: i32 = 1;
/// Connection state: connected.
pub const STATE_CONNECTED: i32 = 2;
/// Connection state: disconnecting.
pub const STATE_DISCONNECTING: i32 = 3;

/// A remote device as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDevice {
    /// Host address string.
    pub address: String,
    /// Cached name; hosts return nothing until a name has been seen.
    pub name: Option<String>,
    /// One of the `DEVICE_TYPE_*` constants, or anything else the host invents.
    pub device_type: i32,
}

impl PlatformDevice {
    /// Create a device snapshot.
    pub fn new(address: impl Into<String>, name: Option<String>, device_type: i32) -> Self {
        Self {
            address: address.into(),
            name,
            device_type,
        }
    }
}
