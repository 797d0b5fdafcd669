//! Error types for the ble-wire crate.

use thiserror::Error;

use crate::advertiser::AdvertiseFailure;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Bluetooth-related error from the underlying BLE library.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Bluetooth is not available or is disabled on this system.
    #[error("Bluetooth not available or disabled")]
    BluetoothUnavailable,

    /// A raw advertisement buffer is too short to carry a manufacturer id.
    #[error("Malformed advertisement payload: {len} bytes (need at least 2)")]
    MalformedPayload {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// The payload parsed but cannot be advertised with the current settings.
    #[error("Invalid advertising payload: {reason}")]
    InvalidPayload {
        /// Why the payload was rejected.
        reason: String,
    },

    /// `start()` was called before any payload was set.
    #[error("No advertising payload configured")]
    NoPayloadConfigured,

    /// The platform has no advertising capability.
    #[error("Advertising not available on this platform")]
    AdvertisingUnavailable,

    /// The platform rejected a start request.
    #[error("Advertising failed to start: {failure}")]
    StartFailure {
        /// Decoded platform failure code.
        failure: AdvertiseFailure,
    },

    /// A scan result could not be assembled.
    #[error("Scan result mapping failed: {context}")]
    MappingFailure {
        /// Description of the failed step.
        context: String,
    },

    /// The downstream transport is no longer accepting messages.
    #[error("Transport closed")]
    TransportClosed,

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AdvertiseFailure> for Error {
    fn from(failure: AdvertiseFailure) -> Self {
        Self::StartFailure { failure }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedPayload { len: 1 };
        assert_eq!(
            err.to_string(),
            "Malformed advertisement payload: 1 bytes (need at least 2)"
        );

        let err = Error::from(AdvertiseFailure::TooManyAdvertisers);
        assert!(matches!(err, Error::StartFailure { .. }));
        assert!(err.to_string().contains("too many advertisers"));
    }
}
