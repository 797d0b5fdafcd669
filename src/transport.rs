//! Outbound transport for wire messages.
//!
//! The crate does not frame or ship messages itself. Anything that can accept
//! a [`WireMessage`] implements [`WireTransport`]; [`ChannelTransport`] hands
//! messages to an in-process consumer over a tokio channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::advertiser::AdvertisingStatus;
use crate::error::{Error, Result};
use crate::wire::{DeviceStateResponse, ScanResult, ServiceNode};

/// A message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WireMessage {
    /// A device was seen advertising.
    ScanResult(ScanResult),
    /// A device's connection state changed.
    DeviceState(DeviceStateResponse),
    /// The discovered services of a device.
    Services {
        remote_id: String,
        services: Vec<ServiceNode>,
    },
    /// Local advertising status.
    AdvertisingStatus(AdvertisingStatus),
}

impl WireMessage {
    /// The remote device this message is about, if any.
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Self::ScanResult(result) => Some(&result.device.remote_id),
            Self::DeviceState(response) => Some(&response.remote_id),
            Self::Services { remote_id, .. } => Some(remote_id),
            Self::AdvertisingStatus(_) => None,
        }
    }
}

impl From<ScanResult> for WireMessage {
    fn from(result: ScanResult) -> Self {
        Self::ScanResult(result)
    }
}

impl From<DeviceStateResponse> for WireMessage {
    fn from(response: DeviceStateResponse) -> Self {
        Self::DeviceState(response)
    }
}

/// Sink for wire messages.
#[async_trait]
pub trait WireTransport: Send + Sync {
    /// Hand a message to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportClosed`] once the far side has gone away.
    async fn send(&self, message: WireMessage) -> Result<()>;
}

/// Transport backed by a bounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<WireMessage>,
}

impl ChannelTransport {
    /// Default channel capacity.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a transport and the receiver that consumes it.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<WireMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl WireTransport for ChannelTransport {
    async fn send(&self, message: WireMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| Error::TransportClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{AdvertisementData, DeviceIdentity, DeviceState, DeviceType};
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    fn scan_result() -> ScanResult {
        ScanResult {
            device: DeviceIdentity {
                remote_id: "AA:BB:CC:DD:EE:FF".to_string(),
                name: Some("Thermometer".to_string()),
                device_type: DeviceType::Le,
            },
            advertisement_data: AdvertisementData::default(),
            rssi: -60,
        }
    }

    #[tokio::test]
    async fn test_channel_transport_delivers_in_order() {
        let (transport, mut rx) = ChannelTransport::new(ChannelTransport::DEFAULT_CAPACITY);

        assert_ok!(transport.send(scan_result().into()).await);
        assert_ok!(
            transport
                .send(WireMessage::AdvertisingStatus(AdvertisingStatus::Starting))
                .await
        );

        assert_eq!(rx.recv().await, Some(WireMessage::ScanResult(scan_result())));
        assert_eq!(
            rx.recv().await,
            Some(WireMessage::AdvertisingStatus(AdvertisingStatus::Starting))
        );
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (transport, rx) = ChannelTransport::new(1);
        drop(rx);
        assert!(transport.is_closed());

        let result = tokio_test::block_on(transport.send(scan_result().into()));
        assert!(matches!(assert_err!(result), Error::TransportClosed));
    }

    #[test]
    fn test_remote_id() {
        assert_eq!(
            WireMessage::from(scan_result()).remote_id(),
            Some("AA:BB:CC:DD:EE:FF")
        );

        let state = WireMessage::from(DeviceStateResponse {
            remote_id: "11:22".to_string(),
            state: DeviceState::Connected,
        });
        assert_eq!(state.remote_id(), Some("11:22"));

        assert_eq!(
            WireMessage::AdvertisingStatus(AdvertisingStatus::NotAdvertising).remote_id(),
            None
        );
    }
}
