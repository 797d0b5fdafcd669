//! BLE scanning that emits wire scan results.

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::mapping::{map_device_state, map_scan_result, map_services};
use crate::platform::device::{STATE_CONNECTED, STATE_DISCONNECTED};
use crate::platform::native;
use crate::platform::scan::AdvertisementSource;
use crate::transport::{WireMessage, WireTransport};
use crate::wire::{DeviceStateResponse, ScanResult, ServiceNode};

/// Default capacity of the scan event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Default interval at which the scan loop checks for a stop request.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Capacity of the scan event channel.
    pub event_capacity: usize,
    /// Only report devices advertising one of these services. Empty means all.
    pub service_filter: Vec<Uuid>,
    /// How often the scan loop checks for a stop request when idle.
    pub poll_interval: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            service_filter: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ScannerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Restrict scanning to devices advertising `service`.
    pub fn with_service(mut self, service: Uuid) -> Self {
        self.service_filter.push(service);
        self
    }

    /// Set the stop poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Event emitted when a device advertisement is seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// The mapped scan result.
    pub result: ScanResult,
    /// When the scanner processed the advertisement.
    pub received_at: DateTime<Utc>,
}

impl ScanEvent {
    /// Stamp a scan result with the current time.
    pub fn now(result: ScanResult) -> Self {
        Self {
            result,
            received_at: Utc::now(),
        }
    }
}

type Discovered = Arc<RwLock<HashMap<String, ScanEvent>>>;
type Peripherals = Arc<RwLock<HashMap<String, Peripheral>>>;

/// BLE scanner producing wire scan results.
pub struct BleScanner {
    /// The BLE adapter to use for scanning.
    adapter: Adapter,
    /// Scanner configuration.
    config: ScannerConfig,
    /// Whether scanning is currently active.
    is_scanning: Arc<RwLock<bool>>,
    /// Latest event per device.
    discovered: Discovered,
    /// Peripheral handles per device.
    peripherals: Peripherals,
    /// Channel for scan events.
    event_tx: broadcast::Sender<ScanEvent>,
    /// Handle to the scanning task.
    scan_handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl BleScanner {
    /// Create a scanner on the first available adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available.
    pub async fn new(config: ScannerConfig) -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|_e| Error::BluetoothUnavailable)?;

        let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(Error::BluetoothUnavailable)?;

        info!(
            "Using Bluetooth adapter: {:?}",
            adapter.adapter_info().await.ok()
        );

        Ok(Self::with_adapter(adapter, config))
    }

    /// Create a scanner with a specific adapter.
    pub fn with_adapter(adapter: Adapter, config: ScannerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        Self {
            adapter,
            config,
            is_scanning: Arc::new(RwLock::new(false)),
            discovered: Arc::new(RwLock::new(HashMap::new())),
            peripherals: Arc::new(RwLock::new(HashMap::new())),
            event_tx,
            scan_handle: Arc::new(RwLock::new(None)),
        }
    }

    /// Start scanning.
    ///
    /// # Errors
    ///
    /// Returns an error if scanning cannot be started.
    pub async fn start_scanning(&self) -> Result<()> {
        if *self.is_scanning.read() {
            debug!("Already scanning, ignoring start request");
            return Ok(());
        }

        info!(
            "Starting BLE scan ({} service filters)",
            self.config.service_filter.len()
        );

        self.adapter
            .start_scan(ScanFilter {
                services: self.config.service_filter.clone(),
            })
            .await
            .map_err(Error::Bluetooth)?;

        *self.is_scanning.write() = true;

        let adapter = self.adapter.clone();
        let is_scanning = self.is_scanning.clone();
        let discovered = self.discovered.clone();
        let peripherals = self.peripherals.clone();
        let event_tx = self.event_tx.clone();
        let poll_interval = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut events = match adapter.events().await {
                Ok(events) => events,
                Err(e) => {
                    error!("Failed to get adapter events: {}", e);
                    return;
                }
            };

            while *is_scanning.read() {
                tokio::select! {
                    Some(event) = events.next() => {
                        Self::handle_event(
                            event,
                            &adapter,
                            &discovered,
                            &peripherals,
                            &event_tx,
                        ).await;
                    }
                    _ = tokio::time::sleep(poll_interval) => {
                        if !*is_scanning.read() {
                            break;
                        }
                    }
                }
            }

            debug!("Scan event loop ended");
        });

        *self.scan_handle.write() = Some(handle);

        Ok(())
    }

    /// Stop scanning.
    pub async fn stop_scanning(&self) -> Result<()> {
        if !*self.is_scanning.read() {
            debug!("Not scanning, ignoring stop request");
            return Ok(());
        }

        info!("Stopping BLE scan");

        *self.is_scanning.write() = false;

        self.adapter.stop_scan().await.map_err(Error::Bluetooth)?;

        let handle = self.scan_handle.write().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        Ok(())
    }

    /// Check if currently scanning.
    pub fn is_scanning(&self) -> bool {
        *self.is_scanning.read()
    }

    /// Get the configuration the scanner was created with.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Get the latest scan event for every device seen.
    pub fn discovered(&self) -> HashMap<String, ScanEvent> {
        self.discovered.read().clone()
    }

    /// Subscribe to scan events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying adapter.
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Forward every subsequent scan result to `transport`.
    ///
    /// The returned task ends when the scanner is dropped or the transport
    /// closes.
    pub fn forward_to<T>(&self, transport: T) -> tokio::task::JoinHandle<()>
    where
        T: WireTransport + 'static,
    {
        tokio::spawn(forward_scan_events(self.subscribe(), transport))
    }

    fn peripheral(&self, remote_id: &str) -> Result<Peripheral> {
        self.peripherals
            .read()
            .get(remote_id)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("Unknown device: {}", remote_id)))
    }

    /// Report the current connection state of a discovered device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device was never discovered or the adapter
    /// cannot be queried.
    pub async fn device_state(&self, remote_id: &str) -> Result<DeviceStateResponse> {
        let peripheral = self.peripheral(remote_id)?;
        let (device, _) = native::snapshot_peripheral(&peripheral)
            .await?
            .ok_or_else(|| Error::Internal(format!("No properties for {}", remote_id)))?;

        let state = if peripheral.is_connected().await? {
            STATE_CONNECTED
        } else {
            STATE_DISCONNECTED
        };

        Ok(map_device_state(&device, state))
    }

    /// Connect to a discovered device and describe its services.
    ///
    /// # Errors
    ///
    /// Returns an error if the device was never discovered, cannot be
    /// connected or service discovery fails.
    pub async fn discover_services(&self, remote_id: &str) -> Result<Vec<ServiceNode>> {
        let peripheral = self.peripheral(remote_id)?;
        let (device, _) = native::snapshot_peripheral(&peripheral)
            .await?
            .ok_or_else(|| Error::Internal(format!("No properties for {}", remote_id)))?;

        if !peripheral.is_connected().await? {
            info!("Connecting to {}", remote_id);
            peripheral.connect().await?;
        }
        peripheral.discover_services().await?;

        let graph = native::gatt_graph(&peripheral);
        let services = map_services(&device, &graph);
        debug!("Discovered {} services on {}", services.len(), remote_id);

        Ok(services)
    }

    /// Handle a BLE central event.
    async fn handle_event(
        event: CentralEvent,
        adapter: &Adapter,
        discovered: &Discovered,
        peripherals: &Peripherals,
        event_tx: &broadcast::Sender<ScanEvent>,
    ) {
        match event {
            CentralEvent::DeviceDiscovered(id) => {
                trace!("Device discovered: {:?}", id);
                Self::process_peripheral(adapter, id, discovered, peripherals, event_tx).await;
            }
            CentralEvent::DeviceUpdated(id) => {
                trace!("Device updated: {:?}", id);
                Self::process_peripheral(adapter, id, discovered, peripherals, event_tx).await;
            }
            CentralEvent::ManufacturerDataAdvertisement { id, .. }
            | CentralEvent::ServiceDataAdvertisement { id, .. }
            | CentralEvent::ServicesAdvertisement { id, .. } => {
                trace!("Advertisement from {:?}", id);
                Self::process_peripheral(adapter, id, discovered, peripherals, event_tx).await;
            }
            CentralEvent::DeviceConnected(id) => {
                debug!("Device connected: {:?}", id);
            }
            CentralEvent::DeviceDisconnected(id) => {
                debug!("Device disconnected: {:?}", id);
            }
            _ => {}
        }
    }

    /// Map a peripheral's cached advertisement and publish it.
    async fn process_peripheral(
        adapter: &Adapter,
        id: PeripheralId,
        discovered: &Discovered,
        peripherals: &Peripherals,
        event_tx: &broadcast::Sender<ScanEvent>,
    ) {
        let peripheral = match adapter.peripheral(&id).await {
            Ok(p) => p,
            Err(e) => {
                trace!("Failed to get peripheral: {}", e);
                return;
            }
        };

        let (device, scan) = match native::snapshot_peripheral(&peripheral).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                trace!("Failed to read peripheral properties: {}", e);
                return;
            }
        };

        let rssi = scan.rssi;
        let result = map_scan_result(&device, &AdvertisementSource::Structured(scan), rssi);
        let event = ScanEvent::now(result);
        let identifier = device.address;

        peripherals.write().insert(identifier.clone(), peripheral);
        discovered.write().insert(identifier, event.clone());

        let _ = event_tx.send(event);
    }
}

impl Drop for BleScanner {
    fn drop(&mut self) {
        *self.is_scanning.write() = false;
    }
}

/// Pump scan events into a transport until either side closes.
pub async fn forward_scan_events<T>(mut events: broadcast::Receiver<ScanEvent>, transport: T)
where
    T: WireTransport,
{
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(e) = transport.send(WireMessage::ScanResult(event.result)).await {
                    debug!("Stopping scan forwarding: {}", e);
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Scan forwarding lagged, dropped {} results", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use crate::wire::{AdvertisementData, DeviceIdentity, DeviceType};
    use pretty_assertions::assert_eq;

    fn event(remote_id: &str, rssi: i32) -> ScanEvent {
        ScanEvent::now(ScanResult {
            device: DeviceIdentity {
                remote_id: remote_id.to_string(),
                name: None,
                device_type: DeviceType::Le,
            },
            advertisement_data: AdvertisementData::default(),
            rssi,
        })
    }

    #[test]
    fn test_config_defaults() {
        let config = ScannerConfig::new();
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert!(config.service_filter.is_empty());
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);

        let heart_rate = crate::uuids::uuid_from_u16(0x180d);
        let config = ScannerConfig::new()
            .with_event_capacity(8)
            .with_service(heart_rate)
            .with_poll_interval(Duration::from_millis(250));
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.service_filter, vec![heart_rate]);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_forward_scan_events() {
        let (event_tx, event_rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let (transport, mut rx) = ChannelTransport::new(ChannelTransport::DEFAULT_CAPACITY);
        let forwarder = tokio::spawn(forward_scan_events(event_rx, transport));

        let first = event("AA:AA", -40);
        let second = event("BB:BB", -70);
        event_tx.send(first.clone()).unwrap();
        event_tx.send(second.clone()).unwrap();
        drop(event_tx);

        assert_eq!(rx.recv().await, Some(WireMessage::ScanResult(first.result)));
        assert_eq!(rx.recv().await, Some(WireMessage::ScanResult(second.result)));

        forwarder.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_forwarding_stops_when_transport_closes() {
        let (event_tx, event_rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let (transport, rx) = ChannelTransport::new(1);
        drop(rx);

        let forwarder = tokio::spawn(forward_scan_events(event_rx, transport));
        event_tx.send(event("AA:AA", -40)).unwrap();

        forwarder.await.unwrap();
    }
}
