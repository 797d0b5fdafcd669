//! Advertising session state machine.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::platform::{AdvertisePayload, PlatformAdvertiser};
use super::settings::AdvertiseSettings;
use super::state::{AdvertiseEvent, AdvertiseFailure, AdvertisingState, AdvertisingStatus, SessionEvent};
use crate::error::{Error, Result};
use crate::mapping::advertisement::ManufacturerPayload;

/// State and payload, always read and written together.
struct Inner {
    state: AdvertisingState,
    payload: Option<AdvertisePayload>,
}

/// Shared between the session and every callback handle given to the host.
struct Shared {
    inner: Mutex<Inner>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Shared {
    /// Update the state and emit an event if it changed.
    fn set_state(&self, inner: &mut Inner, new_state: AdvertisingState) {
        let old_state = inner.state;
        inner.state = new_state;

        if old_state != new_state {
            debug!("Advertising state changed: {} -> {}", old_state, new_state);
            let _ = self.event_tx.send(SessionEvent::StateChanged {
                from: old_state,
                to: new_state,
            });
        }
    }

    fn handle_event(&self, event: AdvertiseEvent) {
        let mut inner = self.inner.lock();

        match (inner.state, event) {
            (AdvertisingState::Starting, AdvertiseEvent::StartSuccess) => {
                self.set_state(&mut inner, AdvertisingState::Advertising);
                info!("Advertising started successfully");
            }
            (AdvertisingState::Starting, AdvertiseEvent::StartFailure(code)) => {
                let failure = AdvertiseFailure::from_raw(code);
                self.set_state(&mut inner, AdvertisingState::Stopped);
                error!("Advertising failed to start: {} (code {})", failure, code);
                let _ = self.event_tx.send(SessionEvent::StartFailed(failure));
            }
            // Answers to a start that was stopped or superseded.
            (state, event) => debug!("Ignoring {:?} in state {}", event, state),
        }
    }
}

/// Handle through which the host reports start outcomes.
///
/// Cheap to clone and safe to call from any thread.
#[derive(Clone)]
pub struct AdvertisingCallback {
    shared: Arc<Shared>,
}

impl AdvertisingCallback {
    /// The host started advertising.
    pub fn on_start_success(&self) {
        self.deliver(AdvertiseEvent::StartSuccess);
    }

    /// The host refused to start advertising.
    pub fn on_start_failure(&self, code: i32) {
        self.deliver(AdvertiseEvent::StartFailure(code));
    }

    /// Deliver a host event to the session.
    pub fn deliver(&self, event: AdvertiseEvent) {
        self.shared.handle_event(event);
    }
}

impl fmt::Debug for AdvertisingCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvertisingCallback").finish_non_exhaustive()
    }
}

/// Outbound advertising for one peripheral.
///
/// `start`, `stop` and `set_payload` return as soon as the host request is
/// issued. The session records the new state before calling into the host,
/// so a callback delivered from inside that call still finds the session in
/// `Starting`.
///
/// A concurrent `stop` racing the restart inside `set_payload` is not
/// serialized against it; whichever writes the state last wins.
pub struct AdvertisingSession {
    advertiser: Option<Box<dyn PlatformAdvertiser>>,
    settings: AdvertiseSettings,
    shared: Arc<Shared>,
}

impl AdvertisingSession {
    /// Capacity of the session event channel.
    pub const EVENT_CHANNEL_CAPACITY: usize = 16;

    /// Create a session.
    ///
    /// Pass `None` when the host has no advertising capability; the session
    /// then rejects every operation with [`Error::AdvertisingUnavailable`].
    pub fn new(advertiser: Option<Box<dyn PlatformAdvertiser>>, settings: AdvertiseSettings) -> Self {
        if advertiser.is_none() {
            warn!("Bluetooth LE advertiser is not available");
        }

        let (event_tx, _) = broadcast::channel(Self::EVENT_CHANNEL_CAPACITY);

        Self {
            advertiser,
            settings,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: AdvertisingState::Idle,
                    payload: None,
                }),
                event_tx,
            }),
        }
    }

    /// Check if the host can advertise at all.
    pub fn is_available(&self) -> bool {
        self.advertiser.is_some()
    }

    /// Settings fixed at construction.
    pub fn settings(&self) -> &AdvertiseSettings {
        &self.settings
    }

    /// Get the current state.
    pub fn state(&self) -> AdvertisingState {
        self.shared.inner.lock().state
    }

    /// Get the best-effort advertising status.
    pub fn status(&self) -> AdvertisingStatus {
        self.state().status()
    }

    /// Check if the host confirmed advertising and nothing stopped it since.
    ///
    /// May lag the radio while a start is in flight.
    pub fn is_advertising(&self) -> bool {
        self.state() == AdvertisingState::Advertising
    }

    /// Get the configured payload.
    pub fn payload(&self) -> Option<AdvertisePayload> {
        self.shared.inner.lock().payload.clone()
    }

    /// Subscribe to state changes and start failures.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Callback handle to give to the host.
    pub fn callback(&self) -> AdvertisingCallback {
        AdvertisingCallback {
            shared: self.shared.clone(),
        }
    }

    fn advertiser(&self) -> Result<&dyn PlatformAdvertiser> {
        self.advertiser
            .as_deref()
            .ok_or(Error::AdvertisingUnavailable)
    }

    /// Replace the payload and (re)start advertising it.
    ///
    /// `data` is a two-byte big-endian company id followed by the
    /// manufacturer payload. The advertisement carries nothing else.
    ///
    /// # Errors
    ///
    /// - [`Error::AdvertisingUnavailable`] if the host cannot advertise.
    /// - [`Error::MalformedPayload`] if `data` is shorter than two bytes.
    /// - [`Error::InvalidPayload`] if the payload does not fit a legacy
    ///   advertisement with the session settings.
    pub fn set_payload(&self, data: &[u8]) -> Result<()> {
        let advertiser = self.advertiser()?;
        let manufacturer = ManufacturerPayload::parse(data)?;

        let max_len = self.settings.max_manufacturer_data_len();
        if manufacturer.data.len() > max_len {
            return Err(Error::InvalidPayload {
                reason: format!(
                    "manufacturer data is {} bytes, at most {} fit",
                    manufacturer.data.len(),
                    max_len
                ),
            });
        }

        let payload = AdvertisePayload::manufacturer_only(manufacturer);

        let was_active = {
            let mut inner = self.shared.inner.lock();
            let was_active = inner.state.is_active();
            inner.payload = Some(payload.clone());
            self.shared.set_state(&mut inner, AdvertisingState::Starting);
            was_active
        };

        if was_active {
            debug!("Stopping current advertisement before restarting");
            advertiser.stop_advertising();
        }

        info!(
            "Advertising manufacturer {:#06x} ({} bytes)",
            payload.manufacturer.company_id,
            payload.manufacturer.data.len()
        );
        advertiser.start_advertising(&self.settings, &payload, self.callback());

        Ok(())
    }

    /// Start advertising the configured payload.
    ///
    /// Does nothing if a start is already in flight or confirmed.
    ///
    /// # Errors
    ///
    /// - [`Error::AdvertisingUnavailable`] if the host cannot advertise.
    /// - [`Error::NoPayloadConfigured`] if no payload was set.
    pub fn start(&self) -> Result<()> {
        let advertiser = self.advertiser()?;

        let payload = {
            let mut inner = self.shared.inner.lock();
            if inner.state.is_active() {
                debug!("Already advertising, ignoring start request");
                return Ok(());
            }
            let payload = inner.payload.clone().ok_or(Error::NoPayloadConfigured)?;
            self.shared.set_state(&mut inner, AdvertisingState::Starting);
            payload
        };

        info!("Starting advertising");
        advertiser.start_advertising(&self.settings, &payload, self.callback());

        Ok(())
    }

    /// Stop advertising.
    ///
    /// Takes effect immediately from the caller's point of view; the host's
    /// confirmation is not awaited. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AdvertisingUnavailable`] if the host cannot advertise.
    pub fn stop(&self) -> Result<()> {
        let advertiser = self.advertiser()?;

        {
            let mut inner = self.shared.inner.lock();
            let new_state = if inner.payload.is_some() {
                AdvertisingState::Stopped
            } else {
                AdvertisingState::Idle
            };
            self.shared.set_state(&mut inner, new_state);
        }

        advertiser.stop_advertising();
        info!("Advertising stopped");

        Ok(())
    }

    /// Stop any active advertisement and release the session.
    pub fn shutdown(self) -> Result<()> {
        if self.is_available() && self.state().is_active() {
            self.stop()?;
        }
        Ok(())
    }
}

impl Drop for AdvertisingSession {
    fn drop(&mut self) {
        let Some(advertiser) = &self.advertiser else {
            return;
        };
        if self.shared.inner.lock().state.is_active() {
            debug!("Session dropped while advertising, stopping");
            advertiser.stop_advertising();
        }
    }
}

impl fmt::Debug for AdvertisingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvertisingSession")
            .field("available", &self.is_available())
            .field("settings", &self.settings)
            .field("state", &self.state())
            .finish()
    }
}
