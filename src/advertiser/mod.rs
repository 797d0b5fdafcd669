//! Peripheral advertising.
//!
//! The host offers start and stop requests for outbound advertising, reports
//! start outcomes asynchronously and has no way to ask whether it is
//! advertising right now. [`AdvertisingSession`] keeps that answer itself.

pub mod platform;
pub mod session;
pub mod settings;
pub mod state;

pub use platform::{AdvertisePayload, PlatformAdvertiser};
pub use session::{AdvertisingCallback, AdvertisingSession};
pub use settings::{AdvertiseMode, AdvertiseSettings, AdvertiseTxPower};
pub use state::{AdvertiseEvent, AdvertiseFailure, AdvertisingState, AdvertisingStatus, SessionEvent};
