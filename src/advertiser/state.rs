//! Advertising states, events and failure codes.

/// State of an advertising session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdvertisingState {
    /// No payload configured, not advertising.
    #[default]
    Idle,
    /// Payload configured, not advertising.
    Stopped,
    /// Start requested, waiting for the host to confirm.
    Starting,
    /// The host confirmed advertising started.
    Advertising,
}

impl AdvertisingState {
    /// Check if a start has been issued and not stopped since.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Advertising)
    }

    /// Collapse to the caller-facing status.
    pub fn status(&self) -> AdvertisingStatus {
        match self {
            Self::Idle | Self::Stopped => AdvertisingStatus::NotAdvertising,
            Self::Starting => AdvertisingStatus::Starting,
            Self::Advertising => AdvertisingStatus::Advertising,
        }
    }
}

impl std::fmt::Display for AdvertisingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Starting => write!(f, "Starting"),
            Self::Advertising => write!(f, "Advertising"),
        }
    }
}

/// Best-effort advertising status.
///
/// `Starting` covers the window between a start request and the host's
/// answer, during which the radio may or may not be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvertisingStatus {
    #[default]
    NotAdvertising,
    Starting,
    Advertising,
}

/// Why the host refused to start advertising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvertiseFailure {
    /// The payload exceeds what the host can advertise.
    DataTooLarge,
    /// No advertising instance is free.
    TooManyAdvertisers,
    /// This callback is already advertising.
    AlreadyStarted,
    /// Host stack error.
    InternalError,
    /// The controller does not support the request.
    FeatureUnsupported,
    /// Any other code.
    Unknown(i32),
}

impl AdvertiseFailure {
    /// Create from the host's failure code.
    pub fn from_raw(code: i32) -> Self {
        match code {
            1 => Self::DataTooLarge,
            2 => Self::TooManyAdvertisers,
            3 => Self::AlreadyStarted,
            4 => Self::InternalError,
            5 => Self::FeatureUnsupported,
            other => Self::Unknown(other),
        }
    }

    /// The host's failure code.
    pub fn code(&self) -> i32 {
        match self {
            Self::DataTooLarge => 1,
            Self::TooManyAdvertisers => 2,
            Self::AlreadyStarted => 3,
            Self::InternalError => 4,
            Self::FeatureUnsupported => 5,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for AdvertiseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataTooLarge => write!(f, "data too large"),
            Self::TooManyAdvertisers => write!(f, "too many advertisers"),
            Self::AlreadyStarted => write!(f, "already started"),
            Self::InternalError => write!(f, "internal error"),
            Self::FeatureUnsupported => write!(f, "feature unsupported"),
            Self::Unknown(code) => write!(f, "unknown error code {}", code),
        }
    }
}

/// Host callback delivered to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseEvent {
    /// The host started advertising.
    StartSuccess,
    /// The host refused to start, with its failure code.
    StartFailure(i32),
}

/// Notification emitted by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved between states.
    StateChanged {
        from: AdvertisingState,
        to: AdvertisingState,
    },
    /// The host rejected a start request.
    StartFailed(AdvertiseFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        assert_eq!(AdvertisingState::Idle.status(), AdvertisingStatus::NotAdvertising);
        assert_eq!(AdvertisingState::Stopped.status(), AdvertisingStatus::NotAdvertising);
        assert_eq!(AdvertisingState::Starting.status(), AdvertisingStatus::Starting);
        assert_eq!(AdvertisingState::Advertising.status(), AdvertisingStatus::Advertising);

        assert!(AdvertisingState::Starting.is_active());
        assert!(AdvertisingState::Advertising.is_active());
        assert!(!AdvertisingState::Stopped.is_active());
    }

    #[test]
    fn test_failure_codes() {
        for code in 1..=5 {
            assert_eq!(AdvertiseFailure::from_raw(code).code(), code);
        }
        assert_eq!(AdvertiseFailure::from_raw(17), AdvertiseFailure::Unknown(17));
        assert_eq!(AdvertiseFailure::from_raw(1).to_string(), "data too large");
    }
}
