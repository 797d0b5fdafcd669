//! Advertising settings.

/// Largest legacy advertising PDU payload.
pub const LEGACY_ADV_DATA_LEN_MAX: usize = 31;

/// Bytes taken by the flags AD structure, present when connectable.
const FLAGS_AD_LEN: usize = 3;

/// Bytes taken by the manufacturer AD header: length, type, company id.
const MANUFACTURER_AD_HEADER_LEN: usize = 4;

/// Advertising interval trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdvertiseMode {
    /// About one advertisement per second.
    LowPower,
    /// About four advertisements per second.
    Balanced,
    /// About ten advertisements per second.
    #[default]
    LowLatency,
}

/// Transmit power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdvertiseTxPower {
    UltraLow,
    Low,
    Medium,
    #[default]
    High,
}

/// Settings an advertising session is created with.
///
/// Defaults to low latency, high power, non-connectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdvertiseSettings {
    /// Advertising interval trade-off.
    pub mode: AdvertiseMode,
    /// Transmit power.
    pub tx_power: AdvertiseTxPower,
    /// Whether centrals may connect.
    pub connectable: bool,
}

impl AdvertiseSettings {
    /// Create the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advertising mode.
    pub fn with_mode(mut self, mode: AdvertiseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the transmit power.
    pub fn with_tx_power(mut self, tx_power: AdvertiseTxPower) -> Self {
        self.tx_power = tx_power;
        self
    }

    /// Set whether the advertisement is connectable.
    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    /// Largest manufacturer payload (after the company id) that fits a legacy
    /// advertisement with these settings.
    pub fn max_manufacturer_data_len(&self) -> usize {
        let flags = if self.connectable { FLAGS_AD_LEN } else { 0 };
        LEGACY_ADV_DATA_LEN_MAX - MANUFACTURER_AD_HEADER_LEN - flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AdvertiseSettings::new();
        assert_eq!(settings.mode, AdvertiseMode::LowLatency);
        assert_eq!(settings.tx_power, AdvertiseTxPower::High);
        assert!(!settings.connectable);
    }

    #[test]
    fn test_max_manufacturer_data_len() {
        assert_eq!(AdvertiseSettings::new().max_manufacturer_data_len(), 27);
        assert_eq!(
            AdvertiseSettings::new()
                .with_connectable(true)
                .max_manufacturer_data_len(),
            24
        );
    }
}
