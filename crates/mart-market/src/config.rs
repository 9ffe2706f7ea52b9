//! Marketplace configuration.

use std::path::Path;

use mart_core::Principal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MarketError, Result};

/// Fee denominator: one basis point is 1/10000.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for the platform fee (10%).
pub const MAX_PLATFORM_FEE_BPS: u16 = 1_000;

/// Platform fee applied when none is configured (2.5%).
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 250;

/// Initial settings of a marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Administrator of the marketplace.
    pub owner: Principal,
    /// Principal allowed to report execution outcomes.
    pub oracle: Principal,
    /// Platform fee in basis points, at most [`MAX_PLATFORM_FEE_BPS`].
    #[serde(default = "default_fee")]
    pub platform_fee_bps: u16,
}

const fn default_fee() -> u16 {
    DEFAULT_PLATFORM_FEE_BPS
}

impl MarketConfig {
    /// Creates a configuration with the default platform fee.
    #[must_use]
    pub const fn new(owner: Principal, oracle: Principal) -> Self {
        Self {
            owner,
            oracle,
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
        }
    }

    /// Sets the platform fee.
    #[must_use]
    pub fn with_platform_fee(mut self, bps: u16) -> Self {
        self.platform_fee_bps = bps;
        self
    }

    /// Checks roles and fee bounds.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` on a null owner or oracle or a fee
    /// above [`MAX_PLATFORM_FEE_BPS`].
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_null() {
            return Err(MarketError::invalid_input("owner must not be empty"));
        }
        if self.oracle.is_null() {
            return Err(MarketError::invalid_input("oracle must not be empty"));
        }
        check_fee(self.platform_fee_bps)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` on malformed JSON, or the validation error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MarketError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the file cannot be read or parsed, or
    /// the validation error.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MarketError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), fee_bps = config.platform_fee_bps, "loaded market config");
        Ok(config)
    }
}

/// Rejects fees above [`MAX_PLATFORM_FEE_BPS`].
pub(crate) fn check_fee(bps: u16) -> Result<()> {
    if bps > MAX_PLATFORM_FEE_BPS {
        return Err(MarketError::invalid_input(format!(
            "platform fee {bps} bps exceeds maximum of {MAX_PLATFORM_FEE_BPS} bps"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_case::test_case;

    fn config() -> MarketConfig {
        MarketConfig::new(Principal::new("owner"), Principal::new("oracle"))
    }

    #[test]
    fn default_fee_is_applied() {
        assert_eq!(config().platform_fee_bps, DEFAULT_PLATFORM_FEE_BPS);
        assert!(config().validate().is_ok());
    }

    #[test_case(0, true ; "zero")]
    #[test_case(250, true ; "default")]
    #[test_case(1000, true ; "max")]
    #[test_case(1001, false ; "above max")]
    fn fee_bounds(bps: u16, ok: bool) {
        assert_eq!(config().with_platform_fee(bps).validate().is_ok(), ok);
    }

    #[test]
    fn null_roles_rejected() {
        let no_owner = MarketConfig::new(Principal::null(), Principal::new("oracle"));
        let no_oracle = MarketConfig::new(Principal::new("owner"), Principal::new(""));
        assert_eq!(no_owner.validate().unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(no_oracle.validate().unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn json_without_fee_uses_default() {
        let config = MarketConfig::from_json_str(r#"{"owner":"o","oracle":"r"}"#).unwrap();
        assert_eq!(config.platform_fee_bps, DEFAULT_PLATFORM_FEE_BPS);
    }

    #[test]
    fn json_rejects_out_of_range_fee() {
        let err = MarketConfig::from_json_str(r#"{"owner":"o","oracle":"r","platform_fee_bps":5000}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn json_rejects_garbage() {
        let err = MarketConfig::from_json_str("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("market.json");
        std::fs::write(&path, r#"{"owner":"o","oracle":"r","platform_fee_bps":100}"#).unwrap();

        let config = MarketConfig::from_json_file(&path).unwrap();
        assert_eq!(config.platform_fee_bps, 100);

        let missing = MarketConfig::from_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Config);
    }
}
