//! Engine configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::delivery::DeliverySettings;
use crate::domain::DEFAULT_VERIFICATION_TTL_SECS;

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "STOREFRONT_CONFIG";

/// Longest review window accepted for digital payments (one week).
pub const MAX_VERIFICATION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub delivery: DeliverySettings,

    #[serde(default)]
    pub payment: PaymentSettings,

    /// Capacity of every actor's request channel.
    #[serde(default = "default_mailbox_size")]
    pub mailbox_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    /// How long an admin has to review a digital payment.
    #[serde(default = "default_verification_ttl_secs")]
    pub verification_ttl_secs: i64,

    /// Period of the background expiry sweep. `None` disables it; reads still
    /// report lapsed verifications as expired.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: Option<u64>,
}

fn default_mailbox_size() -> usize {
    32
}

fn default_verification_ttl_secs() -> i64 {
    DEFAULT_VERIFICATION_TTL_SECS
}

fn default_sweep_interval_secs() -> Option<u64> {
    Some(5)
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            verification_ttl_secs: default_verification_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delivery: DeliverySettings::default(),
            payment: PaymentSettings::default(),
            mailbox_size: default_mailbox_size(),
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `STOREFRONT_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Review window, clamped to `1..=MAX_VERIFICATION_TTL_SECS` for configs
    /// built in code without passing through `load`.
    pub fn verification_ttl(&self) -> chrono::Duration {
        let secs = self.payment.verification_ttl_secs.clamp(1, MAX_VERIFICATION_TTL_SECS);
        chrono::Duration::seconds(secs)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.mailbox_size > 0, "mailbox_size must be positive");
        anyhow::ensure!(
            self.payment.verification_ttl_secs > 0,
            "payment.verification_ttl_secs must be positive"
        );
        anyhow::ensure!(
            self.payment.verification_ttl_secs <= MAX_VERIFICATION_TTL_SECS,
            "payment.verification_ttl_secs must not exceed {}",
            MAX_VERIFICATION_TTL_SECS
        );
        anyhow::ensure!(
            self.payment.sweep_interval_secs != Some(0),
            "payment.sweep_interval_secs must be positive when set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.verification_ttl(), chrono::Duration::seconds(180));
        assert_eq!(config.delivery.dhaka_charge, 60.0);
    }

    #[test]
    fn test_partial_override() {
        let config: EngineConfig = toml::from_str(
            r#"
            mailbox_size = 8

            [payment]
            verification_ttl_secs = 600

            [delivery]
            outside_dhaka_charge = 130.0
            "#,
        )
        .unwrap();
        assert_eq!(config.mailbox_size, 8);
        assert_eq!(config.payment.verification_ttl_secs, 600);
        assert_eq!(config.payment.sweep_interval_secs, Some(5));
        assert_eq!(config.delivery.outside_dhaka_charge, 130.0);
        assert_eq!(config.delivery.dhaka_charge, 60.0);
    }

    #[test]
    fn test_load_reports_bad_values() {
        let path = std::env::temp_dir().join(format!("storefront-config-{}.toml", std::process::id()));
        std::fs::write(&path, "mailbox_size = 0\n").unwrap();

        let err = EngineConfig::load(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("mailbox_size"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_oversized_ttl_is_refused() {
        let config: EngineConfig = toml::from_str(
            r#"
            [payment]
            verification_ttl_secs = 9223372036854775807
            "#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));

        // Built in code, the window still stays representable.
        assert_eq!(config.verification_ttl(), chrono::Duration::seconds(MAX_VERIFICATION_TTL_SECS));
        let edge = EngineConfig {
            payment: PaymentSettings {
                verification_ttl_secs: MAX_VERIFICATION_TTL_SECS,
                ..PaymentSettings::default()
            },
            ..EngineConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = EngineConfig::load("/nonexistent/storefront.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
