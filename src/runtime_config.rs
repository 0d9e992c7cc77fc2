// =============================================================================
// Runtime Configuration — Indicator settings with atomic save
// =============================================================================
//
// Central configuration for the Pulse indicator service.  Indicator windows
// can be changed at runtime through the settings endpoint without a restart.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::bollinger::{DEFAULT_BOLLINGER_K, DEFAULT_BOLLINGER_PERIOD};
use crate::indicators::macd::{DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW};
use crate::indicators::rsi::DEFAULT_RSI_PERIOD;

/// Largest window any indicator setting may use.
pub const MAX_PERIOD: usize = 10_000;

/// Environment variable that overrides `bind_addr` for one process.
pub const BIND_ADDR_ENV: &str = "PULSE_BIND_ADDR";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3002".to_string()
}

fn default_max_batch_size() -> usize {
    250
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_macd_fast() -> usize {
    DEFAULT_MACD_FAST
}

fn default_macd_slow() -> usize {
    DEFAULT_MACD_SLOW
}

fn default_macd_signal() -> usize {
    DEFAULT_MACD_SIGNAL
}

fn default_bollinger_period() -> usize {
    DEFAULT_BOLLINGER_PERIOD
}

fn default_bollinger_k() -> f64 {
    DEFAULT_BOLLINGER_K
}

// =============================================================================
// IndicatorSettings
// =============================================================================

/// Windows and thresholds passed into every report computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// RSI look-back (needs `rsi_period + 1` samples).
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// RSI at or above this value is labelled OVERBOUGHT.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    /// RSI at or below this value is labelled OVERSOLD.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Standard-deviation multiplier for the outer bands.
    #[serde(default = "default_bollinger_k")]
    pub bollinger_k: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bollinger_period: default_bollinger_period(),
            bollinger_k: default_bollinger_k(),
        }
    }
}

impl IndicatorSettings {
    /// Reject settings no series could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            bail!("rsi_period must be > 0");
        }
        if self.macd_fast == 0 || self.macd_slow == 0 || self.macd_signal == 0 {
            bail!("MACD periods must be > 0");
        }
        if self.macd_fast >= self.macd_slow {
            bail!(
                "macd_fast ({}) must be below macd_slow ({})",
                self.macd_fast,
                self.macd_slow
            );
        }
        if self.bollinger_period == 0 {
            bail!("bollinger_period must be > 0");
        }
        for (name, period) in [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
        ] {
            if period > MAX_PERIOD {
                bail!("{name} ({period}) must be <= {MAX_PERIOD}");
            }
        }
        if !self.bollinger_k.is_finite() || self.bollinger_k < 0.0 {
            bail!("bollinger_k must be a finite, non-negative number");
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            bail!(
                "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                self.rsi_oversold,
                self.rsi_overbought
            );
        }
        Ok(())
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the Pulse service.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Socket address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum number of instruments accepted in one batch request.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    #[serde(default)]
    pub settings: IndicatorSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_batch_size: default_max_batch_size(),
            settings: IndicatorSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid config in {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            rsi_period = config.settings.rsi_period,
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }

    /// Address to bind: `override_addr` (from `PULSE_BIND_ADDR`) when set,
    /// otherwise the configured one.  The override never touches `self`, so
    /// it is not written back by `save`.
    pub fn effective_bind_addr(&self, override_addr: Option<String>) -> String {
        override_addr.unwrap_or_else(|| self.bind_addr.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            bail!("max_batch_size must be > 0");
        }
        self.settings.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3002");
        assert_eq!(cfg.max_batch_size, 250);
        assert_eq!(cfg.settings.rsi_period, 14);
        assert_eq!(cfg.settings.macd_fast, 12);
        assert_eq!(cfg.settings.macd_slow, 26);
        assert_eq!(cfg.settings.macd_signal, 9);
        assert_eq!(cfg.settings.bollinger_period, 20);
        assert!((cfg.settings.bollinger_k - 2.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.settings, IndicatorSettings::default());
        assert_eq!(cfg.max_batch_size, 250);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "bind_addr": "127.0.0.1:9000", "settings": { "rsi_period": 7 } }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.settings.rsi_period, 7);
        assert_eq!(cfg.settings.macd_slow, 26);
    }

    #[test]
    fn validate_rejects_inverted_macd() {
        let settings = IndicatorSettings {
            macd_fast: 26,
            macd_slow: 12,
            ..IndicatorSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_periods_and_bad_k() {
        let zero_rsi = IndicatorSettings {
            rsi_period: 0,
            ..IndicatorSettings::default()
        };
        assert!(zero_rsi.validate().is_err());

        let bad_k = IndicatorSettings {
            bollinger_k: -1.0,
            ..IndicatorSettings::default()
        };
        assert!(bad_k.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_periods() {
        let at_cap = IndicatorSettings {
            rsi_period: MAX_PERIOD,
            ..IndicatorSettings::default()
        };
        assert!(at_cap.validate().is_ok());

        let huge_rsi = IndicatorSettings {
            rsi_period: MAX_PERIOD + 1,
            ..IndicatorSettings::default()
        };
        assert!(huge_rsi.validate().is_err());

        let huge_bollinger = IndicatorSettings {
            bollinger_period: usize::MAX,
            ..IndicatorSettings::default()
        };
        assert!(huge_bollinger.validate().is_err());

        let huge_signal = IndicatorSettings {
            macd_signal: usize::MAX,
            ..IndicatorSettings::default()
        };
        assert!(huge_signal.validate().is_err());
    }

    #[test]
    fn validate_rejects_crossed_thresholds() {
        let settings = IndicatorSettings {
            rsi_overbought: 30.0,
            rsi_oversold: 70.0,
            ..IndicatorSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("pulse-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pulse_config.json");

        let mut cfg = EngineConfig::default();
        cfg.settings.rsi_period = 21;
        cfg.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.settings.rsi_period, 21);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bind_override_is_not_persisted() {
        let dir = std::env::temp_dir().join(format!("pulse-bind-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pulse_config.json");

        let mut cfg = EngineConfig::default();
        cfg.bind_addr = "127.0.0.1:4000".to_string();
        let bound = cfg.effective_bind_addr(Some("127.0.0.1:5555".to_string()));
        assert_eq!(bound, "127.0.0.1:5555");
        assert_eq!(cfg.bind_addr, "127.0.0.1:4000");

        cfg.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.bind_addr, "127.0.0.1:4000");
        assert_eq!(loaded.effective_bind_addr(None), "127.0.0.1:4000");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(EngineConfig::load("/nonexistent/pulse_config.json").is_err());
    }
}
