// =============================================================================
// Runtime Configuration — analysis parameters with atomic save
// =============================================================================
//
// Every tunable window and threshold of the analysis pipeline lives here and
// is injected into the components per request; there are no process-wide
// mutable singletons.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry serde defaults so that adding new fields never
// breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ma_short() -> usize {
    50
}

fn default_ma_long() -> usize {
    200
}

fn default_zscore_window() -> usize {
    20
}

fn default_momentum_window() -> usize {
    20
}

fn default_corr_window() -> usize {
    60
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_bb_period() -> usize {
    20
}

fn default_bb_std() -> f64 {
    2.0
}

fn default_advisory_model() -> String {
    "claude-haiku-4-5".to_string()
}

fn default_advisory_max_tokens() -> u32 {
    1024
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the PairLens engine.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Ratio / relative-performance windows --------------------------------

    /// Short simple moving average on the price ratio (trading days).
    #[serde(default = "default_ma_short")]
    pub ma_short: usize,

    /// Long simple moving average on the price ratio (trading days).
    #[serde(default = "default_ma_long")]
    pub ma_long: usize,

    /// Rolling window for the ratio z-score.
    #[serde(default = "default_zscore_window")]
    pub zscore_window: usize,

    /// Lookback for momentum (rate of change and slope fit).
    #[serde(default = "default_momentum_window")]
    pub momentum_window: usize,

    /// Rolling window for the pair correlation series.
    #[serde(default = "default_corr_window")]
    pub corr_window: usize,

    // --- Technical indicator parameters --------------------------------------

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_bb_period")]
    pub bb_period: usize,

    /// Bollinger band width in standard deviations.
    #[serde(default = "default_bb_std")]
    pub bb_std: f64,

    // --- Advisory service -----------------------------------------------------

    /// Model identifier sent to the advisory service.
    #[serde(default = "default_advisory_model")]
    pub advisory_model: String,

    #[serde(default = "default_advisory_max_tokens")]
    pub advisory_max_tokens: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ma_short: default_ma_short(),
            ma_long: default_ma_long(),
            zscore_window: default_zscore_window(),
            momentum_window: default_momentum_window(),
            corr_window: default_corr_window(),
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bb_period: default_bb_period(),
            bb_std: default_bb_std(),
            advisory_model: default_advisory_model(),
            advisory_max_tokens: default_advisory_max_tokens(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            ma_short = config.ma_short,
            ma_long = config.ma_long,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_windows() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.ma_short, 50);
        assert_eq!(cfg.ma_long, 200);
        assert_eq!(cfg.zscore_window, 20);
        assert_eq!(cfg.momentum_window, 20);
        assert_eq!(cfg.corr_window, 60);
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.macd_fast, 12);
        assert_eq!(cfg.macd_slow, 26);
        assert_eq!(cfg.macd_signal, 9);
        assert_eq!(cfg.bb_period, 20);
        assert!((cfg.bb_std - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.advisory_max_tokens, 1024);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.ma_short, 50);
        assert_eq!(cfg.rsi_period, 14);
        assert!(!cfg.advisory_model.is_empty());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "ma_short": 30, "bb_std": 2.5 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.ma_short, 30);
        assert!((cfg.bb_std - 2.5).abs() < f64::EPSILON);
        assert_eq!(cfg.ma_long, 200);
        assert_eq!(cfg.macd_signal, 9);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.ma_short, cfg2.ma_short);
        assert_eq!(cfg.advisory_model, cfg2.advisory_model);
        assert_eq!(cfg.corr_window, cfg2.corr_window);
    }
}
