//! Feature builder configuration

use crate::error::FeatureError;
use crate::momentum::DEFAULT_TREND_PERIOD;
use crate::window::{parse_windows, WindowLength};
use anyhow::Context;
use common::PolarityThresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables prefixed with this override file values,
/// e.g. `NEWS_FEATURES_TREND_PERIOD=20` or `NEWS_FEATURES_THRESHOLDS__POSITIVE=0.2`
pub const ENV_PREFIX: &str = "NEWS_FEATURES";

/// Overall feature configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window lengths in hours
    #[serde(default = "default_windows")]
    pub windows: Vec<u32>,

    /// Rows averaged by the sentiment trend
    #[serde(default = "default_trend_period")]
    pub trend_period: usize,

    /// Windows that get momentum/trend/acceleration columns (default: all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub momentum_windows: Option<Vec<u32>>,

    /// Append calendar and trading-session columns
    #[serde(default)]
    pub time_features: bool,

    /// Append moving average, oscillator and volatility columns computed
    /// from the price table's OHLCV columns
    #[serde(default)]
    pub technical_indicators: bool,

    /// Polarity cut-offs for labelling articles
    #[serde(default)]
    pub thresholds: PolarityThresholds,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            trend_period: DEFAULT_TREND_PERIOD,
            momentum_windows: None,
            time_features: false,
            technical_indicators: false,
            thresholds: PolarityThresholds::default(),
        }
    }
}

fn default_windows() -> Vec<u32> {
    vec![1, 4, 12, 24, 48]
}

fn default_trend_period() -> usize {
    DEFAULT_TREND_PERIOD
}

impl FeatureConfig {
    pub fn window_lengths(&self) -> Result<Vec<WindowLength>, FeatureError> {
        parse_windows(&self.windows)
    }

    pub fn momentum_window_hours(&self) -> Vec<u32> {
        self.momentum_windows
            .clone()
            .unwrap_or_else(|| self.windows.clone())
    }

    /// Momentum windows are not checked against `windows`; an unknown one is
    /// skipped at run time.
    pub fn validate(&self) -> Result<(), FeatureError> {
        self.window_lengths()?;

        if self.trend_period == 0 {
            return Err(FeatureError::InvalidConfig(
                "trend_period must be at least 1".to_string(),
            ));
        }

        let t = &self.thresholds;
        if !(t.negative.is_finite() && t.positive.is_finite()) || t.negative > t.positive {
            return Err(FeatureError::InvalidConfig(format!(
                "thresholds must satisfy negative <= positive, got {} / {}",
                t.negative, t.positive
            )));
        }

        Ok(())
    }
}

/// Load configuration from a TOML file, with environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<FeatureConfig> {
    let path = path.as_ref();
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("windows")
                .with_list_parse_key("momentum_windows"),
        )
        .build()
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    let config: FeatureConfig = settings
        .try_deserialize()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config<P: AsRef<Path>>(config: &FeatureConfig, path: P) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write a commented default configuration file
pub fn create_config_template<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let template = "# News sentiment feature configuration

# Trailing window lengths (hours); one block of 11 columns per window
windows = [1, 4, 12, 24, 48]

# Rows averaged by news_<w>h_sentiment_trend
trend_period = 10

# Windows that get momentum/trend/acceleration columns (default: all)
# momentum_windows = [24]

# Append calendar and trading-session columns
time_features = false

# Append SMA/EMA, MACD, RSI, stochastic, Bollinger and ATR columns
# (needs open, high, low and close price columns)
technical_indicators = false

[thresholds]
# polarity > positive is positive, polarity < negative is negative
positive = 0.1
negative = -0.1
";

    std::fs::write(path, template)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.windows, vec![1, 4, 12, 24, 48]);
        assert_eq!(config.trend_period, 10);
        assert_eq!(config.momentum_window_hours(), config.windows);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = FeatureConfig {
            momentum_windows: Some(vec![24]),
            ..Default::default()
        };
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: FeatureConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FeatureConfig = toml::from_str("windows = [2, 6]").unwrap();
        assert_eq!(config.windows, vec![2, 6]);
        assert_eq!(config.trend_period, 10);
        assert!(!config.technical_indicators);
        assert_eq!(config.thresholds, PolarityThresholds::default());
    }

    #[test]
    fn test_validation() {
        let config = FeatureConfig {
            windows: vec![0, 4],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FeatureError::InvalidWindow(0))));

        let config = FeatureConfig {
            trend_period: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FeatureError::InvalidConfig(_))));

        let config = FeatureConfig {
            thresholds: PolarityThresholds::new(-0.2, 0.2),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FeatureError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.toml");
        create_config_template(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config, FeatureConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.toml");
        let config = FeatureConfig {
            windows: vec![6, 72],
            time_features: true,
            technical_indicators: true,
            ..Default::default()
        };
        save_config(&config, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }
}
