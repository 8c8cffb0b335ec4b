//! Scored news events

use crate::error::ParseCategoryError;
use crate::time::EventTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Valid polarity scores, bearish to bullish
pub const POLARITY_RANGE: RangeInclusive<f64> = -1.0..=1.0;

/// False for NaN, infinities and anything outside `POLARITY_RANGE`
pub fn is_valid_polarity(polarity: f64) -> bool {
    POLARITY_RANGE.contains(&polarity)
}

/// Discrete sentiment label of a news article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Positive => "positive",
            SentimentCategory::Negative => "negative",
            SentimentCategory::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SentimentCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentCategory::Positive),
            "negative" => Ok(SentimentCategory::Negative),
            "neutral" => Ok(SentimentCategory::Neutral),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// Polarity cut-offs used to label an article
///
/// Both bounds are strict: a polarity exactly on a threshold is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityThresholds {
    #[serde(default = "default_positive_threshold")]
    pub positive: f64,

    #[serde(default = "default_negative_threshold")]
    pub negative: f64,
}

impl Default for PolarityThresholds {
    fn default() -> Self {
        Self {
            positive: default_positive_threshold(),
            negative: default_negative_threshold(),
        }
    }
}

fn default_positive_threshold() -> f64 {
    0.1
}

fn default_negative_threshold() -> f64 {
    -0.1
}

impl PolarityThresholds {
    pub fn new(positive: f64, negative: f64) -> Self {
        Self { positive, negative }
    }

    pub fn classify(&self, polarity: f64) -> SentimentCategory {
        if polarity > self.positive {
            SentimentCategory::Positive
        } else if polarity < self.negative {
            SentimentCategory::Negative
        } else {
            SentimentCategory::Neutral
        }
    }
}

/// A news article reduced to its timestamp, polarity and label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub timestamp: EventTime,
    pub polarity: f64, // -1.0 (bearish) to 1.0 (bullish)
    pub category: SentimentCategory,
}

impl NewsEvent {
    /// Create an event, labelling it from its polarity
    pub fn new(timestamp: EventTime, polarity: f64, thresholds: &PolarityThresholds) -> Self {
        Self {
            timestamp,
            polarity,
            category: thresholds.classify(polarity),
        }
    }

    /// Create an event with a label supplied by the collector
    pub fn with_category(timestamp: EventTime, polarity: f64, category: SentimentCategory) -> Self {
        Self {
            timestamp,
            polarity,
            category,
        }
    }
}
