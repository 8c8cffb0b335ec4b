//! Trailing aggregation windows

use crate::error::FeatureError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Prefix shared by every news feature column
pub const COLUMN_PREFIX: &str = "news";

/// Length of a trailing window in whole hours, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WindowLength(u32);

impl WindowLength {
    pub fn new(hours: u32) -> Result<Self, FeatureError> {
        if hours == 0 {
            return Err(FeatureError::InvalidWindow(hours));
        }
        Ok(Self(hours))
    }

    pub fn hours(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(i64::from(self.0))
    }

    /// Column prefix for this window, e.g. `news_24h_`
    pub fn column_prefix(&self) -> String {
        format!("{}_{}h_", COLUMN_PREFIX, self.0)
    }

    pub fn column_name(&self, field: &str) -> String {
        format!("{}{}", self.column_prefix(), field)
    }
}

impl TryFrom<u32> for WindowLength {
    type Error = FeatureError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        WindowLength::new(hours)
    }
}

impl From<WindowLength> for u32 {
    fn from(window: WindowLength) -> Self {
        window.0
    }
}

impl fmt::Display for WindowLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

/// Validate a list of window lengths, keeping the given order
pub fn parse_windows(hours: &[u32]) -> Result<Vec<WindowLength>, FeatureError> {
    if hours.is_empty() {
        return Err(FeatureError::InvalidConfig(
            "at least one window length is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    hours
        .iter()
        .map(|&h| {
            if !seen.insert(h) {
                return Err(FeatureError::DuplicateWindow(h));
            }
            WindowLength::new(h)
        })
        .collect()
}
