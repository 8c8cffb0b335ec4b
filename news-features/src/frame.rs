//! Feature frames: the price table plus the columns derived from it
//!
//! Feature columns are joined to the price rows by position. Every column
//! holds exactly one value per input row.

use crate::aggregator::{SentimentSnapshot, SNAPSHOT_FIELDS};
use crate::momentum::DerivedSeries;
use crate::technical::{Ohlcv, TechnicalIndicators};
use crate::time_features::{TimeFeatures, TIME_FEATURE_COLUMNS};
use crate::window::WindowLength;
use common::{EventTime, PriceFrame};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// A single feature cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Integer(i64),
    Number(f64),
    /// Not computable yet (e.g. the first momentum value)
    Missing,
}

impl FeatureValue {
    pub fn from_count(count: usize) -> Self {
        FeatureValue::Integer(count as i64)
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Missing, FeatureValue::Number)
    }

    /// NaN and infinities become `Missing`
    pub fn from_finite(value: f64) -> Self {
        if value.is_finite() {
            FeatureValue::Number(value)
        } else {
            FeatureValue::Missing
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

/// Missing values render as an empty cell
impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(v) => write!(f, "{}", v),
            FeatureValue::Number(v) => write!(f, "{}", v),
            FeatureValue::Missing => Ok(()),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Integer(v) => serializer.serialize_i64(*v),
            FeatureValue::Number(v) if v.is_finite() => serializer.serialize_f64(*v),
            _ => serializer.serialize_none(),
        }
    }
}

/// Named feature column appended after the window snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<FeatureValue>,
}

/// Snapshots of one window, one per price row
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFeatures {
    pub window: WindowLength,
    pub snapshots: Vec<SentimentSnapshot>,
}

impl WindowFeatures {
    pub fn new(window: WindowLength, snapshots: Vec<SentimentSnapshot>) -> Self {
        Self { window, snapshots }
    }

    pub fn sentiment_avg(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.sentiment_avg).collect()
    }

    pub fn column_names(&self) -> impl Iterator<Item = String> + '_ {
        SNAPSHOT_FIELDS.iter().map(|field| self.window.column_name(field))
    }
}

/// Price rows with sentiment, momentum and time feature columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    base: PriceFrame,
    timestamps: Vec<Option<EventTime>>,
    windows: Vec<WindowFeatures>,
    appended: Vec<FeatureColumn>,
}

impl FeatureFrame {
    pub(crate) fn new(base: PriceFrame, timestamps: Vec<Option<EventTime>>) -> Self {
        Self {
            base,
            timestamps,
            windows: Vec::new(),
            appended: Vec::new(),
        }
    }

    pub(crate) fn push_window(&mut self, features: WindowFeatures) {
        debug_assert_eq!(features.snapshots.len(), self.row_count());
        self.windows.push(features);
    }

    /// Append a column, replacing any existing column with the same name
    pub(crate) fn set_column(&mut self, column: FeatureColumn) {
        debug_assert_eq!(column.values.len(), self.row_count());
        match self.appended.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.appended.push(column),
        }
    }

    pub fn base(&self) -> &PriceFrame {
        &self.base
    }

    pub fn timestamps(&self) -> &[Option<EventTime>] {
        &self.timestamps
    }

    pub fn windows(&self) -> &[WindowFeatures] {
        &self.windows
    }

    pub fn window(&self, hours: u32) -> Option<&WindowFeatures> {
        self.windows.iter().find(|w| w.window.hours() == hours)
    }

    pub fn row_count(&self) -> usize {
        self.base.len()
    }

    pub fn column_count(&self) -> usize {
        self.base.columns().len() + self.feature_count()
    }

    /// Number of columns added on top of the price table
    pub fn feature_count(&self) -> usize {
        self.windows.len() * SNAPSHOT_FIELDS.len() + self.appended.len()
    }

    /// Names of the added columns, in output order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.feature_count());
        for window in &self.windows {
            names.extend(window.column_names());
        }
        names.extend(self.appended.iter().map(|c| c.name.clone()));
        names
    }

    /// Price columns followed by feature columns
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.base.columns().to_vec();
        names.extend(self.feature_names());
        names
    }

    /// Added values of one row, aligned with `feature_names`
    pub fn feature_row(&self, row: usize) -> Vec<FeatureValue> {
        let mut values = Vec::with_capacity(self.feature_count());
        for window in &self.windows {
            values.extend(window.snapshots[row].values());
        }
        values.extend(self.appended.iter().map(|c| c.values[row]));
        values
    }

    /// Fully rendered row: price cells untouched, features formatted
    pub fn row(&self, row: usize) -> Vec<String> {
        let mut cells = self.base.records()[row].clone();
        cells.extend(self.feature_row(row).iter().map(|v| v.to_string()));
        cells
    }

    /// All values of a named feature column
    pub fn feature_column(&self, name: &str) -> Option<Vec<FeatureValue>> {
        if let Some(column) = self.appended.iter().find(|c| c.name == name) {
            return Some(column.values.clone());
        }

        for window in &self.windows {
            if let Some(field) = SNAPSHOT_FIELDS
                .iter()
                .position(|f| window.window.column_name(f) == name)
            {
                return Some(window.snapshots.iter().map(|s| s.values()[field]).collect());
            }
        }

        None
    }

    /// Attach momentum, trend and acceleration for one window
    ///
    /// Returns false and leaves the frame untouched when the window was not
    /// aggregated.
    pub fn add_sentiment_momentum(&mut self, window_hours: u32, trend_period: usize) -> bool {
        let Some(features) = self.window(window_hours) else {
            warn!(
                window_hours,
                "Column news_{}h_sentiment_avg not found, skipping momentum", window_hours
            );
            return false;
        };

        let window = features.window;
        let derived = DerivedSeries::from_averages(&features.sentiment_avg(), trend_period);

        self.set_column(FeatureColumn {
            name: window.column_name("sentiment_momentum"),
            values: derived.momentum.iter().copied().map(FeatureValue::from_option).collect(),
        });
        self.set_column(FeatureColumn {
            name: window.column_name("sentiment_trend"),
            values: derived.trend.iter().copied().map(FeatureValue::Number).collect(),
        });
        self.set_column(FeatureColumn {
            name: window.column_name("sentiment_acceleration"),
            values: derived.acceleration.iter().copied().map(FeatureValue::from_option).collect(),
        });

        debug!(window = %window, "Added sentiment momentum");
        true
    }

    /// Attach calendar, session and cyclical time columns
    pub fn add_time_features(&mut self) {
        let rows: Vec<Option<TimeFeatures>> = self
            .timestamps
            .iter()
            .map(|ts| ts.as_ref().map(TimeFeatures::from_event_time))
            .collect();

        for (idx, name) in TIME_FEATURE_COLUMNS.iter().enumerate() {
            let values = rows
                .iter()
                .map(|row| match row {
                    Some(features) => features.values()[idx],
                    None => FeatureValue::Missing,
                })
                .collect();
            self.set_column(FeatureColumn {
                name: name.to_string(),
                values,
            });
        }

        debug!(columns = TIME_FEATURE_COLUMNS.len(), "Added time features");
    }

    /// Attach moving averages, oscillators and volatility bands over the
    /// price columns
    ///
    /// Returns false and leaves the frame untouched when `open`, `high`,
    /// `low` or `close` is missing.
    pub fn add_technical_indicators(&mut self) -> bool {
        let data = match Ohlcv::from_frame(&self.base) {
            Ok(data) => data,
            Err(e) => {
                warn!(%e, "Skipping technical indicators");
                return false;
            }
        };

        let columns = TechnicalIndicators::all(&data);
        let count = columns.len();
        for (name, values) in columns {
            self.set_column(FeatureColumn {
                name,
                values: values.into_iter().map(FeatureValue::from_finite).collect(),
            });
        }

        debug!(columns = count, "Added technical indicators");
        true
    }
}
