//! Price tables
//!
//! The feature builders never interpret OHLCV values; they only need the key
//! column. Cells are therefore kept as the text the collector produced and
//! written back out unchanged.

use crate::error::InputSchemaError;
use crate::time::EventTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Fallback key column name used by raw terminal exports
pub const TIME_COLUMN: &str = "time";

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: EventTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Row-ordered price table with named columns
///
/// Records can only be added through `push_record`, so every record has one
/// cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceFrame {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl PriceFrame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Build a frame with the standard `timestamp,open,high,low,close,volume` layout
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        let columns = [TIMESTAMP_COLUMN, "open", "high", "low", "close", "volume"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        let records = bars
            .iter()
            .map(|bar| {
                vec![
                    bar.timestamp.to_string(),
                    bar.open.to_string(),
                    bar.high.to_string(),
                    bar.low.to_string(),
                    bar.close.to_string(),
                    bar.volume.to_string(),
                ]
            })
            .collect();

        Self { columns, records }
    }

    /// Append a record; it must have one cell per column
    pub fn push_record(&mut self, record: Vec<String>) -> Result<(), InputSchemaError> {
        if record.len() != self.columns.len() {
            return Err(InputSchemaError::RaggedRecord {
                row: self.records.len(),
                expected: self.columns.len(),
                found: record.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the key column: `timestamp`, else `time`
    pub fn timestamp_column(&self) -> Result<usize, InputSchemaError> {
        self.column_index(TIMESTAMP_COLUMN)
            .or_else(|| self.column_index(TIME_COLUMN))
            .ok_or_else(|| InputSchemaError::MissingColumn(TIMESTAMP_COLUMN.to_string()))
    }

    /// Parse the key column, one entry per row
    ///
    /// Unreadable cells become `None` so the row still gets an output; the
    /// caller decides what an unknown time means for it.
    pub fn timestamps(&self) -> Result<Vec<Option<EventTime>>, InputSchemaError> {
        let idx = self.timestamp_column()?;

        Ok(self
            .records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let raw = record.get(idx).map(String::as_str).unwrap_or("");
                match EventTime::parse(raw) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        warn!(row, raw, error = %e, "Unreadable price timestamp");
                        None
                    }
                }
            })
            .collect())
    }
}
