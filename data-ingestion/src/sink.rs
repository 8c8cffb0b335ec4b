//! Feature frame writers

use anyhow::{bail, Context, Result};
use csv::Writer;
use news_features::FeatureFrame;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(OutputFormat::Csv),
            Some("json") => Ok(OutputFormat::Json),
            other => bail!("Unsupported output extension {:?} for {}", other, path.display()),
        }
    }

    pub fn write(&self, frame: &FeatureFrame, path: &Path) -> Result<()> {
        match self {
            OutputFormat::Csv => write_csv(frame, path),
            OutputFormat::Json => write_json(frame, path),
        }
    }
}

/// Write the frame as CSV; undefined values become empty cells
pub fn write_csv<P: AsRef<Path>>(frame: &FeatureFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(frame.column_names())?;
    for row in 0..frame.row_count() {
        writer.write_record(frame.row(row))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = frame.row_count(), columns = frame.column_count(), "Wrote CSV");
    Ok(())
}

/// Write the frame as a JSON array of row objects
///
/// Price cells stay strings; features are numbers, or `null` when undefined.
pub fn write_json<P: AsRef<Path>>(frame: &FeatureFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    let base = frame.base();
    let feature_names = frame.feature_names();

    let rows = (0..frame.row_count())
        .map(|row| -> Result<Value, serde_json::Error> {
            let mut object = Map::with_capacity(frame.column_count());
            for (name, cell) in base.columns().iter().zip(&base.records()[row]) {
                object.insert(name.clone(), Value::String(cell.clone()));
            }
            for (name, value) in feature_names.iter().zip(frame.feature_row(row)) {
                object.insert(name.clone(), serde_json::to_value(value)?);
            }
            Ok(Value::Object(object))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Wrote JSON");
    Ok(())
}
