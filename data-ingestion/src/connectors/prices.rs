use anyhow::{Context, Result};
use common::PriceFrame;
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::info;

/// Load a price table from a CSV file
///
/// Every column is kept as text and passed through to the output; only the
/// `timestamp` (or `time`) column has to exist.
pub fn load_price_csv<P: AsRef<Path>>(path: P) -> Result<PriceFrame> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open price file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read headers of {}", path.display()))?;
    let mut frame = PriceFrame::new(headers.iter().map(str::to_string).collect());

    let key = frame
        .timestamp_column()
        .with_context(|| format!("Invalid price file {}", path.display()))?;

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {} of {}", row, path.display()))?;
        frame
            .push_record(record.iter().map(str::to_string).collect())
            .with_context(|| format!("Invalid price file {}", path.display()))?;
    }

    info!(
        path = %path.display(),
        bars = frame.len(),
        key = %frame.columns()[key],
        "Loaded price bars"
    );

    Ok(frame)
}
