use anyhow::{Context, Result};
use common::{is_valid_polarity, EventTime, InputSchemaError, NewsEvent, PolarityThresholds, SentimentCategory};
use csv::{ReaderBuilder, StringRecord, Trim};
use news_features::{bounded_polarity, LexiconClassifier, SentimentClassifier};
use std::path::Path;
use tracing::{debug, info, warn};

/// Column positions found in a news file header
#[derive(Debug, Clone, Copy)]
struct NewsColumns {
    timestamp: usize,
    polarity: Option<usize>,
    sentiment: Option<usize>,
    title: Option<usize>,
    description: Option<usize>,
}

impl NewsColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self, InputSchemaError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let columns = Self {
            timestamp: find("timestamp")
                .ok_or_else(|| InputSchemaError::MissingColumn("timestamp".to_string()))?,
            polarity: find("polarity"),
            sentiment: find("sentiment"),
            title: find("title"),
            description: find("description"),
        };

        if columns.polarity.is_none() && columns.title.is_none() {
            return Err(InputSchemaError::MissingColumn("polarity".to_string()));
        }

        Ok(columns)
    }
}

/// Load news events from a CSV file
///
/// Polarity comes from a `polarity` column when there is one; otherwise the
/// article text (`title` + `description`) is scored with `classifier`, or with
/// the default lexicon when none is given. A valid `sentiment` label is kept,
/// anything else is derived from `thresholds`. Rows with an unreadable
/// timestamp, a polarity outside [-1, 1], or text the classifier cannot score
/// are skipped.
pub fn load_news_csv<P: AsRef<Path>>(
    path: P,
    thresholds: &PolarityThresholds,
    classifier: Option<&dyn SentimentClassifier>,
) -> Result<Vec<NewsEvent>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open news file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read headers of {}", path.display()))?
        .clone();
    let columns = NewsColumns::from_headers(&headers)
        .with_context(|| format!("Invalid news file {}", path.display()))?;

    let fallback = LexiconClassifier::default();
    let classifier: &dyn SentimentClassifier = classifier.unwrap_or(&fallback);
    if columns.polarity.is_none() {
        info!(classifier = classifier.name(), "No polarity column, scoring article text");
    }

    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {} of {}", row, path.display()))?;

        match parse_row(&record, &columns, thresholds, classifier) {
            Ok(event) => events.push(event),
            Err(reason) => {
                warn!(row, %reason, "Skipping news row");
                skipped += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        events = events.len(),
        skipped,
        "Loaded news events"
    );

    Ok(events)
}

fn parse_row(
    record: &StringRecord,
    columns: &NewsColumns,
    thresholds: &PolarityThresholds,
    classifier: &dyn SentimentClassifier,
) -> Result<NewsEvent, String> {
    let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

    let timestamp = EventTime::parse(cell(Some(columns.timestamp))).map_err(|e| e.to_string())?;

    let polarity = match columns.polarity {
        Some(idx) => {
            let raw = cell(Some(idx));
            let value: f64 = raw
                .parse()
                .map_err(|_| format!("unparsable polarity {:?}", raw))?;
            if !is_valid_polarity(value) {
                return Err(format!("polarity {} outside [-1, 1]", value));
            }
            value
        }
        None => {
            let text = format!("{} {}", cell(columns.title), cell(columns.description));
            bounded_polarity(classifier.classify(text.trim()))
                .ok_or_else(|| format!("{} could not score the article", classifier.name()))?
        }
    };

    let label = cell(columns.sentiment);
    let event = match label.parse::<SentimentCategory>() {
        Ok(category) => NewsEvent::with_category(timestamp, polarity, category),
        Err(e) => {
            if !label.is_empty() {
                debug!(%e, "Ignoring sentiment label, using thresholds");
            }
            NewsEvent::new(timestamp, polarity, thresholds)
        }
    };

    Ok(event)
}
