//! Multi-window sentiment feature builder

use crate::aggregator::EventIndex;
use crate::error::FeatureError;
use crate::frame::{FeatureFrame, WindowFeatures};
use crate::window::{parse_windows, WindowLength};
use common::{NewsEvent, PriceFrame};
use tracing::{debug, info};

/// Joins a news stream onto price rows for a set of trailing windows
#[derive(Debug, Clone)]
pub struct MultiWindowBuilder {
    windows: Vec<WindowLength>,
}

impl MultiWindowBuilder {
    pub fn new(hours: &[u32]) -> Result<Self, FeatureError> {
        Ok(Self {
            windows: parse_windows(hours)?,
        })
    }

    pub fn windows(&self) -> &[WindowLength] {
        &self.windows
    }

    /// One snapshot per (row, window), appended as `news_{h}h_*` columns
    ///
    /// Fails only when the price table has no timestamp column. Rows whose
    /// timestamp cannot be read get empty snapshots.
    pub fn build(&self, prices: &PriceFrame, events: &[NewsEvent]) -> Result<FeatureFrame, FeatureError> {
        let timestamps = prices.timestamps()?;
        let index = EventIndex::new(events);

        info!(
            rows = prices.len(),
            events = index.len(),
            windows = self.windows.len(),
            "Adding sentiment features"
        );

        let mut frame = FeatureFrame::new(prices.clone(), timestamps);

        for &window in &self.windows {
            let snapshots = frame
                .timestamps()
                .iter()
                .map(|ts| index.snapshot(ts.as_ref(), window))
                .collect();

            debug!(window = %window, "Processed window");
            frame.push_window(WindowFeatures::new(window, snapshots));
        }

        info!(
            columns = frame.column_count(),
            "Added sentiment features for {} windows",
            self.windows.len()
        );

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{SentimentSnapshot, SNAPSHOT_FIELDS};
    use crate::frame::FeatureValue;
    use crate::momentum::DEFAULT_TREND_PERIOD;
    use crate::time_features::TIME_FEATURE_COLUMNS;
    use common::{EventTime, InputSchemaError, PolarityThresholds};

    fn prices(timestamps: &[&str]) -> PriceFrame {
        let mut frame = PriceFrame::new(vec![
            "timestamp".to_string(),
            "close".to_string(),
        ]);
        for (i, ts) in timestamps.iter().enumerate() {
            frame
                .push_record(vec![ts.to_string(), format!("{}", 2050 + i)])
                .unwrap();
        }
        frame
    }

    fn quarter_hours(count: usize) -> PriceFrame {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let stamps: Vec<String> = (0..count)
            .map(|i| {
                (start + chrono::Duration::minutes(15 * i as i64))
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .collect();
        let refs: Vec<&str> = stamps.iter().map(|s| s.as_str()).collect();
        prices(&refs)
    }

    fn events() -> Vec<NewsEvent> {
        let thresholds = PolarityThresholds::default();
        [
            ("2024-01-01 00:10:00", 0.6),
            ("2024-01-01 01:00:00", -0.3),
            ("2024-01-01 02:45:00", 0.05),
            ("2023-12-31 20:00:00", -0.8),
            ("2024-01-01 05:30:00", 0.2),
        ]
        .iter()
        .map(|(ts, p)| NewsEvent::new(EventTime::parse(ts).unwrap(), *p, &thresholds))
        .collect()
    }

    #[test]
    fn test_row_and_column_counts() {
        let builder = MultiWindowBuilder::new(&[1, 4, 12, 24, 48]).unwrap();
        let frame = builder.build(&quarter_hours(40), &events()).unwrap();

        assert_eq!(frame.row_count(), 40);
        assert_eq!(frame.column_count(), 2 + 11 * 5);
        assert_eq!(frame.column_names().len(), frame.column_count());
        assert_eq!(frame.row(7).len(), frame.column_count());
    }

    #[test]
    fn test_column_names_prefixed_by_window() {
        let builder = MultiWindowBuilder::new(&[4, 24]).unwrap();
        let frame = builder.build(&quarter_hours(2), &events()).unwrap();
        let names = frame.column_names();

        assert_eq!(names[0], "timestamp");
        assert_eq!(names[2], "news_4h_news_count");
        assert_eq!(names[12], "news_4h_negative_ratio");
        assert_eq!(names[13], "news_24h_news_count");
        for field in SNAPSHOT_FIELDS {
            assert!(names.contains(&format!("news_24h_{field}")));
        }
    }

    #[test]
    fn test_price_cells_pass_through() {
        let input = quarter_hours(5);
        let builder = MultiWindowBuilder::new(&[1]).unwrap();
        let frame = builder.build(&input, &events()).unwrap();

        for (i, record) in input.records().iter().enumerate() {
            assert_eq!(&frame.row(i)[..2], record.as_slice());
        }
    }

    #[test]
    fn test_empty_event_source() {
        let builder = MultiWindowBuilder::new(&[1, 24]).unwrap();
        let frame = builder.build(&quarter_hours(12), &[]).unwrap();

        assert_eq!(frame.row_count(), 12);
        for window in frame.windows() {
            assert!(window.snapshots.iter().all(|s| *s == SentimentSnapshot::empty()));
        }
    }

    #[test]
    fn test_tally_and_span_invariants() {
        let builder = MultiWindowBuilder::new(&[1, 4, 12]).unwrap();
        let frame = builder.build(&quarter_hours(30), &events()).unwrap();

        for window in frame.windows() {
            for s in &window.snapshots {
                assert_eq!(s.positive_count + s.negative_count + s.neutral_count, s.news_count);
                assert!((0.0..=1.0).contains(&s.positive_ratio));
                assert!((0.0..=1.0).contains(&s.negative_ratio));
                if s.news_count > 0 {
                    assert!(s.sentiment_min <= s.sentiment_avg && s.sentiment_avg <= s.sentiment_max);
                }
            }
        }
    }

    #[test]
    fn test_window_contents() {
        let builder = MultiWindowBuilder::new(&[1, 12]).unwrap();
        let frame = builder.build(&prices(&["2024-01-01 01:00:00"]), &events()).unwrap();

        // (00:00, 01:00] holds the 00:10 and 01:00 articles
        let one_hour = &frame.window(1).unwrap().snapshots[0];
        assert_eq!(one_hour.news_count, 2);
        assert_eq!(one_hour.positive_count, 1);
        assert_eq!(one_hour.negative_count, 1);

        // (13:00 previous day, 01:00] also holds the 20:00 article
        let twelve_hours = &frame.window(12).unwrap().snapshots[0];
        assert_eq!(twelve_hours.news_count, 3);
        assert_eq!(twelve_hours.sentiment_min, -0.8);
    }

    #[test]
    fn test_missing_timestamp_column_is_fatal() {
        let mut input = PriceFrame::new(vec!["open".to_string(), "close".to_string()]);
        input.push_record(vec!["1".to_string(), "2".to_string()]).unwrap();

        let builder = MultiWindowBuilder::new(&[24]).unwrap();
        let err = builder.build(&input, &events()).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::Schema(InputSchemaError::MissingColumn(ref c)) if c == "timestamp"
        ));
    }

    #[test]
    fn test_time_column_accepted() {
        let mut input = PriceFrame::new(vec!["time".to_string(), "close".to_string()]);
        input
            .push_record(vec!["2024-01-01 01:00:00".to_string(), "2050".to_string()])
            .unwrap();

        let builder = MultiWindowBuilder::new(&[1]).unwrap();
        let frame = builder.build(&input, &events()).unwrap();
        assert_eq!(frame.window(1).unwrap().snapshots[0].news_count, 2);
    }

    #[test]
    fn test_bad_row_timestamp_falls_back_to_defaults() {
        let input = prices(&["2024-01-01 01:00:00", "garbage", "2024-01-01 02:00:00"]);
        let builder = MultiWindowBuilder::new(&[4]).unwrap();
        let frame = builder.build(&input, &events()).unwrap();

        assert_eq!(frame.row_count(), 3);
        let snapshots = &frame.window(4).unwrap().snapshots;
        assert!(snapshots[0].news_count > 0);
        assert_eq!(snapshots[1], SentimentSnapshot::empty());
        assert!(snapshots[2].news_count > 0);
    }

    #[test]
    fn test_unconfigured_momentum_window_is_noop() {
        let builder = MultiWindowBuilder::new(&[4]).unwrap();
        let mut frame = builder.build(&quarter_hours(6), &events()).unwrap();
        let before = frame.clone();

        assert!(!frame.add_sentiment_momentum(24, DEFAULT_TREND_PERIOD));
        assert_eq!(frame, before);
    }

    #[test]
    fn test_momentum_columns() {
        let builder = MultiWindowBuilder::new(&[4]).unwrap();
        let mut frame = builder.build(&quarter_hours(6), &events()).unwrap();

        assert!(frame.add_sentiment_momentum(4, DEFAULT_TREND_PERIOD));
        assert_eq!(frame.column_count(), 2 + 11 + 3);

        let momentum = frame.feature_column("news_4h_sentiment_momentum").unwrap();
        assert!(momentum[0].is_missing());
        assert!(!momentum[1].is_missing());

        let acceleration = frame.feature_column("news_4h_sentiment_acceleration").unwrap();
        assert!(acceleration[0].is_missing() && acceleration[1].is_missing());

        let trend = frame.feature_column("news_4h_sentiment_trend").unwrap();
        let avg = frame.feature_column("news_4h_sentiment_avg").unwrap();
        assert_eq!(trend[0], avg[0]);
        assert_eq!(frame.row(0).last().map(String::as_str), Some(""));
    }

    #[test]
    fn test_momentum_is_idempotent() {
        let builder = MultiWindowBuilder::new(&[4]).unwrap();
        let mut frame = builder.build(&quarter_hours(6), &events()).unwrap();
        frame.add_sentiment_momentum(4, DEFAULT_TREND_PERIOD);
        let once = frame.clone();
        frame.add_sentiment_momentum(4, DEFAULT_TREND_PERIOD);
        assert_eq!(frame, once);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = MultiWindowBuilder::new(&[1, 4, 24]).unwrap();
        let input = quarter_hours(25);
        let first = builder.build(&input, &events()).unwrap();
        let second = builder.build(&input, &events()).unwrap();

        let render = |frame: &FeatureFrame| -> Vec<Vec<String>> {
            (0..frame.row_count()).map(|i| frame.row(i)).collect()
        };
        assert_eq!(render(&first), render(&second));
    }

    #[test]
    fn test_time_features_appended() {
        let builder = MultiWindowBuilder::new(&[1]).unwrap();
        let mut frame = builder.build(&prices(&["2024-01-01 14:00:00", "bad"]), &[]).unwrap();
        frame.add_time_features();

        assert_eq!(frame.column_count(), 2 + 11 + TIME_FEATURE_COLUMNS.len());
        let hour = frame.feature_column("hour").unwrap();
        assert_eq!(hour[0], FeatureValue::Integer(14));
        assert!(hour[1].is_missing());
    }
}
