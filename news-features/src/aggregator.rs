//! Trailing-window sentiment aggregation
//!
//! Events are normalized and sorted once; each query then binary-searches the
//! half-open interval `(t - window, t]` and summarizes the slice it finds.

use crate::frame::FeatureValue;
use crate::timestamp::StreamAwareness;
use crate::window::WindowLength;
use chrono::NaiveDateTime;
use common::{is_valid_polarity, EventTime, NewsEvent, SentimentCategory};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

/// Snapshot fields in column order
pub const SNAPSHOT_FIELDS: [&str; 11] = [
    "news_count",
    "sentiment_avg",
    "sentiment_sum",
    "sentiment_max",
    "sentiment_min",
    "sentiment_std",
    "positive_count",
    "negative_count",
    "neutral_count",
    "positive_ratio",
    "negative_ratio",
];

/// Sentiment statistics for one (row, window) pair
///
/// An empty window reports zeros everywhere, so "no news" and "perfectly
/// neutral news" look the same downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub news_count: usize,
    pub sentiment_avg: f64,
    pub sentiment_sum: f64,
    pub sentiment_max: f64,
    pub sentiment_min: f64,
    pub sentiment_std: f64, // sample std, 0.0 for a single event
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
}

impl SentimentSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_events(events: &[IndexedEvent]) -> Self {
        if events.is_empty() {
            return Self::empty();
        }

        let news_count = events.len();
        let polarities: Vec<f64> = events.iter().map(|e| e.polarity).collect();

        let sentiment_sum: f64 = polarities.iter().sum();
        let sentiment_max = polarities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sentiment_min = polarities.iter().copied().fold(f64::INFINITY, f64::min);
        // Rounding can push the mean a ulp outside the observed range
        let mean = polarities.iter().mean();
        let sentiment_avg = if sentiment_min <= sentiment_max {
            mean.clamp(sentiment_min, sentiment_max)
        } else {
            mean
        };
        let sentiment_std = if news_count > 1 {
            polarities.iter().std_dev()
        } else {
            0.0
        };

        let mut positive_count = 0;
        let mut negative_count = 0;
        let mut neutral_count = 0;
        for event in events {
            match event.category {
                SentimentCategory::Positive => positive_count += 1,
                SentimentCategory::Negative => negative_count += 1,
                SentimentCategory::Neutral => neutral_count += 1,
            }
        }

        Self {
            news_count,
            sentiment_avg,
            sentiment_sum,
            sentiment_max,
            sentiment_min,
            sentiment_std,
            positive_count,
            negative_count,
            neutral_count,
            positive_ratio: positive_count as f64 / news_count as f64,
            negative_ratio: negative_count as f64 / news_count as f64,
        }
    }

    /// Values in `SNAPSHOT_FIELDS` order
    pub fn values(&self) -> [FeatureValue; 11] {
        [
            FeatureValue::from_count(self.news_count),
            FeatureValue::Number(self.sentiment_avg),
            FeatureValue::Number(self.sentiment_sum),
            FeatureValue::Number(self.sentiment_max),
            FeatureValue::Number(self.sentiment_min),
            FeatureValue::Number(self.sentiment_std),
            FeatureValue::from_count(self.positive_count),
            FeatureValue::from_count(self.negative_count),
            FeatureValue::from_count(self.neutral_count),
            FeatureValue::Number(self.positive_ratio),
            FeatureValue::Number(self.negative_ratio),
        ]
    }
}

#[derive(Debug, Clone)]
struct IndexedEvent {
    key: NaiveDateTime,
    polarity: f64,
    category: SentimentCategory,
}

/// News events sorted on the normalized time axis
#[derive(Debug, Clone)]
pub struct EventIndex {
    events: Vec<IndexedEvent>,
    awareness: StreamAwareness,
}

impl EventIndex {
    pub fn new(events: &[NewsEvent]) -> Self {
        let awareness = StreamAwareness::of(events);

        if awareness == StreamAwareness::Aware {
            let naive = events.iter().filter(|e| !e.timestamp.is_aware()).count();
            if naive > 0 {
                warn!(naive, total = events.len(), "Mixed timezone awareness in news stream, reading naive events as UTC");
            }
        }

        let invalid = events.iter().filter(|e| !is_valid_polarity(e.polarity)).count();
        if invalid > 0 {
            warn!(invalid, total = events.len(), "Dropping news events with polarity outside [-1, 1]");
        }

        let mut indexed: Vec<IndexedEvent> = events
            .iter()
            .filter(|e| is_valid_polarity(e.polarity))
            .map(|e| IndexedEvent {
                key: awareness.event_key(&e.timestamp),
                polarity: e.polarity,
                category: e.category,
            })
            .collect();
        indexed.sort_by_key(|e| e.key);

        debug!(events = indexed.len(), ?awareness, "Built news event index");

        Self {
            events: indexed,
            awareness,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn awareness(&self) -> StreamAwareness {
        self.awareness
    }

    /// Events with `start < key <= end`
    fn slice(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[IndexedEvent] {
        let lo = self.events.partition_point(|e| e.key <= start);
        let hi = self.events.partition_point(|e| e.key <= end);
        &self.events[lo..hi.max(lo)]
    }

    #[cfg(test)]
    fn count_in_window(&self, query: &EventTime, window: WindowLength) -> usize {
        let end = self.awareness.query_key(query);
        match end.checked_sub_signed(window.duration()) {
            Some(start) => self.slice(start, end).len(),
            None => 0,
        }
    }

    /// Aggregate the window ending at `query`
    ///
    /// A row without a usable timestamp gets the empty snapshot.
    pub fn snapshot(&self, query: Option<&EventTime>, window: WindowLength) -> SentimentSnapshot {
        let Some(query) = query else {
            return SentimentSnapshot::empty();
        };

        let end = self.awareness.query_key(query);
        let Some(start) = end.checked_sub_signed(window.duration()) else {
            warn!(query = %query, window = %window, "Window start out of range, using empty snapshot");
            return SentimentSnapshot::empty();
        };

        SentimentSnapshot::from_events(self.slice(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PolarityThresholds;

    fn event(raw: &str, polarity: f64) -> NewsEvent {
        NewsEvent::new(EventTime::parse(raw).unwrap(), polarity, &PolarityThresholds::default())
    }

    fn ts(raw: &str) -> EventTime {
        EventTime::parse(raw).unwrap()
    }

    fn hours(h: u32) -> WindowLength {
        WindowLength::new(h).unwrap()
    }

    #[test]
    fn test_empty_index_gives_defaults() {
        let index = EventIndex::new(&[]);
        let snapshot = index.snapshot(Some(&ts("2024-01-01 12:00:00")), hours(24));
        assert_eq!(snapshot, SentimentSnapshot::empty());
        assert_eq!(snapshot.sentiment_avg, 0.0);
        assert_eq!(snapshot.positive_ratio, 0.0);
    }

    #[test]
    fn test_missing_query_gives_defaults() {
        let index = EventIndex::new(&[event("2024-01-01 11:00:00", 0.8)]);
        assert_eq!(index.snapshot(None, hours(4)), SentimentSnapshot::empty());
    }

    #[test]
    fn test_window_boundaries() {
        let index = EventIndex::new(&[
            event("2024-01-01 08:00:00", 0.9),  // exactly t - 4h: excluded
            event("2024-01-01 08:00:01", 0.2),
            event("2024-01-01 12:00:00", -0.4), // exactly t: included
            event("2024-01-01 12:00:01", 0.7),  // after t: excluded
        ]);

        let snapshot = index.snapshot(Some(&ts("2024-01-01 12:00:00")), hours(4));
        assert_eq!(snapshot.news_count, 2);
        assert_eq!(snapshot.sentiment_max, 0.2);
        assert_eq!(snapshot.sentiment_min, -0.4);
        assert_eq!(snapshot.positive_count, 1);
        assert_eq!(snapshot.negative_count, 1);
    }

    #[test]
    fn test_statistics() {
        let index = EventIndex::new(&[
            event("2024-01-01 10:00:00", 0.5),
            event("2024-01-01 09:00:00", 0.1),
            event("2024-01-01 11:00:00", -0.3),
        ]);

        let snapshot = index.snapshot(Some(&ts("2024-01-01 12:00:00")), hours(24));
        assert_eq!(snapshot.news_count, 3);
        assert!((snapshot.sentiment_sum - 0.3).abs() < 1e-12);
        assert!((snapshot.sentiment_avg - 0.1).abs() < 1e-12);
        assert!((snapshot.sentiment_std - 0.4).abs() < 1e-12);
        assert_eq!(snapshot.positive_count, 1);
        assert_eq!(snapshot.negative_count, 1);
        assert_eq!(snapshot.neutral_count, 1);
        assert!((snapshot.positive_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_event_has_zero_std() {
        let index = EventIndex::new(&[event("2024-01-01 10:00:00", 0.6)]);
        let snapshot = index.snapshot(Some(&ts("2024-01-01 10:30:00")), hours(1));
        assert_eq!(snapshot.news_count, 1);
        assert_eq!(snapshot.sentiment_std, 0.0);
        assert_eq!(snapshot.sentiment_avg, 0.6);
        assert_eq!(snapshot.positive_ratio, 1.0);
    }

    #[test]
    fn test_equal_polarities_stay_within_range() {
        let events: Vec<NewsEvent> = (0..7)
            .map(|i| event(&format!("2024-01-01 0{}:00:00", i), 0.1))
            .collect();
        let index = EventIndex::new(&events);
        let snapshot = index.snapshot(Some(&ts("2024-01-01 08:00:00")), hours(24));
        assert!(snapshot.sentiment_min <= snapshot.sentiment_avg);
        assert!(snapshot.sentiment_avg <= snapshot.sentiment_max);
    }

    #[test]
    fn test_mixed_awareness_scenario() {
        let index = EventIndex::new(&[
            event("2024-01-01T00:00:00Z", 0.5),
            event("2024-01-01T12:00:00Z", -0.5),
        ]);
        assert_eq!(index.awareness(), StreamAwareness::Aware);

        let snapshot = index.snapshot(Some(&ts("2024-01-01T13:00:00")), hours(24));
        assert_eq!(snapshot.news_count, 2);
        assert_eq!(snapshot.sentiment_avg, 0.0);
        assert_eq!(snapshot.positive_count, 1);
        assert_eq!(snapshot.negative_count, 1);
    }

    #[test]
    fn test_unusable_polarities_are_dropped() {
        let mut nan = event("2024-01-01 09:00:00", 0.0);
        nan.polarity = f64::NAN;
        let mut huge = event("2024-01-01 09:30:00", 0.0);
        huge.polarity = 5.0;

        let index = EventIndex::new(&[nan.clone(), huge, event("2024-01-01 10:00:00", 0.4)]);
        assert_eq!(index.len(), 1);

        let snapshot = index.snapshot(Some(&ts("2024-01-01 10:00:00")), hours(24));
        assert_eq!(snapshot.news_count, 1);
        assert_eq!(snapshot.sentiment_avg, 0.4);

        let only_nan = EventIndex::new(&[nan]);
        let snapshot = only_nan.snapshot(Some(&ts("2024-01-01 10:00:00")), hours(24));
        assert_eq!(snapshot, SentimentSnapshot::empty());
    }

    #[test]
    fn test_snapshot_of_nan_polarities_does_not_panic() {
        let key = ts("2024-01-01 10:00:00").local_wall_clock();
        let events = vec![
            IndexedEvent { key, polarity: f64::NAN, category: SentimentCategory::Neutral },
            IndexedEvent { key, polarity: f64::NAN, category: SentimentCategory::Neutral },
        ];
        let snapshot = SentimentSnapshot::from_events(&events);
        assert_eq!(snapshot.news_count, 2);
        assert!(snapshot.sentiment_avg.is_nan());
    }

    #[test]
    fn test_count_in_window() {
        let index = EventIndex::new(&[
            event("2024-01-01 10:00:00", 0.5),
            event("2024-01-01 11:00:00", 0.5),
        ]);
        assert_eq!(index.count_in_window(&ts("2024-01-01 11:00:00"), hours(1)), 1);
        assert_eq!(index.count_in_window(&ts("2024-01-01 11:00:00"), hours(2)), 2);
    }

    #[test]
    fn test_matches_linear_scan() {
        let events: Vec<NewsEvent> = (0..200)
            .map(|i| {
                let minutes = (i * 37) % 4000;
                let polarity = ((i * 13) % 21) as f64 / 10.0 - 1.0;
                let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::minutes(minutes);
                NewsEvent::new(EventTime::Naive(at), polarity, &PolarityThresholds::default())
            })
            .collect();
        let index = EventIndex::new(&events);

        for step in 0..60 {
            let query = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::minutes(step * 75);
            for window in [1, 4, 12] {
                let start = query - chrono::Duration::hours(window);
                let expected = events
                    .iter()
                    .filter(|e| {
                        let key = e.timestamp.local_wall_clock();
                        key > start && key <= query
                    })
                    .count();
                let snapshot = index.snapshot(Some(&EventTime::Naive(query)), hours(window as u32));
                assert_eq!(snapshot.news_count, expected);
                assert_eq!(
                    snapshot.positive_count + snapshot.negative_count + snapshot.neutral_count,
                    snapshot.news_count
                );
            }
        }
    }
}
