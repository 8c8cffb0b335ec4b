//! Event and bar timestamps
//!
//! Collectors hand us timestamps in whatever shape their upstream produced:
//! news APIs usually carry an offset, MetaTrader bars usually do not. An
//! `EventTime` keeps that distinction so the joiner can reconcile the two
//! streams explicitly instead of guessing.

use crate::error::TimestampError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset-carrying formats, tried after RFC 3339
const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];

/// A point in time that is either timezone-aware or naive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTime {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl EventTime {
    /// Parse a timestamp cell
    ///
    /// Integer cells are Unix epoch seconds and become naive UTC wall-clock
    /// times, matching how bar times are exported by the terminal.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(TimestampError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(EventTime::Aware(dt));
        }

        for format in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, format) {
                return Ok(EventTime::Aware(dt));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(EventTime::Naive(dt));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(EventTime::Naive(midnight));
            }
        }

        if let Ok(secs) = text.parse::<i64>() {
            if let Some(dt) = DateTime::from_timestamp(secs, 0) {
                return Ok(EventTime::Naive(dt.naive_utc()));
            }
        }

        Err(TimestampError::Unparsable(text.to_string()))
    }

    pub fn is_aware(&self) -> bool {
        matches!(self, EventTime::Aware(_))
    }

    /// Position on the UTC axis; naive values are read as UTC
    pub fn utc_wall_clock(&self) -> NaiveDateTime {
        match self {
            EventTime::Aware(dt) => dt.naive_utc(),
            EventTime::Naive(dt) => *dt,
        }
    }

    /// Wall-clock reading with any offset dropped (no conversion)
    pub fn local_wall_clock(&self) -> NaiveDateTime {
        match self {
            EventTime::Aware(dt) => dt.naive_local(),
            EventTime::Naive(dt) => *dt,
        }
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(value: NaiveDateTime) -> Self {
        EventTime::Naive(value)
    }
}

impl From<DateTime<FixedOffset>> for EventTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        EventTime::Aware(value)
    }
}

impl From<DateTime<chrono::Utc>> for EventTime {
    fn from(value: DateTime<chrono::Utc>) -> Self {
        EventTime::Aware(value.fixed_offset())
    }
}

impl FromStr for EventTime {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventTime::parse(s)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    #[test]
    fn test_parse_rfc3339_is_aware() {
        let ts = EventTime::parse("2024-01-01T12:00:00Z").unwrap();
        assert!(ts.is_aware());
        assert_eq!(ts.utc_wall_clock().hour(), 12);
    }

    #[test]
    fn test_parse_pandas_aware_export() {
        let ts = EventTime::parse("2024-01-01 10:30:00+07:00").unwrap();
        assert!(ts.is_aware());
        assert_eq!(ts.utc_wall_clock().hour(), 3);
        assert_eq!(ts.local_wall_clock().hour(), 10);
    }

    #[test]
    fn test_parse_naive_formats() {
        for raw in [
            "2024-01-01 13:00:00",
            "2024-01-01T13:00:00",
            "2024-01-01 13:00",
            "2024.01.01 13:00",
            "2024-01-01 13:00:00.250",
        ] {
            let ts = EventTime::parse(raw).unwrap();
            assert!(!ts.is_aware(), "{raw} should be naive");
            assert_eq!(ts.local_wall_clock().hour(), 13, "{raw}");
        }
    }

    #[test]
    fn test_parse_epoch_seconds() {
        let ts = EventTime::parse("1704067200").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(ts, EventTime::Naive(expected));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(EventTime::parse("  "), Err(TimestampError::Empty));
        assert!(matches!(
            EventTime::parse("yesterday"),
            Err(TimestampError::Unparsable(_))
        ));
    }

    #[test]
    fn test_display_reparses() {
        let aware: EventTime = Utc::now().into();
        assert_eq!(EventTime::parse(&aware.to_string()).unwrap(), aware);

        let naive = EventTime::parse("2024-03-05 07:15:00").unwrap();
        assert_eq!(naive.to_string(), "2024-03-05 07:15:00");
    }
}
