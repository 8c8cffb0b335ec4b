//! Reconciling timezone awareness between the news stream and price bars
//!
//! Both sides are mapped onto one naive axis before comparison:
//!
//! | news stream | query    | query is read as            |
//! |-------------|----------|-----------------------------|
//! | aware       | aware    | its UTC instant             |
//! | aware       | naive    | UTC                         |
//! | naive       | aware    | its wall clock, offset cut  |
//! | naive       | naive    | unchanged                   |

use chrono::NaiveDateTime;
use common::{EventTime, NewsEvent};

/// Whether the news stream as a whole carries offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamAwareness {
    Aware,
    Naive,
}

impl StreamAwareness {
    /// A stream is aware as soon as one event carries an offset
    pub fn of(events: &[NewsEvent]) -> Self {
        if events.iter().any(|e| e.timestamp.is_aware()) {
            StreamAwareness::Aware
        } else {
            StreamAwareness::Naive
        }
    }

    /// Position of an event on the comparison axis
    ///
    /// In an aware stream a stray naive event is read as UTC.
    pub fn event_key(&self, timestamp: &EventTime) -> NaiveDateTime {
        match self {
            StreamAwareness::Aware => timestamp.utc_wall_clock(),
            StreamAwareness::Naive => timestamp.local_wall_clock(),
        }
    }

    /// Position of a price-row timestamp on the comparison axis
    pub fn query_key(&self, query: &EventTime) -> NaiveDateTime {
        match self {
            StreamAwareness::Aware => query.utc_wall_clock(),
            StreamAwareness::Naive => query.local_wall_clock(),
        }
    }
}
