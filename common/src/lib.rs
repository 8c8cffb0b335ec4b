//! Common types shared by the news sentiment feature crates
//!
//! - Timestamps that may or may not carry a UTC offset
//! - Scored news events and their sentiment categories
//! - Price tables passed through the feature builders untouched

pub mod error;
pub mod news;
pub mod price;
pub mod time;

pub use error::{InputSchemaError, ParseCategoryError, TimestampError};
pub use news::{is_valid_polarity, NewsEvent, PolarityThresholds, SentimentCategory, POLARITY_RANGE};
pub use price::{PriceBar, PriceFrame, TIMESTAMP_COLUMN, TIME_COLUMN};
pub use time::EventTime;

// Re-export chrono so downstream crates agree on one version
pub use chrono;
