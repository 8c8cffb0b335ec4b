//! News Sentiment Features
//!
//! Joins an irregular stream of scored news articles onto regular price bars.
//! It includes:
//! - Timestamp normalization between aware and naive streams
//! - Trailing-window sentiment snapshots found by binary search
//! - A multi-window builder producing `news_{h}h_*` columns
//! - Momentum, trend and acceleration of the windowed average
//! - Calendar and trading-session time features
//! - Technical indicators over the OHLCV columns
//! - A pluggable article classifier for unscored news

pub mod aggregator;
pub mod builder;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frame;
pub mod momentum;
pub mod pipeline;
pub mod technical;
pub mod time_features;
pub mod timestamp;
pub mod window;

// Re-export commonly used types
pub use aggregator::{EventIndex, SentimentSnapshot, SNAPSHOT_FIELDS};
pub use builder::MultiWindowBuilder;
pub use classifier::{bounded_polarity, score_articles, LexiconClassifier, NewsArticle, SentimentClassifier};
pub use config::{create_config_template, load_config, save_config, FeatureConfig};
pub use error::FeatureError;
pub use frame::{FeatureColumn, FeatureFrame, FeatureValue, WindowFeatures};
pub use momentum::{DerivedSeries, DEFAULT_TREND_PERIOD};
pub use pipeline::SentimentPipeline;
pub use technical::{BollingerBands, Ohlcv, TechnicalIndicators};
pub use time_features::{TimeFeatures, TIME_FEATURE_COLUMNS};
pub use timestamp::StreamAwareness;
pub use window::WindowLength;

// Re-export common types for convenience
pub use common::{EventTime, InputSchemaError, NewsEvent, PolarityThresholds, PriceBar, PriceFrame, SentimentCategory};
