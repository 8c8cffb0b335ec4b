// Sentiment Feature Pipeline
// Joins news sentiment onto price bars and derives the momentum columns

use crate::builder::MultiWindowBuilder;
use crate::config::FeatureConfig;
use crate::error::FeatureError;
use crate::frame::FeatureFrame;
use common::{NewsEvent, PriceFrame};
use tracing::{info, warn};

/// Builds the full feature frame described by a `FeatureConfig`
#[derive(Debug, Clone)]
pub struct SentimentPipeline {
    builder: MultiWindowBuilder,
    config: FeatureConfig,
}

impl SentimentPipeline {
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self {
            builder: MultiWindowBuilder::new(&config.windows)?,
            config,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Window snapshots, then momentum per configured window, then technical
    /// indicators and time columns when enabled
    pub fn run(&self, prices: &PriceFrame, events: &[NewsEvent]) -> Result<FeatureFrame, FeatureError> {
        if events.is_empty() {
            warn!("No news events supplied, sentiment columns will hold empty-window defaults");
        }

        let mut frame = self.builder.build(prices, events)?;

        let mut skipped = 0;
        for hours in self.config.momentum_window_hours() {
            if !frame.add_sentiment_momentum(hours, self.config.trend_period) {
                skipped += 1;
            }
        }

        if self.config.technical_indicators {
            frame.add_technical_indicators();
        }

        if self.config.time_features {
            frame.add_time_features();
        }

        info!(
            rows = frame.row_count(),
            columns = frame.column_count(),
            skipped_momentum = skipped,
            "Feature pipeline complete"
        );

        Ok(frame)
    }
}
