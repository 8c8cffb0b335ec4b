//! Errors raised by the feature builders

use common::InputSchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    /// The price source cannot be keyed; no partial output is produced
    #[error(transparent)]
    Schema(#[from] InputSchemaError),

    #[error("window length must be a positive number of hours, got {0}")]
    InvalidWindow(u32),

    #[error("window {0}h is configured more than once")]
    DuplicateWindow(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
