//! Error types for malformed input data

use thiserror::Error;

/// The price or news source does not have the shape the builders need
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputSchemaError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("record {row} has {found} fields, expected {expected}")]
    RaggedRecord {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A timestamp cell could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("empty timestamp")]
    Empty,

    #[error("unrecognised timestamp format: {0:?}")]
    Unparsable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sentiment category: {0:?}")]
pub struct ParseCategoryError(pub String);
