//! File collaborators for the news sentiment feature builder
//!
//! Reads scored (or raw) news and price bars from CSV, and writes the
//! resulting feature frame back out as CSV or JSON.

pub mod connectors;
pub mod sink;

pub use connectors::{load_news_csv, load_price_csv};
pub use sink::{write_csv, write_json, OutputFormat};
