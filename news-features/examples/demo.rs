//! Example usage of the news sentiment feature pipeline
//!
//! This example demonstrates:
//! 1. Building a day of synthetic 15-minute gold bars
//! 2. Scoring a handful of headlines with the lexicon classifier
//! 3. Running the pipeline with momentum and time features
//! 4. Inspecting the resulting columns

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use news_features::{
    score_articles, EventTime, FeatureConfig, LexiconClassifier, NewsArticle, PriceBar, PriceFrame,
    SentimentPipeline,
};
use tracing::{info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("News Sentiment Features - Example");
    info!("=================================");

    // Step 1: Price bars
    let prices = create_example_bars(96);
    info!("Created {} price bars", prices.len());

    // Step 2: Score headlines
    let articles = create_example_articles();
    let config = FeatureConfig {
        windows: vec![1, 4, 24],
        time_features: true,
        ..Default::default()
    };
    let classifier = LexiconClassifier::default();
    let events = score_articles(&articles, &classifier, &config.thresholds);
    for (article, event) in articles.iter().zip(&events) {
        info!("  [{:>8}] {:+.2} {}", event.category, event.polarity, article.title);
    }

    // Step 3: Run the pipeline
    let pipeline = SentimentPipeline::new(config)?;
    let frame = pipeline.run(&prices, &events)?;
    info!("Frame: {} rows x {} columns", frame.row_count(), frame.column_count());

    // Step 4: Look at the 4h window around the news
    let names = frame.column_names();
    let avg_idx = names.iter().position(|n| n == "news_4h_sentiment_avg");
    let momentum_idx = names.iter().position(|n| n == "news_4h_sentiment_momentum");
    if let (Some(avg_idx), Some(momentum_idx)) = (avg_idx, momentum_idx) {
        for row in (32..48).step_by(4) {
            let cells = frame.row(row);
            info!(
                "  {}  avg={:<22} momentum={}",
                cells[0], cells[avg_idx], cells[momentum_idx]
            );
        }
    }

    Ok(())
}

fn create_example_bars(count: usize) -> PriceFrame {
    let start = NaiveDate::from_ymd_opt(2024, 5, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");

    let bars: Vec<PriceBar> = (0..count)
        .map(|i| {
            let drift = (i as f64 / 8.0).sin() * 4.0;
            let close = 2320.0 + drift;
            PriceBar {
                timestamp: EventTime::Naive(start + Duration::minutes(15 * i as i64)),
                open: close - 0.6,
                high: close + 1.2,
                low: close - 1.4,
                close,
                volume: 1_000.0 + (i % 7) as f64 * 35.0,
            }
        })
        .collect();

    PriceFrame::from_bars(&bars)
}

fn create_example_articles() -> Vec<NewsArticle> {
    [
        ("2024-05-06T07:45:00Z", "Gold edges higher as safe haven demand returns"),
        ("2024-05-06T08:30:00Z", "Dollar firms, gold under pressure ahead of Fed speakers"),
        ("2024-05-06T09:10:00Z", "Gold prices surge after weak jobs data fuels rate cut bets"),
        ("2024-05-06T10:05:00Z", "Traders await CPI release"),
        ("2024-05-06T11:20:00Z", "Gold slides on profit-taking after rally"),
    ]
    .iter()
    .map(|(ts, title)| NewsArticle {
        timestamp: EventTime::parse(ts).expect("valid example timestamp"),
        title: title.to_string(),
        description: String::new(),
        source: "Example Wire".to_string(),
        url: "https://example.com/news".to_string(),
    })
    .collect()
}
