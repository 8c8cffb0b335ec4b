//! Article scoring
//!
//! Turns raw articles into `NewsEvent`s. The scorer is passed in by the
//! caller, so an expensive model can be loaded once and shared without the
//! feature builders holding any global state.

use common::{EventTime, NewsEvent, PolarityThresholds};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Anything that maps article text to a polarity in [-1, 1]
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> f64;

    fn name(&self) -> &str {
        "custom"
    }
}

/// A news article before scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub timestamp: EventTime,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
}

impl NewsArticle {
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// Keyword lexicon tuned for gold and macro headlines
///
/// Score is (bullish hits - bearish hits) / total hits, 0.0 without hits.
/// Entries match whole words: "fall" hits "falls" but not "fallout", and a
/// phrase like "rate cut" must appear as consecutive words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconClassifier {
    pub bullish: Vec<String>,
    pub bearish: Vec<String>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        let bullish = [
            "rally", "surge", "soar", "gain", "rise", "jump", "climb", "record high",
            "safe haven", "safe-haven", "rate cut", "dovish", "weaker dollar", "bullish",
            "buying", "demand", "inflows", "rebound", "recovery", "uncertainty",
        ];
        let bearish = [
            "fall", "drop", "slump", "plunge", "decline", "slide", "tumble", "loss",
            "rate hike", "hawkish", "stronger dollar", "selloff", "sell-off", "bearish",
            "outflows", "pressure", "retreat", "weaker demand", "profit-taking", "crash",
        ];

        Self {
            bullish: bullish.iter().map(|w| w.to_string()).collect(),
            bearish: bearish.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl LexiconClassifier {
    pub fn new(bullish: Vec<String>, bearish: Vec<String>) -> Self {
        Self { bullish, bearish }
    }
}

/// Lowercased alphanumeric words of `text`
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `token` is `word` or one of its plain inflections ("falls", "surged", "rising")
fn word_matches(token: &str, word: &str) -> bool {
    if token == word {
        return true;
    }
    if let Some(rest) = token.strip_prefix(word) {
        return matches!(rest, "s" | "es" | "d" | "ed" | "ing");
    }
    // "rise" -> "rising", "surge" -> "surging"
    match word.strip_suffix('e') {
        Some(stem) => token.strip_prefix(stem) == Some("ing"),
        None => false,
    }
}

fn phrase_hits(tokens: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(phrase)
            .all(|(token, word)| word_matches(token, word))
    })
}

fn count_hits(tokens: &[String], lexicon: &[String]) -> usize {
    lexicon
        .iter()
        .filter(|entry| phrase_hits(tokens, &tokenize(entry)))
        .count()
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> f64 {
        let tokens = tokenize(text);

        let positive = count_hits(&tokens, &self.bullish) as f64;
        let negative = count_hits(&tokens, &self.bearish) as f64;
        let total = positive + negative;

        if total > 0.0 {
            ((positive - negative) / total).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Classifier output forced into [-1, 1]; `None` when it is not a number
pub fn bounded_polarity(score: f64) -> Option<f64> {
    if score.is_nan() {
        None
    } else {
        Some(score.clamp(-1.0, 1.0))
    }
}

/// Score and label a batch of articles
///
/// An article the classifier cannot score (NaN) is kept as neutral 0.0.
pub fn score_articles(
    articles: &[NewsArticle],
    classifier: &dyn SentimentClassifier,
    thresholds: &PolarityThresholds,
) -> Vec<NewsEvent> {
    let events: Vec<NewsEvent> = articles
        .iter()
        .map(|article| {
            let polarity = bounded_polarity(classifier.classify(&article.text())).unwrap_or_else(|| {
                warn!(title = %article.title, classifier = classifier.name(), "Unscorable article, using 0.0");
                0.0
            });
            NewsEvent::new(article.timestamp, polarity, thresholds)
        })
        .collect();

    debug!(articles = events.len(), classifier = classifier.name(), "Scored articles");
    events
}
