//! Momentum, trend and acceleration of the windowed average sentiment

use serde::{Deserialize, Serialize};

/// Rows averaged by the sentiment trend
pub const DEFAULT_TREND_PERIOD: usize = 10;

/// Series derived from one window's `sentiment_avg`, row-aligned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    /// First difference; the first row is undefined
    pub momentum: Vec<Option<f64>>,
    /// Trailing mean with a minimum period of one row
    pub trend: Vec<f64>,
    /// Difference of momentum; the first two rows are undefined
    pub acceleration: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn from_averages(averages: &[f64], trend_period: usize) -> Self {
        let values: Vec<Option<f64>> = averages.iter().copied().map(Some).collect();
        let momentum = difference(&values);
        let acceleration = difference(&momentum);

        Self {
            momentum,
            trend: rolling_mean(averages, trend_period),
            acceleration,
        }
    }
}

/// `out[i] = values[i] - values[i - 1]`, undefined where either side is
pub fn difference(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }

    out.push(None);
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(curr)) => Some(curr - prev),
        _ => None,
    }));
    out
}

/// Mean of the last `period` values, using fewer at the start
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let window = &values[start..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}
