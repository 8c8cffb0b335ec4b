//! Technical indicators over the price table's OHLCV columns
//!
//! Conventions follow TA-Lib: an EMA is seeded with the SMA of its first full
//! period, RSI and ATR use Wilder smoothing and Bollinger bands use the
//! population standard deviation. Warm-up rows are NaN and are written out as
//! missing values.

use common::{InputSchemaError, PriceFrame};
use tracing::{debug, warn};

/// Periods of the simple and exponential moving averages
pub const MA_PERIODS: [usize; 6] = [5, 10, 20, 50, 100, 200];
pub const RSI_PERIODS: [usize; 3] = [14, 21, 28];
pub const ROC_PERIODS: [usize; 3] = [10, 20, 50];
pub const ATR_PERIODS: [usize; 2] = [14, 21];

const MOMENTUM_PERIOD: usize = 10;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_WIDTH: f64 = 2.0;

/// Volume column names, in order of preference
const VOLUME_COLUMNS: [&str; 2] = ["tick_volume", "volume"];

/// Numeric OHLCV series read from a price table
///
/// Unreadable cells become NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Ohlcv {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Option<Vec<f64>>,
}

impl Ohlcv {
    /// `open`, `high`, `low` and `close` are required; volume is optional
    pub fn from_frame(prices: &PriceFrame) -> Result<Self, InputSchemaError> {
        let required = |name: &str| -> Result<Vec<f64>, InputSchemaError> {
            let idx = prices
                .column_index(name)
                .ok_or_else(|| InputSchemaError::MissingColumn(name.to_string()))?;
            Ok(parse_column(prices, idx, name))
        };

        let volume = VOLUME_COLUMNS.iter().find_map(|name| {
            prices
                .column_index(name)
                .map(|idx| parse_column(prices, idx, name))
        });

        Ok(Self {
            open: required("open")?,
            high: required("high")?,
            low: required("low")?,
            close: required("close")?,
            volume,
        })
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

fn parse_column(prices: &PriceFrame, idx: usize, name: &str) -> Vec<f64> {
    let mut unreadable = 0;
    let values = prices
        .records()
        .iter()
        .map(|record| match record.get(idx).and_then(|cell| cell.parse::<f64>().ok()) {
            Some(value) => value,
            None => {
                unreadable += 1;
                f64::NAN
            }
        })
        .collect();

    if unreadable > 0 {
        warn!(column = name, unreadable, "Unreadable price cells, indicators over them are undefined");
    }
    values
}

/// Bollinger band series
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    /// Position of the close inside the bands
    pub pct_b: Vec<f64>,
    /// Band width relative to the middle band
    pub width: Vec<f64>,
}

/// Technical indicators calculator
pub struct TechnicalIndicators;

impl TechnicalIndicators {
    /// Simple Moving Average
    pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if period == 0 || n < period {
            return result;
        }

        for i in (period - 1)..n {
            let sum: f64 = values[(i + 1 - period)..=i].iter().sum();
            result[i] = sum / period as f64;
        }

        result
    }

    /// Exponential Moving Average, seeded with the SMA of the first full period
    pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
        Self::smoothed(values, period, 2.0 / (period as f64 + 1.0))
    }

    /// Wilder's moving average
    pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
        Self::smoothed(values, period, 1.0 / period as f64)
    }

    /// Recursive average starting after any leading NaNs
    fn smoothed(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if period == 0 {
            return result;
        }

        let Some(first) = values.iter().position(|v| !v.is_nan()) else {
            return result;
        };
        let seed = first + period - 1;
        if seed >= n {
            return result;
        }

        let mut prev = values[first..=seed].iter().sum::<f64>() / period as f64;
        result[seed] = prev;
        for i in (seed + 1)..n {
            prev = alpha * values[i] + (1.0 - alpha) * prev;
            result[i] = prev;
        }

        result
    }

    /// Relative Strength Index
    ///
    /// A flat window reads 50; a window without losses reads 100.
    pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
        let n = close.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];

        for i in 1..n {
            let change = close[i] - close[i - 1];
            if !change.is_nan() {
                gains[i] = if change > 0.0 { change } else { 0.0 };
                losses[i] = if change < 0.0 { -change } else { 0.0 };
            }
        }

        let avg_gain = Self::wilder(&gains, period);
        let avg_loss = Self::wilder(&losses, period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&gain, &loss)| {
                if gain.is_nan() || loss.is_nan() {
                    f64::NAN
                } else if loss == 0.0 {
                    if gain == 0.0 {
                        50.0
                    } else {
                        100.0
                    }
                } else {
                    100.0 - 100.0 / (1.0 + gain / loss)
                }
            })
            .collect()
    }

    /// MACD line, signal line and histogram
    pub fn macd(close: &[f64], fast: usize, slow: usize, signal: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let ema_fast = Self::ema(close, fast);
        let ema_slow = Self::ema(close, slow);

        let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
        let signal_line = Self::ema(&macd_line, signal);
        let histogram = macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

        (macd_line, signal_line, histogram)
    }

    /// Bollinger Bands around an SMA
    pub fn bollinger_bands(close: &[f64], period: usize, std_dev: f64) -> BollingerBands {
        let n = close.len();
        let middle = Self::sma(close, period);
        let mut upper = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];

        if period > 0 && n >= period {
            for i in (period - 1)..n {
                let slice = &close[(i + 1 - period)..=i];
                let mean = middle[i];
                let variance = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
                let std = variance.sqrt();

                upper[i] = mean + std_dev * std;
                lower[i] = mean - std_dev * std;
            }
        }

        let pct_b = (0..n).map(|i| (close[i] - lower[i]) / (upper[i] - lower[i])).collect();
        let width = (0..n).map(|i| (upper[i] - lower[i]) / middle[i]).collect();

        BollingerBands {
            upper,
            middle,
            lower,
            pct_b,
            width,
        }
    }

    /// Average True Range with Wilder smoothing; the first row has no true range
    pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
        let n = close.len();
        let mut true_ranges = vec![f64::NAN; n];

        for i in 1..n {
            let ranges = [
                high[i] - low[i],
                (high[i] - close[i - 1]).abs(),
                (low[i] - close[i - 1]).abs(),
            ];
            if ranges.iter().all(|r| !r.is_nan()) {
                true_ranges[i] = ranges.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            }
        }

        Self::wilder(&true_ranges, period)
    }

    /// Slow stochastic oscillator: %K smoothed over `k_slow`, %D over `d_period`
    pub fn stochastic(
        high: &[f64],
        low: &[f64],
        close: &[f64],
        k_period: usize,
        k_slow: usize,
        d_period: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let n = close.len();
        let mut fast_k = vec![f64::NAN; n];

        if k_period > 0 && n >= k_period {
            for i in (k_period - 1)..n {
                let highs = &high[(i + 1 - k_period)..=i];
                let lows = &low[(i + 1 - k_period)..=i];
                if highs.iter().chain(lows).any(|v| v.is_nan()) {
                    continue;
                }

                let highest = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lowest = lows.iter().copied().fold(f64::INFINITY, f64::min);
                fast_k[i] = if highest > lowest {
                    (close[i] - lowest) / (highest - lowest) * 100.0
                } else {
                    0.0
                };
            }
        }

        let slow_k = Self::sma(&fast_k, k_slow);
        let slow_d = Self::sma(&slow_k, d_period);
        (slow_k, slow_d)
    }

    /// Close minus the close `period` rows earlier
    pub fn momentum(close: &[f64], period: usize) -> Vec<f64> {
        (0..close.len())
            .map(|i| if i >= period { close[i] - close[i - period] } else { f64::NAN })
            .collect()
    }

    /// Rate of change in percent
    pub fn roc(close: &[f64], period: usize) -> Vec<f64> {
        (0..close.len())
            .map(|i| {
                if i >= period && close[i - period] != 0.0 {
                    (close[i] - close[i - period]) / close[i - period] * 100.0
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    /// On-Balance Volume, starting from the first bar's volume
    pub fn obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
        let mut result = Vec::with_capacity(close.len());
        let Some(&first) = volume.first() else {
            return result;
        };

        let mut running = first;
        result.push(running);
        for i in 1..close.len() {
            if close[i] > close[i - 1] {
                running += volume[i];
            } else if close[i] < close[i - 1] {
                running -= volume[i];
            }
            result.push(running);
        }

        result
    }

    /// Simple and log returns of the close
    pub fn returns(close: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let simple = (0..close.len())
            .map(|i| if i > 0 { close[i] / close[i - 1] - 1.0 } else { f64::NAN })
            .collect();
        let log = (0..close.len())
            .map(|i| if i > 0 { (close[i] / close[i - 1]).ln() } else { f64::NAN })
            .collect();
        (simple, log)
    }

    /// Every indicator column, in output order
    pub fn all(data: &Ohlcv) -> Vec<(String, Vec<f64>)> {
        let close = &data.close;
        let mut columns = Vec::new();

        for period in MA_PERIODS {
            columns.push((format!("SMA_{}", period), Self::sma(close, period)));
            columns.push((format!("EMA_{}", period), Self::ema(close, period)));
        }

        let (macd, signal, hist) = Self::macd(close, 12, 26, 9);
        columns.push(("MACD".to_string(), macd));
        columns.push(("MACD_signal".to_string(), signal));
        columns.push(("MACD_hist".to_string(), hist));

        for period in RSI_PERIODS {
            columns.push((format!("RSI_{}", period), Self::rsi(close, period)));
        }

        let (stoch_k, stoch_d) = Self::stochastic(&data.high, &data.low, close, 14, 3, 3);
        columns.push(("STOCH_K".to_string(), stoch_k));
        columns.push(("STOCH_D".to_string(), stoch_d));

        for period in ROC_PERIODS {
            columns.push((format!("ROC_{}", period), Self::roc(close, period)));
        }
        columns.push(("MOM".to_string(), Self::momentum(close, MOMENTUM_PERIOD)));

        let bands = Self::bollinger_bands(close, BOLLINGER_PERIOD, BOLLINGER_WIDTH);
        columns.push(("BB_upper".to_string(), bands.upper));
        columns.push(("BB_middle".to_string(), bands.middle));
        columns.push(("BB_lower".to_string(), bands.lower));
        columns.push(("BB_pct_b".to_string(), bands.pct_b));
        columns.push(("BB_width".to_string(), bands.width));

        let mut atr_pct = Vec::new();
        for period in ATR_PERIODS {
            let atr = Self::atr(&data.high, &data.low, close, period);
            if period == ATR_PERIODS[0] {
                atr_pct = atr.iter().zip(close).map(|(a, c)| a / c * 100.0).collect();
            }
            columns.push((format!("ATR_{}", period), atr));
        }
        columns.push(("ATR_pct".to_string(), atr_pct));

        match &data.volume {
            Some(volume) => columns.push(("OBV".to_string(), Self::obv(close, volume))),
            None => debug!("No volume column, skipping OBV"),
        }

        let (returns, log_returns) = Self::returns(close);
        columns.push(("returns".to_string(), returns));
        columns.push(("log_returns".to_string(), log_returns));

        columns
    }
}
