//! Volatility indicators: Average True Range and Bollinger Bands.

use serde::{Deserialize, Serialize};

use super::moving_average::sma;
use crate::data::PriceSeries;

/// Rolling sample standard deviation, NaN-padded until `period` values.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period < 2 || values.len() < period {
        return result;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period as f64 - 1.0);
        result[i] = variance.sqrt();
    }
    result
}

/// True range per bar: max(high-low, |high-prev_close|, |low-prev_close|).
fn true_range(series: &PriceSeries) -> Vec<f64> {
    let bars = series.bars();
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                let prev_close = bars[i - 1].close;
                bar.range()
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            }
        })
        .collect()
}

/// ATR series: simple rolling mean of true range over `period`.
pub fn atr_series(series: &PriceSeries, period: usize) -> Vec<f64> {
    sma(&true_range(series), period)
}

/// Last ATR value with the documented 1.0 fallback when fewer than `period`
/// bars are available or the value is undefined.
pub fn atr(series: &PriceSeries, period: usize) -> f64 {
    if series.len() < period {
        return 1.0;
    }
    let value = atr_series(series, period)
        .last()
        .copied()
        .unwrap_or(f64::NAN);
    if value.is_nan() {
        1.0
    } else {
        value
    }
}

/// Bollinger band snapshot: SMA(period) +/- k * rolling standard deviation.
///
/// `price_position` is (price - lower) / (upper - lower), deliberately not
/// hard-clamped to [0, 1] so breakouts read outside the band range. Fields
/// are NaN when the series is shorter than the lookback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Band width as a percentage of the middle band
    pub band_width: f64,
    /// Position of the last close within the bands
    pub price_position: f64,
}

/// Compute the Bollinger band snapshot over the last `period` closes.
pub fn bollinger_bands(closes: &[f64], period: usize, k: f64) -> BollingerBands {
    let middle = sma(closes, period).last().copied().unwrap_or(f64::NAN);
    let std = rolling_std(closes, period)
        .last()
        .copied()
        .unwrap_or(f64::NAN);
    let upper = middle + std * k;
    let lower = middle - std * k;

    let price = closes.last().copied().unwrap_or(f64::NAN);
    let band_width = (upper - lower) / middle * 100.0;
    let price_position = (price - lower) / (upper - lower);

    BollingerBands {
        upper,
        middle,
        lower,
        band_width,
        price_position,
    }
}

// ============================================================================
// Tests
// ============================================================================
