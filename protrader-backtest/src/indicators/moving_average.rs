//! Simple and exponential moving averages.

use serde::{Deserialize, Serialize};

/// Simple moving average, NaN-padded until `period` values are available.
///
/// Windows are summed individually so a NaN in the input (a warm-up gap from
/// an upstream indicator) only blanks the windows that contain it.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

/// Exponential moving average with smoothing factor `2 / (span + 1)`.
///
/// Adjust-free recursion seeded from the first observation, so values are
/// defined from the start of the series (early values carry seed bias and
/// fall inside the warm-up window).
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if values.is_empty() || span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    result[0] = values[0];
    for i in 1..values.len() {
        result[i] = values[i] * alpha + result[i - 1] * (1.0 - alpha);
    }
    result
}

/// The standard moving-average stack used by the scoring layer.
///
/// Fields are NaN when the series is shorter than the lookback; comparisons
/// against NaN fail closed downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovingAverageSet {
    pub sma_20: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub ema_12: f64,
    pub ema_26: f64,
}

impl MovingAverageSet {
    /// Compute last values for the whole stack.
    pub fn compute(closes: &[f64]) -> Self {
        let last = |series: Vec<f64>| series.last().copied().unwrap_or(f64::NAN);

        Self {
            sma_20: last(sma(closes, 20)),
            sma_50: last(sma(closes, 50)),
            sma_200: last(sma(closes, 200)),
            ema_12: last(ema(closes, 12)),
            ema_26: last(ema(closes, 26)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
