//! Momentum indicators: rate of change, stochastic oscillator, ADX.

use serde::{Deserialize, Serialize};

use super::moving_average::sma;
use crate::data::PriceSeries;

const ROC_PERIOD: usize = 10;
const STOCH_PERIOD: usize = 14;
const STOCH_SMOOTH: usize = 3;
const ADX_PERIOD: usize = 14;

/// Rate of change: percent move of the last close against the close
/// `period` bars from the end. 0 with insufficient data.
pub fn roc(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period || period == 0 {
        return 0.0;
    }
    let base = closes[closes.len() - period];
    if base == 0.0 {
        return 0.0;
    }
    (closes[closes.len() - 1] - base) / base * 100.0
}

/// Stochastic oscillator %K/%D series (NaN-padded during warm-up).
pub fn stochastic(series: &PriceSeries, period: usize, smooth: usize) -> (Vec<f64>, Vec<f64>) {
    let bars = series.bars();
    let mut k = vec![f64::NAN; bars.len()];

    for i in (period.saturating_sub(1))..bars.len() {
        let window = &bars[i + 1 - period..=i];
        let low_min = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high_max = window
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        k[i] = 100.0 * (bars[i].close - low_min) / (high_max - low_min);
    }

    let d = sma(&k, smooth);
    (k, d)
}

/// Momentum snapshot for the scoring layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MomentumSnapshot {
    /// 10-bar rate of change (percentage)
    pub roc_10: f64,
    /// Stochastic %K (14)
    pub stochastic_k: f64,
    /// Stochastic %D (3-bar smoothing of %K)
    pub stochastic_d: f64,
    /// Average Directional Index (14); 25 when undefined
    pub adx: f64,
}

/// Compute the momentum snapshot over a series.
pub fn momentum(series: &PriceSeries) -> MomentumSnapshot {
    let closes = series.closes();
    let (k, d) = stochastic(series, STOCH_PERIOD, STOCH_SMOOTH);

    MomentumSnapshot {
        roc_10: roc(&closes, ROC_PERIOD),
        stochastic_k: k.last().copied().unwrap_or(f64::NAN),
        stochastic_d: d.last().copied().unwrap_or(f64::NAN),
        adx: adx(series, ADX_PERIOD),
    }
}

/// Average Directional Index via simplified directional-movement smoothing:
/// rolling means of +DM/-DM over the rolling mean bar range, then a rolling
/// mean of the resulting DX. 25 (borderline-trending) when undefined.
pub fn adx(series: &PriceSeries, period: usize) -> f64 {
    let bars = series.bars();
    let len = bars.len();
    if len < 2 {
        return 25.0;
    }

    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    for i in 1..len {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let ranges: Vec<f64> = bars.iter().map(|b| b.range()).collect();
    let range_mean = sma(&ranges, period);
    let plus_mean = sma(&plus_dm, period);
    let minus_mean = sma(&minus_dm, period);

    let dx: Vec<f64> = (0..len)
        .map(|i| {
            let plus_di = 100.0 * plus_mean[i] / range_mean[i];
            let minus_di = 100.0 * minus_mean[i] / range_mean[i];
            100.0 * (plus_di - minus_di).abs() / (plus_di + minus_di)
        })
        .collect();

    let value = sma(&dx, period).last().copied().unwrap_or(f64::NAN);
    if value.is_nan() {
        25.0
    } else {
        value
    }
}

// ============================================================================
// Tests
// ============================================================================
