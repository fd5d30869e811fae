//! Moving Average Convergence Divergence (12/26/9).

use serde::{Deserialize, Serialize};

use super::moving_average::ema;

const FAST_SPAN: usize = 12;
const SLOW_SPAN: usize = 26;
const SIGNAL_SPAN: usize = 9;

/// Full MACD series, aligned one-to-one with the input closes.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    /// MACD line: EMA(12) - EMA(26)
    pub macd: Vec<f64>,
    /// Signal line: EMA(9) of the MACD line
    pub signal: Vec<f64>,
    /// Histogram: MACD - signal
    pub histogram: Vec<f64>,
}

/// Last-value MACD summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdSummary {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdSeries {
    /// Last values of all three lines (NaN on an empty series).
    pub fn last(&self) -> MacdSummary {
        MacdSummary {
            macd: self.macd.last().copied().unwrap_or(f64::NAN),
            signal: self.signal.last().copied().unwrap_or(f64::NAN),
            histogram: self.histogram.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// MACD over a close series with the standard 12/26/9 spans.
pub fn macd(closes: &[f64]) -> MacdSeries {
    let ema_fast = ema(closes, FAST_SPAN);
    let ema_slow = ema(closes, SLOW_SPAN);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema(&macd_line, SIGNAL_SPAN);
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_constant_series_is_zero() {
        let closes = vec![50.0; 80];
        let result = macd(&closes);

        assert!(result.macd.iter().all(|v| v.abs() < 1e-9));
        assert!(result.histogram.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let summary = macd(&closes).last();

        // Fast EMA sits above slow EMA in a sustained uptrend.
        assert!(summary.macd > 0.0);
        assert!(summary.histogram.is_finite());
    }

    #[test]
    fn test_macd_negative_in_downtrend() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 0.99f64.powi(i)).collect();
        let summary = macd(&closes).last();
        assert!(summary.macd < 0.0);
    }

    #[test]
    fn test_macd_alignment() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 5) as f64).collect();
        let result = macd(&closes);

        assert_eq!(result.macd.len(), closes.len());
        assert_eq!(result.signal.len(), closes.len());
        assert_eq!(result.histogram.len(), closes.len());
        for i in 0..closes.len() {
            assert!((result.histogram[i] - (result.macd[i] - result.signal[i])).abs() < 1e-9);
        }
    }
}
