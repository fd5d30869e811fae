//! Combined RSI + MACD strategy.

use super::{SignalSeries, SignalStrategy};
use crate::data::PriceSeries;
use crate::indicators::{macd, rsi};

/// Conservative confluence variant: entry requires RSI below the lower band
/// AND a positive MACD histogram (momentum turning); exit requires RSI above
/// the upper band AND a negative histogram. Both conditions are mandatory on
/// each side, not a majority vote.
#[derive(Debug, Clone)]
pub struct RsiMacdCombined {
    period: usize,
    rsi_entry: f64,
    rsi_exit: f64,
}

impl RsiMacdCombined {
    pub fn new(period: usize, rsi_entry: f64, rsi_exit: f64) -> Self {
        Self {
            period,
            rsi_entry,
            rsi_exit,
        }
    }
}

impl SignalStrategy for RsiMacdCombined {
    fn name(&self) -> &'static str {
        "Combined RSI + MACD"
    }

    fn signals(&self, series: &PriceSeries) -> SignalSeries {
        let closes = series.closes();
        let rsi_values = rsi(&closes, self.period);
        let macd_series = macd(&closes);

        let entries = rsi_values
            .iter()
            .zip(&macd_series.histogram)
            .map(|(&r, &h)| r < self.rsi_entry && h > 0.0)
            .collect();
        let exits = rsi_values
            .iter()
            .zip(&macd_series.histogram)
            .map(|(&r, &h)| r > self.rsi_exit && h < 0.0)
            .collect();

        SignalSeries { entries, exits }
    }
}

// ============================================================================
// Tests
// ============================================================================
