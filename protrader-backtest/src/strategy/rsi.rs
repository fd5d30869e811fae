//! RSI mean-reversion strategy.

use super::{SignalSeries, SignalStrategy};
use crate::data::PriceSeries;
use crate::indicators::rsi;

/// Buy when RSI drops below the oversold threshold, sell when it rises above
/// the overbought threshold. NaN warm-up values trigger neither side.
#[derive(Debug, Clone)]
pub struct RsiMeanReversion {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiMeanReversion {
    /// Standard thresholds: 35 oversold, 65 overbought.
    pub fn new(period: usize) -> Self {
        Self::with_thresholds(period, 35.0, 65.0)
    }

    /// Custom thresholds.
    pub fn with_thresholds(period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            period,
            oversold,
            overbought,
        }
    }
}

impl SignalStrategy for RsiMeanReversion {
    fn name(&self) -> &'static str {
        "RSI Mean Reversion"
    }

    fn signals(&self, series: &PriceSeries) -> SignalSeries {
        let values = rsi(&series.closes(), self.period);

        SignalSeries {
            entries: values.iter().map(|&v| v < self.oversold).collect(),
            exits: values.iter().map(|&v| v > self.overbought).collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
