//! Pure technical indicator library.
//!
//! Stateless functions over price columns. Series forms are NaN-padded during
//! the warm-up window; callers must not act on values before warm-up
//! completes (the backtest engine enforces a fixed warm-up skip). Scalar
//! accessors substitute documented neutral fallbacks (RSI 50, ATR 1.0,
//! ADX 25) so a single undefined value never aborts a run.

mod macd;
mod momentum;
mod moving_average;
mod rsi;
mod volatility;
mod volume;

pub use macd::{macd, MacdSeries, MacdSummary};
pub use momentum::{momentum, roc, stochastic, MomentumSnapshot};
pub use moving_average::{ema, sma, MovingAverageSet};
pub use rsi::{rsi, rsi_last};
pub use volatility::{atr, atr_series, bollinger_bands, rolling_std, BollingerBands};
pub use volume::{obv, volume_analysis, VolumeAnalysis};

use serde::{Deserialize, Serialize};

use crate::data::PriceSeries;

/// Last-value snapshot of every indicator, computed in one pass over a
/// series. This is the record the scoring layer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Wilder RSI (14)
    pub rsi: f64,
    /// MACD line / signal line / histogram (12/26/9)
    pub macd: MacdSummary,
    /// Bollinger band levels and %B (20, 2)
    pub bollinger: BollingerBands,
    /// Moving average stack
    pub moving_averages: MovingAverageSet,
    /// Volume ratio and OBV trend
    pub volume: VolumeAnalysis,
    /// ROC / stochastic / ADX
    pub momentum: MomentumSnapshot,
    /// Average true range (14)
    pub atr: f64,
}

impl IndicatorSnapshot {
    /// Compute the full snapshot for a series.
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();

        Self {
            rsi: rsi_last(&closes, 14),
            macd: macd(&closes).last(),
            bollinger: bollinger_bands(&closes, 20, 2.0),
            moving_averages: MovingAverageSet::compute(&closes),
            volume: volume_analysis(series, 20),
            momentum: momentum(series),
            atr: atr(series, 14),
        }
    }
}
