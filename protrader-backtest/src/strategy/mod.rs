//! Signal generation strategies.
//!
//! A strategy maps indicator values to entry/exit boolean series aligned
//! one-to-one with the price series. The simulation backends are agnostic to
//! which generator produced the signals; the risk-managed engine instead
//! re-evaluates its conditions every bar (see `rules`).

mod combined;
mod macd;
mod rsi;
pub mod rules;
pub mod score;

pub use combined::RsiMacdCombined;
pub use macd::MacdCrossover;
pub use rsi::RsiMeanReversion;

use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;
use crate::data::PriceSeries;

/// Entry/exit boolean series aligned with a price series.
#[derive(Debug, Clone)]
pub struct SignalSeries {
    /// Entry condition per bar
    pub entries: Vec<bool>,
    /// Exit condition per bar
    pub exits: Vec<bool>,
}

impl SignalSeries {
    /// Number of bars covered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no bars are covered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A pluggable signal generator.
pub trait SignalStrategy: Send + Sync {
    /// Human-readable strategy name for reports.
    fn name(&self) -> &'static str;

    /// Generate aligned entry/exit series for the whole price series.
    fn signals(&self, series: &PriceSeries) -> SignalSeries;
}

/// Strategy variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Enter oversold, exit overbought
    RsiMeanReversion,
    /// Enter on bullish MACD crossover, exit on bearish crossover
    MacdCrossover,
    /// RSI band plus MACD histogram confirmation, both mandatory
    RsiMacdCombined,
}

impl StrategyKind {
    /// All signal-driven variants, in comparison order.
    pub fn all() -> [StrategyKind; 3] {
        [
            Self::RsiMeanReversion,
            Self::MacdCrossover,
            Self::RsiMacdCombined,
        ]
    }

    /// Build the strategy implementation for this variant.
    pub fn build(self, config: &StrategyConfig) -> Box<dyn SignalStrategy> {
        match self {
            Self::RsiMeanReversion => Box::new(RsiMeanReversion::new(config.rsi_period)),
            Self::MacdCrossover => Box::new(MacdCrossover::new()),
            Self::RsiMacdCombined => Box::new(RsiMacdCombined::new(
                config.rsi_period,
                config.rsi_entry,
                config.rsi_exit,
            )),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RsiMeanReversion => write!(f, "RSI Mean Reversion"),
            Self::MacdCrossover => write!(f, "MACD Crossover"),
            Self::RsiMacdCombined => write!(f, "Combined RSI + MACD"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_util::{series_from_closes, trending_closes};

    #[test]
    fn test_all_variants_produce_aligned_series() {
        let config = StrategyConfig::default();
        let series = series_from_closes(&trending_closes(120));

        for kind in StrategyKind::all() {
            let strategy = kind.build(&config);
            let signals = strategy.signals(&series);
            assert_eq!(signals.len(), series.len(), "{}", strategy.name());
        }
    }

    #[test]
    fn test_strategy_kind_serialization() {
        let json = serde_json::to_string(&StrategyKind::RsiMeanReversion).unwrap();
        assert_eq!(json, "\"rsi_mean_reversion\"");
    }
}
