//! Per-bar entry/exit predicates for the risk-managed engine.
//!
//! Unlike the precomputed boolean series, the risk-managed engine re-evaluates
//! these conditions on every bar, because price-level exits (stop, target,
//! trailing stop) must be checked regardless of the signal state. NaN
//! indicator values fail closed on both sides.

use crate::config::StrategyConfig;

/// Entry condition: RSI below the entry threshold with a positive MACD
/// histogram (momentum turning while still depressed).
pub fn entry_signal(rsi: f64, macd_histogram: f64, config: &StrategyConfig) -> bool {
    rsi < config.rsi_entry && macd_histogram > 0.0
}

/// Exit condition: RSI above the exit threshold with a negative MACD
/// histogram (momentum rolling over after the recovery).
pub fn exit_signal(rsi: f64, macd_histogram: f64, config: &StrategyConfig) -> bool {
    rsi > config.rsi_exit && macd_histogram < 0.0
}

// ============================================================================
// Tests
// ============================================================================
