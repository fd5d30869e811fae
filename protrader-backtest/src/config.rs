//! Strategy and simulation configuration.
//!
//! One immutable parameter bundle per backtest run. All thresholds live here
//! as typed fields with constructor-level validation instead of loosely-keyed
//! maps, so a bad configuration fails before the simulation starts.

use protrader_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Strategy configuration for a backtest run.
///
/// Percentages are expressed in percent units (`5.0` = 5%). The config is
/// constructed once per run and read-only throughout the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// RSI lookback period
    pub rsi_period: usize,
    /// RSI level below which the risk-managed engine enters
    pub rsi_entry: f64,
    /// RSI level above which the exit signal fires
    pub rsi_exit: f64,

    /// Maximum loss per trade before the stop fires (percentage)
    pub stop_loss_pct: f64,
    /// Profit target (percentage)
    pub take_profit_pct: f64,
    /// Unrealized profit that arms the trailing stop (percentage)
    pub trailing_stop_pct: f64,
    /// Force an exit after this many calendar days in a position
    pub max_hold_days: i64,

    /// Starting capital
    pub initial_capital: f64,
    /// Capital fraction risked to the stop per trade (percentage)
    pub risk_per_trade_pct: f64,
    /// Maximum capital fraction committed to a single position (percentage)
    pub max_position_pct: f64,

    /// Brokerage commission per leg (percentage)
    pub commission_pct: f64,
    /// Fixed slippage per leg (percentage)
    pub slippage_pct: f64,
    /// Transaction tax per leg (percentage)
    pub tax_pct: f64,

    /// Bars skipped at the start of the series before any entry is evaluated.
    /// Fixed regardless of which indicators a strategy uses, so warm-up
    /// behavior is uniform across strategies.
    pub warmup_bars: usize,

    /// Walk-forward optimization toggle. Declared for forward compatibility;
    /// no splitting or optimization logic consumes these fields yet.
    pub walk_forward_enabled: bool,
    /// Walk-forward training window in months (declared, unconsumed)
    pub train_period_months: u32,
    /// Walk-forward test window in months (declared, unconsumed)
    pub test_period_months: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_entry: 40.0,
            rsi_exit: 60.0,
            stop_loss_pct: 5.0,
            take_profit_pct: 15.0, // 3:1 reward-to-risk against the default stop
            trailing_stop_pct: 10.0,
            max_hold_days: 45,
            initial_capital: 100_000.0,
            risk_per_trade_pct: 2.0,
            max_position_pct: 20.0,
            commission_pct: 0.05,
            slippage_pct: 0.1,
            tax_pct: 0.025,
            warmup_bars: 50,
            walk_forward_enabled: false,
            train_period_months: 24,
            test_period_months: 6,
        }
    }
}

impl StrategyConfig {
    /// Validate the configuration, rejecting values that would corrupt the
    /// simulation arithmetic.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capital <= 0.0 {
            return Err(Error::Config(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }

        let percentages = [
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
            ("trailing_stop_pct", self.trailing_stop_pct),
            ("risk_per_trade_pct", self.risk_per_trade_pct),
            ("max_position_pct", self.max_position_pct),
            ("commission_pct", self.commission_pct),
            ("slippage_pct", self.slippage_pct),
            ("tax_pct", self.tax_pct),
        ];
        for (name, value) in percentages {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }

        if self.stop_loss_pct >= 100.0 {
            return Err(Error::Config(format!(
                "stop_loss_pct must be below 100, got {}",
                self.stop_loss_pct
            )));
        }
        if self.rsi_period < 2 {
            return Err(Error::Config(format!(
                "rsi_period must be at least 2, got {}",
                self.rsi_period
            )));
        }
        if self.max_hold_days < 1 {
            return Err(Error::Config(format!(
                "max_hold_days must be at least 1, got {}",
                self.max_hold_days
            )));
        }

        Ok(())
    }

    /// Total transaction cost per round-trip trade (percentage).
    ///
    /// Both legs are rolled into one doubled rate which the engine applies
    /// once, against exit proceeds.
    pub fn round_trip_cost_pct(&self) -> f64 {
        (self.commission_pct + self.slippage_pct + self.tax_pct) * 2.0
    }
}

// ============================================================================
// Tests
// ============================================================================
