//! Signal-driven simulation backends.
//!
//! For strategies that precompute entry/exit boolean series, the simulation
//! itself is a capability behind the `SimulationBackend` trait: an
//! explicit-loop reference implementation and a vectorized implementation
//! that derives a holdings mask in one scan and settles trades in bulk. The
//! two are interchangeable and must agree bar-for-bar; the backend is chosen
//! at construction time, never through a global flag.

use serde::{Deserialize, Serialize};

use super::metrics::{EquityPoint, ExitReason, Trade};
use crate::config::StrategyConfig;
use crate::data::PriceSeries;
use crate::strategy::SignalSeries;

/// Raw output of a signal-driven simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub final_capital: f64,
}

/// A simulation capability over precomputed signals.
///
/// Positions are all-in (the full capital buys at the entry close) with no
/// stop management; exits come only from the exit series or the end of data.
/// The round-trip cost rate is charged once per trade, on exit proceeds.
pub trait SimulationBackend: Send + Sync {
    /// Backend name for reports and diagnostics.
    fn name(&self) -> &'static str;

    /// Run the simulation.
    fn run(
        &self,
        series: &PriceSeries,
        signals: &SignalSeries,
        config: &StrategyConfig,
    ) -> SimulationResult;
}

/// Backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Explicit-loop reference implementation
    Loop,
    /// Mask-then-settle bulk implementation
    Vectorized,
}

impl BackendKind {
    /// Build the backend implementation.
    pub fn build(self) -> Box<dyn SimulationBackend> {
        match self {
            Self::Loop => Box::new(LoopBackend),
            Self::Vectorized => Box::new(VectorizedBackend),
        }
    }
}

// ============================================================================
// Shared settlement
// ============================================================================

/// Settle one all-in round trip and append the ledger record.
fn settle_trade(
    series: &PriceSeries,
    entry_index: usize,
    exit_index: usize,
    shares: f64,
    reason: ExitReason,
    config: &StrategyConfig,
    trades: &mut Vec<Trade>,
) -> f64 {
    let entry_bar = &series.bars()[entry_index];
    let exit_bar = &series.bars()[exit_index];

    let principal = shares * entry_bar.close;
    let gross_proceeds = shares * exit_bar.close;
    let transaction_cost = gross_proceeds * (config.round_trip_cost_pct() / 100.0);
    let net_proceeds = gross_proceeds - transaction_cost;
    let profit_loss_amount = net_proceeds - principal;

    trades.push(Trade {
        entry_date: entry_bar.date,
        exit_date: exit_bar.date,
        entry_price: entry_bar.close,
        exit_price: exit_bar.close,
        stop_loss: 0.0,
        take_profit: 0.0,
        exit_reason: reason,
        shares,
        profit_loss_pct: profit_loss_amount / principal * 100.0,
        profit_loss_amount,
        duration_days: (exit_bar.date - entry_bar.date).num_days(),
    });

    net_proceeds
}

// ============================================================================
// Explicit-loop reference backend
// ============================================================================

/// Day-by-day reference implementation.
pub struct LoopBackend;

impl SimulationBackend for LoopBackend {
    fn name(&self) -> &'static str {
        "loop"
    }

    fn run(
        &self,
        series: &PriceSeries,
        signals: &SignalSeries,
        config: &StrategyConfig,
    ) -> SimulationResult {
        let bars = series.bars();
        let mut cash = config.initial_capital;
        let mut shares = 0.0f64;
        let mut entry_index = 0usize;
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            let in_position = shares > 0.0;
            let total_equity = if in_position {
                shares * bar.close
            } else {
                cash
            };
            equity_curve.push(EquityPoint {
                date: bar.date,
                total_equity,
                in_position,
            });

            if i < config.warmup_bars {
                continue;
            }

            if in_position {
                if signals.exits[i] {
                    cash = settle_trade(
                        series,
                        entry_index,
                        i,
                        shares,
                        ExitReason::Signal,
                        config,
                        &mut trades,
                    );
                    shares = 0.0;
                }
            } else if signals.entries[i] && bar.close > 0.0 {
                shares = cash / bar.close;
                entry_index = i;
            }
        }

        if shares > 0.0 {
            cash = settle_trade(
                series,
                entry_index,
                series.len() - 1,
                shares,
                ExitReason::EndOfBacktest,
                config,
                &mut trades,
            );
        }

        SimulationResult {
            trades,
            equity_curve,
            final_capital: cash,
        }
    }
}

// ============================================================================
// Vectorized backend
// ============================================================================

/// Mask-then-settle implementation: one scan derives the held-position
/// segments, then equity and trades are computed in bulk over the segments.
pub struct VectorizedBackend;

impl SimulationBackend for VectorizedBackend {
    fn name(&self) -> &'static str {
        "vectorized"
    }

    fn run(
        &self,
        series: &PriceSeries,
        signals: &SignalSeries,
        config: &StrategyConfig,
    ) -> SimulationResult {
        let bars = series.bars();
        let n = bars.len();

        // Pass 1: resolve the signal streams into (entry, exit) index pairs.
        // Exits are exclusive of the entry bar; an open tail segment closes
        // at the final bar.
        let mut segments: Vec<(usize, Option<usize>)> = Vec::new();
        let mut held = false;
        for i in config.warmup_bars.min(n)..n {
            if held {
                if signals.exits[i] {
                    if let Some(last) = segments.last_mut() {
                        last.1 = Some(i);
                    }
                    held = false;
                }
            } else if signals.entries[i] && bars[i].close > 0.0 {
                segments.push((i, None));
                held = true;
            }
        }

        // Pass 2: bulk-settle the segments in order, threading capital.
        // Equity records state as of the bar open, so a segment occupies the
        // holdings mask from the bar after entry through the exit bar
        // inclusive.
        let mut cash = config.initial_capital;
        let mut trades = Vec::with_capacity(segments.len());
        let mut holdings = vec![0.0f64; n];
        // (exit bar, cash level after that settlement)
        let mut settlements: Vec<(usize, f64)> = Vec::with_capacity(segments.len());
        for &(entry, exit) in &segments {
            let shares = cash / bars[entry].close;
            let exit_index = exit.unwrap_or(n - 1);
            let reason = if exit.is_some() {
                ExitReason::Signal
            } else {
                ExitReason::EndOfBacktest
            };
            for slot in holdings.iter_mut().take(exit_index + 1).skip(entry + 1) {
                *slot = shares;
            }
            cash = settle_trade(
                series,
                entry,
                exit_index,
                shares,
                reason,
                config,
                &mut trades,
            );
            settlements.push((exit_index, cash));
        }

        // Pass 3: equity curve from the holdings mask. Cash while flat is the
        // level left by the most recent settlement on an earlier bar.
        let mut equity_curve = Vec::with_capacity(n);
        let mut flat_cash = config.initial_capital;
        let mut cursor = 0usize;
        for (i, bar) in bars.iter().enumerate() {
            while cursor < settlements.len() && settlements[cursor].0 < i {
                flat_cash = settlements[cursor].1;
                cursor += 1;
            }
            let in_position = holdings[i] > 0.0;
            let total_equity = if in_position {
                holdings[i] * bar.close
            } else {
                flat_cash
            };
            equity_curve.push(EquityPoint {
                date: bar.date,
                total_equity,
                in_position,
            });
        }

        SimulationResult {
            trades,
            equity_curve,
            final_capital: cash,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
