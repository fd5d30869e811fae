//! Risk-managed backtest engine.
//!
//! A single pass over the price series drives a two-state machine (FLAT,
//! IN_POSITION). Entries are re-evaluated every bar from indicator values;
//! exits are governed by price levels (target, stop, trailing stop), the
//! exit signal, and a maximum holding period, checked in strict priority
//! order. At most one position is open at any time.

use protrader_common::Result;

use super::metrics::{EquityPoint, ExitReason, Trade};
use super::position::PositionState;
use super::sizing::position_size;
use crate::config::StrategyConfig;
use crate::data::PriceSeries;
use crate::indicators::{macd, rsi};
use crate::strategy::rules;

/// Raw output of a simulation run, before analysis.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    /// Completed trades in chronological order
    pub trades: Vec<Trade>,
    /// One equity point per simulated day, warm-up included
    pub equity_curve: Vec<EquityPoint>,
    /// Capital after the final (possibly forced) exit
    pub final_capital: f64,
}

/// The risk-managed day-by-day backtest engine.
pub struct BacktestEngine {
    config: StrategyConfig,
}

impl BacktestEngine {
    /// Create an engine, validating the configuration up front.
    pub fn new(config: StrategyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this engine runs with.
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Run the simulation over a price series.
    ///
    /// Fails fast when the series cannot clear the warm-up window; a run
    /// that produces zero trades is a valid, complete result.
    pub fn run(&self, series: &PriceSeries) -> Result<BacktestRun> {
        series.ensure_min_len(self.config.warmup_bars + 1)?;

        let closes = series.closes();
        let rsi_series = rsi(&closes, self.config.rsi_period);
        let macd_series = macd(&closes);

        let mut cash = self.config.initial_capital;
        let mut position: Option<PositionState> = None;
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(series.len());

        for (i, bar) in series.bars().iter().enumerate() {
            let price = bar.close;

            let total_equity = cash
                + position
                    .as_ref()
                    .map(|p| p.market_value(price))
                    .unwrap_or(0.0);
            equity_curve.push(EquityPoint {
                date: bar.date,
                total_equity,
                in_position: position.is_some(),
            });

            // Indicators are unreliable early on; skip a fixed window so
            // behavior is uniform across strategies.
            if i < self.config.warmup_bars {
                continue;
            }

            if let Some(mut pos) = position.take() {
                let days_held = pos.days_held(bar.date);
                pos.update_trailing(price, self.config.trailing_stop_pct);

                let exit = decide_exit(
                    &pos,
                    price,
                    rsi_series[i],
                    macd_series.histogram[i],
                    days_held,
                    &self.config,
                );

                if let Some(reason) = exit {
                    let trade = close_trade(&pos, price, bar.date, reason, &self.config);
                    cash += pos.principal() + trade.profit_loss_amount;
                    tracing::debug!(
                        date = %bar.date,
                        reason = ?reason,
                        pnl_pct = trade.profit_loss_pct,
                        "Closed position"
                    );
                    trades.push(trade);
                } else {
                    position = Some(pos);
                }
            } else if rules::entry_signal(rsi_series[i], macd_series.histogram[i], &self.config) {
                let entry_price = price;
                let stop_loss_price = entry_price * (1.0 - self.config.stop_loss_pct / 100.0);
                let take_profit_price = entry_price * (1.0 + self.config.take_profit_pct / 100.0);

                let shares = position_size(
                    cash,
                    entry_price,
                    stop_loss_price,
                    self.config.risk_per_trade_pct,
                    self.config.max_position_pct,
                );

                // A zero or negative size is a silent no-trade (degenerate
                // stop or no spendable capital), not an error.
                if shares > 0.0 {
                    let principal = shares * entry_price;
                    let reserved =
                        principal * (1.0 + self.config.round_trip_cost_pct() / 100.0);
                    if reserved <= cash {
                        cash -= principal;
                        position = Some(PositionState::open(
                            shares,
                            entry_price,
                            bar.date,
                            stop_loss_price,
                            take_profit_price,
                        ));
                        tracing::debug!(
                            date = %bar.date,
                            entry = entry_price,
                            stop = stop_loss_price,
                            target = take_profit_price,
                            shares,
                            "Opened position"
                        );
                    }
                }
            }
        }

        // Force-close anything still open at the last available close.
        if let Some(pos) = position {
            let last = series.last();
            let trade = close_trade(
                &pos,
                last.close,
                last.date,
                ExitReason::EndOfBacktest,
                &self.config,
            );
            cash += pos.principal() + trade.profit_loss_amount;
            trades.push(trade);
        }

        tracing::info!(
            bars = series.len(),
            trades = trades.len(),
            final_capital = cash,
            "Backtest complete"
        );

        Ok(BacktestRun {
            trades,
            equity_curve,
            final_capital: cash,
        })
    }
}

/// Evaluate exit conditions in strict priority order.
///
/// First match wins: take-profit beats the stop, the stop beats the exit
/// signal, the signal beats the time limit. There is no further tie-break.
fn decide_exit(
    position: &PositionState,
    price: f64,
    rsi_value: f64,
    macd_histogram: f64,
    days_held: i64,
    config: &StrategyConfig,
) -> Option<ExitReason> {
    if position.take_profit_hit(price) {
        Some(ExitReason::TakeProfit)
    } else if position.stop_hit(price) {
        if position.trailing_stop_active {
            Some(ExitReason::TrailingStop)
        } else {
            Some(ExitReason::StopLoss)
        }
    } else if rules::exit_signal(rsi_value, macd_histogram, config) {
        Some(ExitReason::Signal)
    } else if days_held >= config.max_hold_days {
        Some(ExitReason::TimeExit)
    } else {
        None
    }
}

/// Settle an exit and build the ledger record.
///
/// The doubled round-trip rate is charged once here, against gross exit
/// proceeds; the entry leg moved principal only. The ledger therefore fully
/// explains the capital trajectory.
fn close_trade(
    position: &PositionState,
    exit_price: f64,
    exit_date: chrono::NaiveDate,
    reason: ExitReason,
    config: &StrategyConfig,
) -> Trade {
    let gross_proceeds = position.shares * exit_price;
    let transaction_cost = gross_proceeds * (config.round_trip_cost_pct() / 100.0);
    let net_proceeds = gross_proceeds - transaction_cost;

    let principal = position.principal();
    let profit_loss_amount = net_proceeds - principal;
    let profit_loss_pct = profit_loss_amount / principal * 100.0;

    Trade {
        entry_date: position.entry_date,
        exit_date,
        entry_price: position.entry_price,
        exit_price,
        stop_loss: position.stop_loss_price,
        take_profit: position.take_profit_price,
        exit_reason: reason,
        shares: position.shares,
        profit_loss_pct,
        profit_loss_amount,
        duration_days: position.days_held(exit_date),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_util::series_from_closes;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// Config with the entry rule forced open (RSI is always below 101) and
    /// the signal exit forced closed, so price-level exits can be exercised
    /// deterministically.
    fn level_exit_config() -> StrategyConfig {
        StrategyConfig {
            rsi_entry: 101.0,
            rsi_exit: 200.0,
            ..StrategyConfig::default()
        }
    }

    /// 31 alternating bars (keeps RSI defined), then a 20-bar climb into a
    /// close of 100.0 at index 50, the first bar past warm-up, where the
    /// first entry fires.
    fn closes_with_entry_at_100(tail: &[f64]) -> Vec<f64> {
        let mut closes: Vec<f64> = (0..31)
            .map(|i| if i % 2 == 0 { 90.0 } else { 89.0 })
            .collect();
        for i in 1..=20 {
            closes.push(90.0 + i as f64 * 0.5);
        }
        debug_assert!((closes[50] - 100.0).abs() < 1e-9);
        closes.extend_from_slice(tail);
        closes
    }

    fn run(config: StrategyConfig, closes: &[f64]) -> BacktestRun {
        let series = series_from_closes(closes);
        BacktestEngine::new(config).unwrap().run(&series).unwrap()
    }

    #[test]
    fn test_short_series_fails_fast() {
        let series = series_from_closes(&[100.0; 30]);
        let engine = BacktestEngine::new(StrategyConfig::default()).unwrap();
        let err = engine.run(&series).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_flat_series_produces_no_trades() {
        let result = run(StrategyConfig::default(), &[100.0; 100]);

        assert!(result.trades.is_empty());
        assert!((result.final_capital - 100_000.0).abs() < 1e-9);
        assert!(result
            .equity_curve
            .iter()
            .all(|p| (p.total_equity - 100_000.0).abs() < 1e-9));
    }

    #[test]
    fn test_take_profit_scenario() {
        // Entry at 100 (stop 95, target 115); the next close at 116 crosses
        // the target.
        let result = run(level_exit_config(), &closes_with_entry_at_100(&[116.0]));

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert!((trade.entry_price - 100.0).abs() < 1e-9);
        assert!((trade.exit_price - 116.0).abs() < 1e-9);
        // +16% gross, minus the 0.35% round-trip cost on proceeds.
        assert!(trade.profit_loss_pct > 15.0 && trade.profit_loss_pct < 16.0);
    }

    #[test]
    fn test_stop_loss_scenario() {
        // Entry at 100 with a 5% stop; the next close at 94 crosses it.
        let result = run(level_exit_config(), &closes_with_entry_at_100(&[94.0]));

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        // -6% gross, minus costs.
        assert!(trade.profit_loss_pct < -6.0 && trade.profit_loss_pct > -7.0);
    }

    #[test]
    fn test_trailing_stop_scenario() {
        // +12% arms the trailing stop at 112 * 0.9 = 100.8; the pullback to
        // 100 triggers it and is attributed to the trailing mechanism.
        let result = run(level_exit_config(), &closes_with_entry_at_100(&[112.0, 100.0]));

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::TrailingStop);
        assert!((trade.stop_loss - 100.8).abs() < 1e-9);
    }

    #[test]
    fn test_time_exit_fires_on_exact_day() {
        // Flat after entry: no level or signal exit, so the position rides
        // until max_hold_days exactly.
        let tail = vec![100.0; 60];
        let result = run(level_exit_config(), &closes_with_entry_at_100(&tail));

        assert!(!result.trades.is_empty());
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::TimeExit);
        assert_eq!(trade.duration_days, 45);
    }

    #[test]
    fn test_end_of_backtest_forced_close() {
        // Series ends two bars after entry without touching any level.
        let result = run(level_exit_config(), &closes_with_entry_at_100(&[101.0]));

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason, ExitReason::EndOfBacktest);
    }

    #[test]
    fn test_exit_priority_take_profit_beats_stop() {
        // Artificial state where both levels are crossed at once: the stop
        // has ratcheted above the target. Priority must pick the target.
        let mut pos = PositionState::open(
            10.0,
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            95.0,
            115.0,
        );
        pos.trailing_stop_active = true;
        pos.stop_loss_price = 125.0;

        let config = StrategyConfig::default();
        let reason = decide_exit(&pos, 121.0, 50.0, 0.0, 3, &config);
        assert_eq!(reason, Some(ExitReason::TakeProfit));
    }

    #[test]
    fn test_exit_priority_stop_beats_signal_and_time() {
        let pos = PositionState::open(
            10.0,
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            95.0,
            115.0,
        );
        let config = StrategyConfig::default();

        // Stop crossed while the signal and the clock would also exit.
        let reason = decide_exit(&pos, 94.0, 70.0, -1.0, 100, &config);
        assert_eq!(reason, Some(ExitReason::StopLoss));

        // Signal beats the clock.
        let reason = decide_exit(&pos, 100.0, 70.0, -1.0, 100, &config);
        assert_eq!(reason, Some(ExitReason::Signal));

        // Clock alone.
        let reason = decide_exit(&pos, 100.0, 50.0, 0.0, 100, &config);
        assert_eq!(reason, Some(ExitReason::TimeExit));
    }

    #[test]
    fn test_ledger_explains_capital_trajectory() {
        let mut tail = vec![116.0];
        tail.extend(closes_with_entry_at_100(&[94.0])[31..].to_vec());
        let result = run(level_exit_config(), &closes_with_entry_at_100(&tail));

        let pnl_sum: f64 = result.trades.iter().map(|t| t.profit_loss_amount).sum();
        assert!(
            (100_000.0 + pnl_sum - result.final_capital).abs() < 1e-6,
            "ledger does not explain capital: {} vs {}",
            100_000.0 + pnl_sum,
            result.final_capital
        );
    }

    #[test]
    fn test_positions_never_overlap() {
        // A choppy series that trades repeatedly.
        let closes: Vec<f64> = (0..400)
            .map(|i| 100.0 + (i as f64 / 9.0).sin() * 15.0)
            .collect();
        let result = run(level_exit_config(), &closes);

        assert!(result.trades.len() > 1);
        for pair in result.trades.windows(2) {
            assert!(
                pair[1].entry_date > pair[0].exit_date,
                "overlapping trades: exit {} entry {}",
                pair[0].exit_date,
                pair[1].entry_date
            );
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + (i as f64 / 7.0).sin() * 12.0)
            .collect();
        let first = run(level_exit_config(), &closes);
        let second = run(level_exit_config(), &closes);

        assert_eq!(first.trades, second.trades);
        assert_eq!(first.equity_curve, second.equity_curve);
        assert!((first.final_capital - second.final_capital).abs() < 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_capital_and_equity_never_negative(
            closes in proptest::collection::vec(20.0f64..200.0, 60..220)
        ) {
            let result = run(StrategyConfig::default(), &closes);

            prop_assert!(result.final_capital >= 0.0);
            for point in &result.equity_curve {
                prop_assert!(point.total_equity >= 0.0);
            }
        }

        #[test]
        fn prop_ledger_round_trip(
            closes in proptest::collection::vec(20.0f64..200.0, 60..220)
        ) {
            let result = run(StrategyConfig::default(), &closes);
            let pnl_sum: f64 = result.trades.iter().map(|t| t.profit_loss_amount).sum();
            prop_assert!((100_000.0 + pnl_sum - result.final_capital).abs() < 1e-6);
        }
    }
}
