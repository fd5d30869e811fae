//! Trade ledger types and performance analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Trading days per year, used to annualize daily return ratios.
const ANNUALIZATION_DAYS: f64 = 252.0;

/// Drawdown magnitude (percentage) beyond which a day counts toward the
/// drawdown-duration statistic.
const DRAWDOWN_DURATION_THRESHOLD_PCT: f64 = 1.0;

// ============================================================================
// Ledger records
// ============================================================================

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Profit target reached
    TakeProfit,
    /// Initial stop triggered
    StopLoss,
    /// Ratcheted trailing stop triggered
    TrailingStop,
    /// Exit signal condition fired
    Signal,
    /// Maximum holding period reached
    TimeExit,
    /// Forced close on the last bar of the series
    EndOfBacktest,
}

/// One completed round-trip trade. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Stop level at exit time (reflects trailing ratchets)
    pub stop_loss: f64,
    pub take_profit: f64,
    pub exit_reason: ExitReason,
    pub shares: f64,
    pub profit_loss_pct: f64,
    pub profit_loss_amount: f64,
    pub duration_days: i64,
}

impl Trade {
    /// Check if the trade was profitable.
    pub fn is_winner(&self) -> bool {
        self.profit_loss_amount > 0.0
    }

    /// Check if the trade lost money.
    pub fn is_loser(&self) -> bool {
        self.profit_loss_amount < 0.0
    }
}

/// One simulated day of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub total_equity: f64,
    pub in_position: bool,
}

// ============================================================================
// Statistical significance
// ============================================================================

/// Confidence tier derived from the round-trip trade count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Tier thresholds: 30 / 100 / 200 trades.
    pub fn from_trade_count(count: usize) -> Self {
        if count >= 200 {
            Self::High
        } else if count >= 100 {
            Self::Medium
        } else if count >= 30 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

/// Warning text attached to reports with fewer than 100 trades.
pub fn significance_warning(trade_count: usize) -> Option<String> {
    if trade_count < 30 {
        Some(format!(
            "Only {} trades - NOT statistically significant (need 30+ minimum, 200+ recommended)",
            trade_count
        ))
    } else if trade_count < 100 {
        Some(format!(
            "Only {} trades - Limited statistical significance (recommend 200+ trades)",
            trade_count
        ))
    } else {
        None
    }
}

// ============================================================================
// Performance summary
// ============================================================================

/// Equity-curve level performance statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    /// Annualized growth rate; None when the series spans no elapsed time
    pub cagr_pct: Option<f64>,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Largest peak-to-trough decline, as a positive magnitude
    pub max_drawdown_pct: f64,
    /// Longest contiguous run of days more than 1% below the running peak
    pub max_drawdown_duration_days: usize,
    /// Buy-and-hold return of the underlying series
    pub benchmark_return_pct: f64,
    pub alpha_vs_benchmark: f64,
}

impl PerformanceSummary {
    /// Compute the summary from an equity curve and benchmark return.
    pub fn compute(
        equity_curve: &[EquityPoint],
        initial_capital: f64,
        final_value: f64,
        benchmark_return_pct: f64,
    ) -> Self {
        let total_return_pct = (final_value - initial_capital) / initial_capital * 100.0;
        let returns = daily_returns(equity_curve);
        let sharpe_ratio = sharpe(&returns);
        let sortino_ratio = sortino(&returns, sharpe_ratio);
        let (max_drawdown_pct, max_drawdown_duration_days) = max_drawdown(equity_curve);
        let cagr_pct = cagr(equity_curve, initial_capital, final_value);

        Self {
            initial_capital,
            final_value,
            total_return_pct,
            cagr_pct,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown_pct,
            max_drawdown_duration_days,
            benchmark_return_pct,
            alpha_vs_benchmark: total_return_pct - benchmark_return_pct,
        }
    }
}

/// Daily percent changes of the equity curve.
fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0].total_equity > 0.0)
        .map(|w| w[1].total_equity / w[0].total_equity - 1.0)
        .collect()
}

/// Annualized Sharpe ratio over daily returns (risk-free rate 0).
///
/// Guarded: 0 with fewer than two observations or zero variance.
fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std_dev = returns.iter().std_dev();
    if std_dev.is_nan() || std_dev <= 0.0 {
        return 0.0;
    }
    returns.iter().mean() / std_dev * ANNUALIZATION_DAYS.sqrt()
}

/// Annualized Sortino ratio: mean of all daily returns over the deviation of
/// negative-only returns. Falls back to the Sharpe value when there are not
/// enough negative days to measure downside deviation.
fn sortino(returns: &[f64], sharpe_value: f64) -> f64 {
    let negative: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if negative.len() < 2 {
        return sharpe_value;
    }
    let downside_dev = negative.iter().std_dev();
    if downside_dev.is_nan() || downside_dev <= 0.0 {
        return sharpe_value;
    }
    returns.iter().mean() / downside_dev * ANNUALIZATION_DAYS.sqrt()
}

/// Max drawdown magnitude (percentage) and the longest run of days spent more
/// than 1% below the running peak.
fn max_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    let mut current_run = 0usize;
    let mut longest_run = 0usize;

    for point in equity_curve {
        if point.total_equity > peak {
            peak = point.total_equity;
        }
        let drawdown_pct = if peak > 0.0 {
            (point.total_equity - peak) / peak * 100.0
        } else {
            0.0
        };
        if drawdown_pct < worst {
            worst = drawdown_pct;
        }
        if drawdown_pct < -DRAWDOWN_DURATION_THRESHOLD_PCT {
            current_run += 1;
            longest_run = longest_run.max(current_run);
        } else {
            current_run = 0;
        }
    }

    (worst.abs(), longest_run)
}

/// Compound annual growth rate over the elapsed calendar span.
fn cagr(equity_curve: &[EquityPoint], initial_capital: f64, final_value: f64) -> Option<f64> {
    let first = equity_curve.first()?;
    let last = equity_curve.last()?;
    let years = (last.date - first.date).num_days() as f64 / 365.25;
    if years <= 0.0 || initial_capital <= 0.0 || final_value <= 0.0 {
        return None;
    }
    Some(((final_value / initial_capital).powf(1.0 / years) - 1.0) * 100.0)
}

// ============================================================================
// Trade statistics
// ============================================================================

/// Ledger-level statistics with significance classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeStatistics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: f64,
    /// Gross win amount over gross loss magnitude; clamped, never infinite
    pub profit_factor: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub avg_trade_duration_days: f64,
    pub max_consecutive_losses: usize,
    pub confidence_level: ConfidenceLevel,
    pub is_statistically_significant: bool,
}

impl TradeStatistics {
    /// Compute statistics from the trade ledger, in chronological order.
    ///
    /// An empty ledger yields zeroed statistics with a VERY_LOW tier; "no
    /// trades occurred" is a valid result, not an error.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let total_trades = trades.len();
        let winners: Vec<&Trade> = trades.iter().filter(|t| t.is_winner()).collect();
        let losers: Vec<&Trade> = trades.iter().filter(|t| t.is_loser()).collect();

        let win_rate_pct = if total_trades > 0 {
            winners.len() as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let gross_profit: f64 = winners.iter().map(|t| t.profit_loss_amount).sum();
        // No losers: the denominator defaults to 1 so the factor reads as the
        // gross profit itself rather than infinity.
        let gross_loss: f64 = if losers.is_empty() {
            1.0
        } else {
            losers
                .iter()
                .map(|t| t.profit_loss_amount.abs())
                .sum::<f64>()
        };
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            gross_profit
        };

        let avg_win_pct = if winners.is_empty() {
            0.0
        } else {
            winners.iter().map(|t| t.profit_loss_pct).sum::<f64>() / winners.len() as f64
        };
        let avg_loss_pct = if losers.is_empty() {
            0.0
        } else {
            losers.iter().map(|t| t.profit_loss_pct).sum::<f64>() / losers.len() as f64
        };

        let avg_trade_duration_days = if total_trades > 0 {
            trades.iter().map(|t| t.duration_days as f64).sum::<f64>() / total_trades as f64
        } else {
            0.0
        };

        let mut streak = 0usize;
        let mut max_consecutive_losses = 0usize;
        for trade in trades {
            if trade.is_loser() {
                streak += 1;
                max_consecutive_losses = max_consecutive_losses.max(streak);
            } else {
                streak = 0;
            }
        }

        Self {
            total_trades,
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            win_rate_pct,
            profit_factor,
            avg_win_pct,
            avg_loss_pct,
            avg_trade_duration_days,
            max_consecutive_losses,
            confidence_level: ConfidenceLevel::from_trade_count(total_trades),
            is_statistically_significant: total_trades >= 30,
        }
    }
}

// ============================================================================
// Exit breakdown
// ============================================================================

/// Count of trades per exit reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExitBreakdown {
    pub take_profit: usize,
    pub stop_loss: usize,
    pub trailing_stop: usize,
    pub signal_exit: usize,
    pub time_exit: usize,
    pub end_of_backtest: usize,
}

impl ExitBreakdown {
    /// Tally exit reasons over the ledger.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut breakdown = Self::default();
        for trade in trades {
            match trade.exit_reason {
                ExitReason::TakeProfit => breakdown.take_profit += 1,
                ExitReason::StopLoss => breakdown.stop_loss += 1,
                ExitReason::TrailingStop => breakdown.trailing_stop += 1,
                ExitReason::Signal => breakdown.signal_exit += 1,
                ExitReason::TimeExit => breakdown.time_exit += 1,
                ExitReason::EndOfBacktest => breakdown.end_of_backtest += 1,
            }
        }
        breakdown
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n)
    }

    fn make_trade(pnl: f64, reason: ExitReason) -> Trade {
        Trade {
            entry_date: day(0),
            exit_date: day(5),
            entry_price: 100.0,
            exit_price: 100.0 + pnl / 10.0,
            stop_loss: 95.0,
            take_profit: 115.0,
            exit_reason: reason,
            shares: 10.0,
            profit_loss_pct: pnl / 10.0,
            profit_loss_amount: pnl,
            duration_days: 5,
        }
    }

    fn equity_from(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: day(i as u64),
                total_equity: v,
                in_position: false,
            })
            .collect()
    }

    #[test]
    fn test_exit_reason_serialization() {
        let json = serde_json::to_string(&ExitReason::TakeProfit).unwrap();
        assert_eq!(json, "\"TAKE_PROFIT\"");
        let json = serde_json::to_string(&ExitReason::EndOfBacktest).unwrap();
        assert_eq!(json, "\"END_OF_BACKTEST\"");
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceLevel::from_trade_count(0), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_trade_count(29), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_trade_count(30), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_trade_count(100), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_trade_count(200), ConfidenceLevel::High);
    }

    #[test]
    fn test_significance_warning_thresholds() {
        assert!(significance_warning(5).unwrap().contains("NOT statistically"));
        assert!(significance_warning(50).unwrap().contains("Limited"));
        assert!(significance_warning(150).is_none());
    }

    #[test]
    fn test_empty_ledger_statistics() {
        let stats = TradeStatistics::from_trades(&[]);
        assert_eq!(stats.total_trades, 0);
        assert!(stats.win_rate_pct.abs() < 1e-9);
        assert!(stats.profit_factor.abs() < 1e-9);
        assert_eq!(stats.confidence_level, ConfidenceLevel::VeryLow);
        assert!(!stats.is_statistically_significant);
    }

    #[test]
    fn test_profit_factor_no_losers_is_gross_profit() {
        let trades = vec![
            make_trade(500.0, ExitReason::TakeProfit),
            make_trade(300.0, ExitReason::Signal),
        ];
        let stats = TradeStatistics::from_trades(&trades);
        assert!((stats.profit_factor - 800.0).abs() < 1e-9);
        assert!((stats.win_rate_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_profit_factor_mixed() {
        let trades = vec![
            make_trade(600.0, ExitReason::TakeProfit),
            make_trade(-200.0, ExitReason::StopLoss),
        ];
        let stats = TradeStatistics::from_trades(&trades);
        assert!((stats.profit_factor - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_consecutive_losses() {
        let trades = vec![
            make_trade(-10.0, ExitReason::StopLoss),
            make_trade(-10.0, ExitReason::StopLoss),
            make_trade(50.0, ExitReason::TakeProfit),
            make_trade(-10.0, ExitReason::StopLoss),
            make_trade(-10.0, ExitReason::StopLoss),
            make_trade(-10.0, ExitReason::TimeExit),
        ];
        let stats = TradeStatistics::from_trades(&trades);
        assert_eq!(stats.max_consecutive_losses, 3);
    }

    #[test]
    fn test_max_drawdown_flat_curve_is_zero() {
        let (dd, duration) = max_drawdown(&equity_from(&[100.0; 100]));
        assert!(dd.abs() < 1e-9);
        assert_eq!(duration, 0);
    }

    #[test]
    fn test_max_drawdown_measures_trough() {
        let (dd, duration) = max_drawdown(&equity_from(&[100.0, 110.0, 88.0, 99.0, 112.0]));
        // Trough is 88 from a peak of 110: 20%.
        assert!((dd - 20.0).abs() < 1e-9);
        // 88 and 99 are both more than 1% below the 110 peak.
        assert_eq!(duration, 2);
    }

    #[test]
    fn test_sharpe_zero_variance_is_zero() {
        assert!(sharpe(&[0.01, 0.01, 0.01]).abs() < 1e-9);
        assert!(sharpe(&[0.01]).abs() < 1e-9);
    }

    #[test]
    fn test_sortino_falls_back_without_negative_days() {
        let returns = vec![0.01, 0.02, 0.005, 0.015];
        let s = sharpe(&returns);
        assert!((sortino(&returns, s) - s).abs() < 1e-9);
    }

    #[test]
    fn test_sortino_uses_downside_deviation() {
        let returns = vec![0.02, -0.01, 0.03, -0.02, 0.01, -0.015];
        let s = sharpe(&returns);
        let so = sortino(&returns, s);
        assert!(so.is_finite());
        assert!((so - s).abs() > 1e-12, "sortino should differ from sharpe");
    }

    #[test]
    fn test_cagr_requires_elapsed_time() {
        let single = equity_from(&[100.0]);
        assert!(cagr(&single, 100.0, 100.0).is_none());

        let curve = equity_from(&vec![100.0; 366]);
        let value = cagr(&curve, 100_000.0, 110_000.0).unwrap();
        // One year elapsed: CAGR approximately equals total return.
        assert!((value - 10.0).abs() < 0.5, "cagr was {}", value);
    }

    #[test]
    fn test_performance_summary_flat_curve() {
        let curve = equity_from(&[100_000.0; 100]);
        let summary = PerformanceSummary::compute(&curve, 100_000.0, 100_000.0, 0.0);

        assert!(summary.total_return_pct.abs() < 1e-9);
        assert!(summary.max_drawdown_pct.abs() < 1e-9);
        assert!(summary.sharpe_ratio.abs() < 1e-9);
        assert!(summary.sortino_ratio.abs() < 1e-9);
    }

    #[test]
    fn test_exit_breakdown_counts() {
        let trades = vec![
            make_trade(10.0, ExitReason::TakeProfit),
            make_trade(-10.0, ExitReason::StopLoss),
            make_trade(-10.0, ExitReason::StopLoss),
            make_trade(5.0, ExitReason::EndOfBacktest),
        ];
        let breakdown = ExitBreakdown::from_trades(&trades);
        assert_eq!(breakdown.take_profit, 1);
        assert_eq!(breakdown.stop_loss, 2);
        assert_eq!(breakdown.end_of_backtest, 1);
        assert_eq!(breakdown.signal_exit, 0);
    }
}
