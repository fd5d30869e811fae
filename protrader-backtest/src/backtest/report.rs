//! Backtest report assembly and rendering.

use serde::{Deserialize, Serialize};

use super::metrics::{
    significance_warning, EquityPoint, ExitBreakdown, PerformanceSummary, Trade, TradeStatistics,
};
use crate::config::StrategyConfig;
use crate::data::PriceSeries;

/// Echo of the risk parameters a run was configured with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub trailing_stop_pct: f64,
    pub max_hold_days: i64,
    pub risk_per_trade_pct: f64,
    pub max_position_pct: f64,
    pub transaction_cost_pct: f64,
}

impl ConfigSummary {
    fn from_config(config: &StrategyConfig) -> Self {
        Self {
            stop_loss_pct: config.stop_loss_pct,
            take_profit_pct: config.take_profit_pct,
            trailing_stop_pct: config.trailing_stop_pct,
            max_hold_days: config.max_hold_days,
            risk_per_trade_pct: config.risk_per_trade_pct,
            max_position_pct: config.max_position_pct,
            transaction_cost_pct: config.round_trip_cost_pct(),
        }
    }
}

/// Complete backtest report: configuration echo, performance and trade
/// statistics, exit-reason breakdown, full ledger, and full equity curve.
/// Built once at the end of a run, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Strategy label
    pub strategy: String,
    /// Simulated period
    pub period: String,
    pub configuration: ConfigSummary,
    pub performance: PerformanceSummary,
    pub trade_statistics: TradeStatistics,
    pub exit_breakdown: ExitBreakdown,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Present whenever the trade count is too small to trust
    pub warning: Option<String>,
}

impl BacktestReport {
    /// Assemble the report for a completed run.
    pub fn generate(
        strategy: impl Into<String>,
        config: &StrategyConfig,
        series: &PriceSeries,
        trades: Vec<Trade>,
        equity_curve: Vec<EquityPoint>,
        final_capital: f64,
    ) -> Self {
        let performance = PerformanceSummary::compute(
            &equity_curve,
            config.initial_capital,
            final_capital,
            series.buy_hold_return_pct(),
        );
        let trade_statistics = TradeStatistics::from_trades(&trades);
        let exit_breakdown = ExitBreakdown::from_trades(&trades);
        let warning = significance_warning(trades.len());

        Self {
            strategy: strategy.into(),
            period: format!("{} to {}", series.first().date, series.last().date),
            configuration: ConfigSummary::from_config(config),
            performance,
            trade_statistics,
            exit_breakdown,
            trades,
            equity_curve,
            warning,
        }
    }

    /// Render the report as aligned plain text.
    pub fn text_report(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(63);
        let thin = "-".repeat(63);

        out.push_str(&format!("{}\n", rule));
        out.push_str(&format!("  Backtest Report: {}\n", self.strategy));
        out.push_str(&format!("{}\n\n", rule));
        out.push_str(&format!("Period: {}\n\n", self.period));

        out.push_str("Performance\n");
        out.push_str(&format!("{}\n", thin));
        out.push_str(&format!(
            "  Initial capital:     {:>14.2}\n",
            self.performance.initial_capital
        ));
        out.push_str(&format!(
            "  Final value:         {:>14.2}\n",
            self.performance.final_value
        ));
        out.push_str(&format!(
            "  Total return:        {:>13.2}%\n",
            self.performance.total_return_pct
        ));
        match self.performance.cagr_pct {
            Some(cagr) => out.push_str(&format!("  CAGR:                {:>13.2}%\n", cagr)),
            None => out.push_str("  CAGR:                           n/a\n"),
        }
        out.push_str(&format!(
            "  Sharpe ratio:        {:>14.2}\n",
            self.performance.sharpe_ratio
        ));
        out.push_str(&format!(
            "  Sortino ratio:       {:>14.2}\n",
            self.performance.sortino_ratio
        ));
        out.push_str(&format!(
            "  Max drawdown:        {:>13.2}% ({} days)\n",
            self.performance.max_drawdown_pct, self.performance.max_drawdown_duration_days
        ));
        out.push_str(&format!(
            "  Benchmark (B&H):     {:>13.2}%\n",
            self.performance.benchmark_return_pct
        ));
        out.push_str(&format!(
            "  Alpha vs benchmark:  {:>13.2}%\n\n",
            self.performance.alpha_vs_benchmark
        ));

        out.push_str("Trade statistics\n");
        out.push_str(&format!("{}\n", thin));
        out.push_str(&format!(
            "  Trades:              {:>14}\n",
            self.trade_statistics.total_trades
        ));
        out.push_str(&format!(
            "  Win rate:            {:>13.2}%\n",
            self.trade_statistics.win_rate_pct
        ));
        out.push_str(&format!(
            "  Profit factor:       {:>14.2}\n",
            self.trade_statistics.profit_factor
        ));
        out.push_str(&format!(
            "  Avg win / loss:      {:>6.2}% / {:.2}%\n",
            self.trade_statistics.avg_win_pct, self.trade_statistics.avg_loss_pct
        ));
        out.push_str(&format!(
            "  Max loss streak:     {:>14}\n",
            self.trade_statistics.max_consecutive_losses
        ));
        out.push_str(&format!(
            "  Confidence:          {:>14?}\n",
            self.trade_statistics.confidence_level
        ));

        out.push_str("\nExit breakdown\n");
        out.push_str(&format!("{}\n", thin));
        out.push_str(&format!(
            "  target {} | stop {} | trailing {} | signal {} | time {} | eob {}\n",
            self.exit_breakdown.take_profit,
            self.exit_breakdown.stop_loss,
            self.exit_breakdown.trailing_stop,
            self.exit_breakdown.signal_exit,
            self.exit_breakdown.time_exit,
            self.exit_breakdown.end_of_backtest
        ));

        if let Some(ref warning) = self.warning {
            out.push_str(&format!("\nWarning: {}\n", warning));
        }

        out.push_str(&format!("\n{}\n", rule));
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
