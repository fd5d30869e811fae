//! Multi-strategy comparison runner.
//!
//! Each run owns its ledger and equity curve with zero shared mutable state,
//! so the variants are embarrassingly parallel and execute on a rayon pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::engine::BacktestEngine;
use super::report::BacktestReport;
use super::simulation::BackendKind;
use crate::config::StrategyConfig;
use crate::data::PriceSeries;
use crate::strategy::StrategyKind;
use protrader_common::Result;

/// Label used for the risk-managed engine entry in comparisons.
pub const RISK_MANAGED_LABEL: &str = "Risk-Managed RSI + MACD";

/// Results of running every strategy variant over the same series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparison {
    /// One report per variant, in a fixed order
    pub reports: Vec<BacktestReport>,
    /// Name of the variant with the best Sharpe ratio
    pub best_strategy: Option<String>,
    /// Human-readable recommendation
    pub recommendation: Option<String>,
}

/// Run the three signal-driven variants plus the risk-managed engine over
/// one series and rank them by Sharpe ratio.
pub fn run_strategy_comparison(
    series: &PriceSeries,
    config: &StrategyConfig,
    backend: BackendKind,
) -> Result<StrategyComparison> {
    config.validate()?;
    series.ensure_min_len(config.warmup_bars + 1)?;

    enum Job {
        Signal(StrategyKind),
        RiskManaged,
    }

    let mut jobs: Vec<Job> = StrategyKind::all().into_iter().map(Job::Signal).collect();
    jobs.push(Job::RiskManaged);

    let reports: Vec<BacktestReport> = jobs
        .par_iter()
        .map(|job| -> Result<BacktestReport> {
            match job {
                Job::Signal(kind) => {
                    let strategy = kind.build(config);
                    let signals = strategy.signals(series);
                    let result = backend.build().run(series, &signals, config);
                    Ok(BacktestReport::generate(
                        strategy.name(),
                        config,
                        series,
                        result.trades,
                        result.equity_curve,
                        result.final_capital,
                    ))
                }
                Job::RiskManaged => {
                    let engine = BacktestEngine::new(config.clone())?;
                    let run = engine.run(series)?;
                    Ok(BacktestReport::generate(
                        RISK_MANAGED_LABEL,
                        config,
                        series,
                        run.trades,
                        run.equity_curve,
                        run.final_capital,
                    ))
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let best = reports
        .iter()
        .max_by(|a, b| {
            a.performance
                .sharpe_ratio
                .total_cmp(&b.performance.sharpe_ratio)
        })
        .map(|r| r.strategy.clone());

    let recommendation = best
        .as_ref()
        .map(|name| format!("Based on Sharpe ratio, {} performed best", name));

    if let Some(ref name) = best {
        tracing::info!(best = %name, variants = reports.len(), "Strategy comparison complete");
    }

    Ok(StrategyComparison {
        reports,
        best_strategy: best,
        recommendation,
    })
}

// ============================================================================
// Tests
// ============================================================================
