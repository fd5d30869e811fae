//! ProTrader Backtest - CLI entry point.
//!
//! Loads an already-materialized price series from a JSON fixture, runs a
//! single strategy or the full comparison, and prints the report as JSON or
//! plain text.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use protrader_backtest::backtest::{
    run_strategy_comparison, BackendKind, BacktestEngine, BacktestReport, RISK_MANAGED_LABEL,
};
use protrader_backtest::config::StrategyConfig;
use protrader_backtest::data::load_series;
use protrader_backtest::strategy::StrategyKind;
use protrader_common::logging::init_logging;

/// Strategy selection on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// RSI mean reversion (signal-driven)
    Rsi,
    /// MACD crossover (signal-driven)
    Macd,
    /// Combined RSI + MACD (signal-driven)
    Combined,
    /// Risk-managed engine with stops, targets, and sizing
    RiskManaged,
    /// Run every variant and rank by Sharpe ratio
    All,
}

#[derive(Debug, Parser)]
#[command(name = "protrader-backtest", version, about)]
struct Cli {
    /// Path to a JSON price-series fixture
    #[arg(long)]
    data: PathBuf,

    /// Strategy to run
    #[arg(long, value_enum, default_value = "risk-managed")]
    strategy: StrategyArg,

    /// Simulation backend for signal-driven strategies
    #[arg(long, value_enum, default_value = "vectorized")]
    backend: Backend,

    /// Initial capital
    #[arg(long, default_value_t = 100_000.0)]
    capital: f64,

    /// Print the plain-text report instead of JSON
    #[arg(long)]
    text: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (pretty, json)
    #[arg(long, default_value = "pretty")]
    log_format: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Loop,
    Vectorized,
}

impl From<Backend> for BackendKind {
    fn from(value: Backend) -> Self {
        match value {
            Backend::Loop => BackendKind::Loop,
            Backend::Vectorized => BackendKind::Vectorized,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, &cli.log_format);
    tracing::info!("ProTrader Backtest v{}", env!("CARGO_PKG_VERSION"));

    let series = load_series(&cli.data)?;
    tracing::info!(
        bars = series.len(),
        from = %series.first().date,
        to = %series.last().date,
        "Price series loaded"
    );

    let config = StrategyConfig {
        initial_capital: cli.capital,
        ..StrategyConfig::default()
    };
    let backend: BackendKind = cli.backend.into();

    match cli.strategy {
        StrategyArg::All => {
            let comparison = run_strategy_comparison(&series, &config, backend)?;
            if cli.text {
                for report in &comparison.reports {
                    println!("{}", report.text_report());
                }
                if let Some(ref recommendation) = comparison.recommendation {
                    println!("{}", recommendation);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            }
        }
        StrategyArg::RiskManaged => {
            let engine = BacktestEngine::new(config.clone())?;
            let run = engine.run(&series)?;
            let report = BacktestReport::generate(
                RISK_MANAGED_LABEL,
                &config,
                &series,
                run.trades,
                run.equity_curve,
                run.final_capital,
            );
            print_report(&report, cli.text)?;
        }
        StrategyArg::Rsi | StrategyArg::Macd | StrategyArg::Combined => {
            let kind = match cli.strategy {
                StrategyArg::Rsi => StrategyKind::RsiMeanReversion,
                StrategyArg::Macd => StrategyKind::MacdCrossover,
                _ => StrategyKind::RsiMacdCombined,
            };
            let strategy = kind.build(&config);
            let signals = strategy.signals(&series);
            let result = backend.build().run(&series, &signals, &config);
            let report = BacktestReport::generate(
                strategy.name(),
                &config,
                &series,
                result.trades,
                result.equity_curve,
                result.final_capital,
            );
            print_report(&report, cli.text)?;
        }
    }

    Ok(())
}

fn print_report(report: &BacktestReport, text: bool) -> Result<()> {
    if text {
        println!("{}", report.text_report());
    } else {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}
