//! Backtest core: the risk-managed engine, signal-driven simulation
//! backends, performance analytics, and report assembly.

pub mod engine;
pub mod metrics;
pub mod position;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod sizing;

pub use engine::{BacktestEngine, BacktestRun};
pub use metrics::{
    significance_warning, ConfidenceLevel, EquityPoint, ExitBreakdown, ExitReason,
    PerformanceSummary, Trade, TradeStatistics,
};
pub use position::PositionState;
pub use report::{BacktestReport, ConfigSummary};
pub use runner::{run_strategy_comparison, StrategyComparison, RISK_MANAGED_LABEL};
pub use simulation::{BackendKind, SimulationBackend, SimulationResult};
pub use sizing::position_size;
