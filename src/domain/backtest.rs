//! Backtest pipeline: prices → strategy frame → simulation → summary.
//!
//! BacktestConfig defines the run parameters.

use chrono::NaiveDate;
use tracing::info;

use super::error::BacktestError;
use super::metrics::SummaryRecord;
use super::price::PriceBar;
use super::simulation::{simulate, Simulation, DEFAULT_INITIAL_CASH};
use super::strategy::{Strategy, StrategyFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub strategy: Strategy,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CASH,
            strategy: Strategy::sma_ema_default(),
            start_date: None,
            end_date: None,
        }
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    pub strategy: Strategy,
    pub frame: StrategyFrame,
    pub simulation: Simulation,
    pub summary: SummaryRecord,
}

/// Generate signals and simulate without summarising; valid on empty input.
pub fn simulate_only(
    bars: &[PriceBar],
    config: &BacktestConfig,
) -> Result<(StrategyFrame, Simulation), BacktestError> {
    let frame = config.strategy.generate(bars)?;
    let simulation = simulate(bars, &frame.position, config.initial_capital)?;
    Ok((frame, simulation))
}

pub fn run_backtest(
    bars: &[PriceBar],
    config: &BacktestConfig,
) -> Result<BacktestRun, BacktestError> {
    let (frame, simulation) = simulate_only(bars, config)?;
    let summary = SummaryRecord::from_simulation(&simulation)?;

    info!(
        strategy = %config.strategy,
        bars = bars.len(),
        trades = summary.trade_count,
        final_value = summary.final_value,
        "backtest complete"
    );

    Ok(BacktestRun {
        strategy: config.strategy.clone(),
        frame,
        simulation,
        summary,
    })
}
