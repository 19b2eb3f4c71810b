//! CSV report adapter implementing ReportPort.
//!
//! Writes three files per run:
//! - `trade_log.csv`: `Date,Action,Price,Shares`
//! - `strategy_summary.csv`: one row, numbers rounded to two decimals
//! - `backtest_series.csv`: the price series augmented with indicator,
//!   signal and portfolio columns

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::BacktestError;
use crate::domain::metrics::SummaryRecord;
use crate::domain::portfolio::Trade;
use crate::ports::report_port::ReportPort;

pub const TRADE_LOG_FILE: &str = "trade_log.csv";
pub const SUMMARY_FILE: &str = "strategy_summary.csv";
pub const SERIES_FILE: &str = "backtest_series.csv";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

#[derive(Serialize)]
struct TradeRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Action")]
    action: &'static str,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Shares")]
    shares: f64,
}

#[derive(Serialize)]
struct SummaryRow {
    #[serde(rename = "Initial Capital")]
    initial_capital: f64,
    #[serde(rename = "Final Portfolio Value")]
    final_value: f64,
    #[serde(rename = "Total Return (%)")]
    total_return_pct: f64,
    #[serde(rename = "Sharpe Ratio")]
    sharpe_ratio: f64,
    #[serde(rename = "Max Drawdown")]
    max_drawdown_pct: f64,
    #[serde(rename = "Total Trades")]
    trade_count: usize,
}

impl From<&SummaryRecord> for SummaryRow {
    fn from(summary: &SummaryRecord) -> Self {
        let r = summary.rounded();
        SummaryRow {
            initial_capital: r.initial_capital,
            final_value: r.final_value,
            total_return_pct: r.total_return_pct,
            sharpe_ratio: r.sharpe_ratio,
            max_drawdown_pct: r.max_drawdown_pct,
            trade_count: r.trade_count,
        }
    }
}

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }

    pub fn write_trade_log(trades: &[Trade], path: &Path) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_path(path)?;
        if trades.is_empty() {
            wtr.write_record(["Date", "Action", "Price", "Shares"])?;
        }
        for t in trades {
            wtr.serialize(TradeRow {
                date: t.date.to_string(),
                action: t.action.as_str(),
                price: t.price,
                shares: t.shares,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_summary(summary: &SummaryRecord, path: &Path) -> Result<(), BacktestError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.serialize(SummaryRow::from(summary))?;
        wtr.flush()?;
        Ok(())
    }

    pub fn write_series(run: &BacktestRun, path: &Path) -> Result<(), BacktestError> {
        let frame = &run.frame;
        let sim = &run.simulation;
        if frame.len() != sim.bars.len() {
            return Err(BacktestError::Report {
                reason: format!(
                    "strategy frame has {} bars but simulation has {}",
                    frame.len(),
                    sim.bars.len()
                ),
            });
        }

        let mut wtr = csv::Writer::from_path(path)?;

        let mut header = vec!["Date".to_string(), "Close".to_string()];
        header.extend(frame.indicators.iter().map(|s| s.indicator_type.to_string()));
        header.extend(
            ["Signal", "Position", "Cash", "Holdings", "Total Value", "Buy/Sell"]
                .iter()
                .map(|s| s.to_string()),
        );
        wtr.write_record(&header)?;

        for (i, bar) in sim.bars.iter().enumerate() {
            let mut record = vec![bar.date.to_string(), bar.close.to_string()];
            record.extend(
                frame
                    .indicators
                    .iter()
                    .map(|s| s.get(i).map(|v| v.to_string()).unwrap_or_default()),
            );
            record.push(frame.signal[i].to_string());
            record.push(frame.position[i].to_string());
            record.push(bar.cash.to_string());
            record.push(bar.holdings_value.to_string());
            record.push(bar.total_value.to_string());
            record.push(bar.label().to_string());
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, run: &BacktestRun, output_dir: &Path) -> Result<Vec<PathBuf>, BacktestError> {
        fs::create_dir_all(output_dir).map_err(|e| BacktestError::Report {
            reason: format!("failed to create {}: {}", output_dir.display(), e),
        })?;

        let trade_log = output_dir.join(TRADE_LOG_FILE);
        Self::write_trade_log(&run.simulation.trades, &trade_log)?;
        info!(path = %trade_log.display(), "trade log saved");

        let summary = output_dir.join(SUMMARY_FILE);
        Self::write_summary(&run.summary, &summary)?;
        info!(path = %summary.display(), "summary saved");

        let series = output_dir.join(SERIES_FILE);
        Self::write_series(run, &series)?;
        info!(path = %series.display(), "series saved");

        Ok(vec![trade_log, summary, series])
    }
}
