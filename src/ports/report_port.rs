//! Report generation port trait.

use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestRun;
use crate::domain::error::BacktestError;

/// Port for persisting the outputs of a backtest run.
pub trait ReportPort {
    /// Write all report files under `output_dir`, returning their paths.
    fn write(&self, run: &BacktestRun, output_dir: &Path) -> Result<Vec<PathBuf>, BacktestError>;
}
