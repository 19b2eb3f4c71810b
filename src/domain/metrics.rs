//! Performance summary of a simulated run.

use super::error::BacktestError;
use super::simulation::Simulation;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Run summary. Fields hold full precision; use [`SummaryRecord::rounded`]
/// for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRecord {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
}

impl SummaryRecord {
    pub fn compute(
        total_values: &[f64],
        initial_capital: f64,
        trade_count: usize,
    ) -> Result<Self, BacktestError> {
        let final_value = *total_values.last().ok_or(BacktestError::EmptySeries)?;

        let returns = bar_returns(total_values);

        Ok(SummaryRecord {
            initial_capital,
            final_value,
            total_return_pct: (final_value / initial_capital - 1.0) * 100.0,
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown_pct: max_drawdown(total_values) * 100.0,
            trade_count,
        })
    }

    pub fn from_simulation(sim: &Simulation) -> Result<Self, BacktestError> {
        Self::compute(&sim.total_values(), sim.initial_cash, sim.trades.len())
    }

    /// Copy with every numeric field rounded to two decimals.
    pub fn rounded(&self) -> Self {
        SummaryRecord {
            initial_capital: round2(self.initial_capital),
            final_value: round2(self.final_value),
            total_return_pct: round2(self.total_return_pct),
            sharpe_ratio: round2(self.sharpe_ratio),
            max_drawdown_pct: round2(self.max_drawdown_pct),
            trade_count: self.trade_count,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// value[i] / value[i-1] - 1 for i >= 1.
pub fn bar_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// mean / sample stddev * sqrt(252); 0 when fewer than two returns or no
/// variation.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev == 0.0 || !stddev.is_finite() {
        return 0.0;
    }
    mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Worst value / running_peak - 1 as a fraction in [-1, 0].
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            worst = worst.min(v / peak - 1.0);
        }
    }

    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn summary_of_scenario() {
        let values = [1000.0, 1000.0, 1200.0, 1200.0, 900.0];
        let s = SummaryRecord::compute(&values, 1000.0, 2).unwrap();
        assert_relative_eq!(s.final_value, 900.0);
        assert_relative_eq!(s.total_return_pct, -10.0, epsilon = 1e-9);
        assert_relative_eq!(s.max_drawdown_pct, -25.0, epsilon = 1e-9);
        assert_eq!(s.trade_count, 2);
        assert!(s.sharpe_ratio < 0.0);
    }

    #[test]
    fn empty_values_fail() {
        assert!(matches!(
            SummaryRecord::compute(&[], 1000.0, 0),
            Err(BacktestError::EmptySeries)
        ));
    }

    #[test]
    fn single_bar_summary() {
        let s = SummaryRecord::compute(&[1000.0], 1000.0, 0).unwrap();
        assert_relative_eq!(s.total_return_pct, 0.0);
        assert_relative_eq!(s.sharpe_ratio, 0.0);
        assert_relative_eq!(s.max_drawdown_pct, 0.0);
    }

    #[test]
    fn flat_values_have_zero_sharpe() {
        let values = vec![1000.0; 30];
        let s = SummaryRecord::compute(&values, 1000.0, 0).unwrap();
        assert_eq!(s.sharpe_ratio, 0.0);
        assert_eq!(s.max_drawdown_pct, 0.0);
    }

    #[test]
    fn constant_growth_has_zero_sharpe() {
        // identical returns → zero variance
        let values: Vec<f64> = (0..10).map(|i| 100.0 * 2f64.powi(i)).collect();
        assert_eq!(sharpe_ratio(&bar_returns(&values)), 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        let returns = [0.01, -0.01, 0.02];
        let mean: f64 = 0.02 / 3.0;
        let var = ((0.01 - mean).powi(2) + (-0.01 - mean).powi(2) + (0.02 - mean).powi(2)) / 2.0;
        let expected = mean / var.sqrt() * 252f64.sqrt();
        assert_relative_eq!(sharpe_ratio(&returns), expected, epsilon = 1e-12);
    }

    #[test]
    fn bar_returns_basic() {
        let r = bar_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        let dd = max_drawdown(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        assert_relative_eq!(dd, 80.0 / 110.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_rise_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn rounded_keeps_two_decimals() {
        let s = SummaryRecord {
            initial_capital: 100000.0,
            final_value: 123456.789,
            total_return_pct: 23.456789,
            sharpe_ratio: 1.23456,
            max_drawdown_pct: -12.3456,
            trade_count: 7,
        };
        let r = s.rounded();
        assert_relative_eq!(r.final_value, 123456.79);
        assert_relative_eq!(r.total_return_pct, 23.46);
        assert_relative_eq!(r.sharpe_ratio, 1.23);
        assert_relative_eq!(r.max_drawdown_pct, -12.35);
        assert_eq!(r.trade_count, 7);
        assert_relative_eq!(s.final_value, 123456.789);
    }
}
