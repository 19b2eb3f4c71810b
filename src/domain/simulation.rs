//! Bar-by-bar portfolio simulation.
//!
//! Walks bars in date order, buying with all cash on a +1 position and selling
//! all holdings on a -1 position. Guards keep the portfolio either fully in
//! cash or fully invested regardless of what the position series asks for.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::error::BacktestError;
use super::portfolio::{Action, PortfolioState, Trade};
use super::price::{ensure_ordered, PriceBar};

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

/// Portfolio snapshot after a bar has been processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedBar {
    pub date: NaiveDate,
    pub close: f64,
    pub cash: f64,
    pub holdings: f64,
    pub holdings_value: f64,
    pub total_value: f64,
    pub action: Option<Action>,
}

impl SimulatedBar {
    pub fn label(&self) -> &'static str {
        Action::label(self.action)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub initial_cash: f64,
    pub bars: Vec<SimulatedBar>,
    pub trades: Vec<Trade>,
}

impl Simulation {
    pub fn total_values(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.total_value).collect()
    }

    pub fn final_value(&self) -> Option<f64> {
        self.bars.last().map(|b| b.total_value)
    }
}

/// Simulate all-in/all-out trading over `bars` driven by `positions`.
///
/// `positions` must be aligned with `bars`. Only exact +1 and -1 trade;
/// anything else is a no-op, and non-finite values (missing warm-up data,
/// unparseable input) are treated as 0 with a warning.
pub fn simulate(
    bars: &[PriceBar],
    positions: &[f64],
    initial_cash: f64,
) -> Result<Simulation, BacktestError> {
    if !(initial_cash.is_finite() && initial_cash > 0.0) {
        return Err(BacktestError::InvalidParameter {
            name: "initial_cash".to_string(),
            reason: format!("{} is not a positive amount", initial_cash),
        });
    }
    if positions.len() != bars.len() {
        return Err(BacktestError::LengthMismatch {
            prices: bars.len(),
            positions: positions.len(),
        });
    }
    ensure_ordered(bars)?;

    let mut state = PortfolioState::new(initial_cash);
    let mut out = Vec::with_capacity(bars.len());
    let mut trades = Vec::new();

    for (bar, &raw) in bars.iter().zip(positions) {
        let position = if raw.is_finite() {
            raw
        } else {
            warn!(date = %bar.date, "position value undefined, treating as 0");
            0.0
        };

        let trade = if position == 1.0 {
            state.buy_all(bar.date, bar.close)
        } else if position == -1.0 {
            state.sell_all(bar.date, bar.close)
        } else {
            None
        };

        if let Some(t) = trade {
            debug!(date = %t.date, action = %t.action, price = t.price, shares = t.shares, "trade");
            trades.push(t);
        }

        out.push(SimulatedBar {
            date: bar.date,
            close: bar.close,
            cash: state.cash,
            holdings: state.holdings,
            holdings_value: state.holdings_value(bar.close),
            total_value: state.total_value(bar.close),
            action: trade.map(|t| t.action),
        });
    }

    debug!(bars = out.len(), trades = trades.len(), "simulation complete");

    Ok(Simulation {
        initial_cash,
        bars: out,
        trades,
    })
}
