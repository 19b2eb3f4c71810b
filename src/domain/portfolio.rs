//! All-in/all-out portfolio state and the trades it produces.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }

    /// Per-bar label: "BUY", "SELL", or "" when nothing executed.
    pub fn label(action: Option<Action>) -> &'static str {
        action.map(|a| a.as_str()).unwrap_or("")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An executed transition. Appended once, never modified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: Action,
    pub price: f64,
    pub shares: f64,
}

/// Cash plus units held. Either fully in cash or fully invested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub holdings: f64,
}

impl PortfolioState {
    pub fn new(initial_cash: f64) -> Self {
        PortfolioState {
            cash: initial_cash,
            holdings: 0.0,
        }
    }

    pub fn holdings_value(&self, price: f64) -> f64 {
        self.holdings * price
    }

    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.holdings_value(price)
    }

    /// Convert all cash to units at `price`. No-op without cash.
    pub fn buy_all(&mut self, date: NaiveDate, price: f64) -> Option<Trade> {
        if self.cash <= 0.0 {
            return None;
        }
        let shares = self.cash / price;
        self.holdings = shares;
        self.cash = 0.0;
        Some(Trade {
            date,
            action: Action::Buy,
            price,
            shares,
        })
    }

    /// Convert all units to cash at `price`. No-op without holdings.
    pub fn sell_all(&mut self, date: NaiveDate, price: f64) -> Option<Trade> {
        if self.holdings <= 0.0 {
            return None;
        }
        let shares = self.holdings;
        self.cash = shares * price;
        self.holdings = 0.0;
        Some(Trade {
            date,
            action: Action::Sell,
            price,
            shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn new_state_is_all_cash() {
        let state = PortfolioState::new(1000.0);
        assert_relative_eq!(state.cash, 1000.0);
        assert_relative_eq!(state.holdings, 0.0);
        assert_relative_eq!(state.total_value(50.0), 1000.0);
    }

    #[test]
    fn buy_all_converts_cash() {
        let mut state = PortfolioState::new(1000.0);
        let trade = state.buy_all(date(), 10.0).unwrap();
        assert_eq!(trade.action, Action::Buy);
        assert_relative_eq!(trade.shares, 100.0);
        assert_relative_eq!(trade.price, 10.0);
        assert_relative_eq!(state.cash, 0.0);
        assert_relative_eq!(state.holdings, 100.0);
        assert_relative_eq!(state.holdings_value(12.0), 1200.0);
    }

    #[test]
    fn buy_while_invested_is_noop() {
        let mut state = PortfolioState::new(1000.0);
        state.buy_all(date(), 10.0);
        let before = state;
        assert!(state.buy_all(date(), 8.0).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn sell_all_converts_holdings() {
        let mut state = PortfolioState::new(1000.0);
        state.buy_all(date(), 10.0);
        let trade = state.sell_all(date(), 9.0).unwrap();
        assert_eq!(trade.action, Action::Sell);
        assert_relative_eq!(trade.shares, 100.0);
        assert_relative_eq!(state.cash, 900.0);
        assert_relative_eq!(state.holdings, 0.0);
    }

    #[test]
    fn sell_while_flat_is_noop() {
        let mut state = PortfolioState::new(1000.0);
        assert!(state.sell_all(date(), 9.0).is_none());
        assert_eq!(state, PortfolioState::new(1000.0));
    }

    #[test]
    fn action_labels() {
        assert_eq!(Action::label(Some(Action::Buy)), "BUY");
        assert_eq!(Action::label(Some(Action::Sell)), "SELL");
        assert_eq!(Action::label(None), "");
        assert_eq!(Action::Sell.to_string(), "SELL");
    }
}
