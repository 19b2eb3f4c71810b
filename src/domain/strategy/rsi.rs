//! RSI threshold strategy with hysteresis.
//!
//! Flat → Holding when the oscillator drops below `buy`; Holding → Flat when it
//! rises above `exit`. Warm-up bars and bars with an undefined oscillator
//! (zero loss average) hold the current state.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::price::PriceBar;

use super::{first_difference, StrategyFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsiState {
    #[default]
    Flat,
    Holding,
}

impl RsiState {
    pub fn transition(self, rsi: Option<f64>, buy: f64, exit: f64) -> RsiState {
        match (self, rsi) {
            (RsiState::Flat, Some(v)) if v < buy => RsiState::Holding,
            (RsiState::Holding, Some(v)) if v > exit => RsiState::Flat,
            (state, _) => state,
        }
    }

    pub fn signal(self) -> u8 {
        match self {
            RsiState::Flat => 0,
            RsiState::Holding => 1,
        }
    }
}

pub fn generate(bars: &[PriceBar], window: usize, buy: f64, exit: f64) -> StrategyFrame {
    let rsi = calculate_rsi(bars, window);
    let signal = signals_from_oscillator(&rsi.to_column(), buy, exit);
    let position = first_difference(&signal);

    StrategyFrame {
        dates: bars.iter().map(|b| b.date).collect(),
        indicators: vec![rsi],
        signal,
        position,
    }
}

/// Run the two-state machine over oscillator values, one signal per bar.
pub fn signals_from_oscillator(values: &[Option<f64>], buy: f64, exit: f64) -> Vec<u8> {
    values
        .iter()
        .scan(RsiState::Flat, |state, &v| {
            *state = state.transition(v, buy, exit);
            Some(state.signal())
        })
        .collect()
}
