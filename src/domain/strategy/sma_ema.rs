//! SMA/EMA crossover: invested while EMA(span) is above SMA(window).

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price::PriceBar;

use super::{first_difference, StrategyFrame};

pub fn generate(bars: &[PriceBar], sma_window: usize, ema_window: usize) -> StrategyFrame {
    let sma = calculate_sma(bars, sma_window);
    let ema = calculate_ema(bars, ema_window);

    // Bars without a full SMA window compare as flat.
    let signal: Vec<u8> = (0..bars.len())
        .map(|i| match (ema.get(i), sma.get(i)) {
            (Some(e), Some(s)) if e > s => 1,
            _ => 0,
        })
        .collect();
    let position = first_difference(&signal);

    StrategyFrame {
        dates: bars.iter().map(|b| b.date).collect(),
        indicators: vec![sma, ema],
        signal,
        position,
    }
}
