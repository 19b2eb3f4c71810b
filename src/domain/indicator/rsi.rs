//! RSI-style momentum oscillator.
//!
//! Average gain and average loss are simple means of the last n bar-to-bar
//! changes (no Wilder smoothing):
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! When avg_loss == 0 the ratio is undefined and the bar is marked invalid
//! rather than saturating to 100. Callers treat an invalid bar as "no signal".
//!
//! Warmup: first n bars are invalid (n changes need n+1 closes). Bar n-1 has
//! only n-1 real changes; it is not defined by padding the missing first
//! change with 0, so the first value appears one bar later than a zero-filled
//! rolling mean would give.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    // changes[k] is the move into bar k+1
    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint::invalid(bars[0].date));

    for (i, bar) in bars.iter().enumerate().skip(1) {
        if i < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let window = &changes[i - period..i];
        let avg_gain = window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
        let avg_loss = -window.iter().filter(|&&c| c < 0.0).sum::<f64>() / period as f64;

        match oscillator(avg_gain, avg_loss) {
            Some(rsi) => values.push(IndicatorPoint::valid(bar.date, rsi)),
            None => values.push(IndicatorPoint::invalid(bar.date)),
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// 100 - 100/(1 + gain/loss); `None` when the loss average is zero.
pub fn oscillator(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return None;
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
