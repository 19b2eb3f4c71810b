//! Exponential Moving Average indicator.
//!
//! alpha = 2/(span+1), seeded with the first close, then
//! EMA[i] = C[i]*alpha + EMA[i-1]*(1-alpha).
//! Valid from the first bar; there is no warm-up.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceBar;

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

pub fn calculate_ema(bars: &[PriceBar], span: usize) -> IndicatorSeries {
    if span == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let alpha = smoothing_factor(span);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = bars[0].close;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            ema = bar.close * alpha + ema * (1.0 - alpha);
        }
        values.push(IndicatorPoint::valid(bar.date, ema));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PriceBar::new(NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(), close)
            })
            .collect()
    }

    #[test]
    fn ema_seeded_with_first_close() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0, 30.0]), 3);
        assert!(series.values.iter().all(|p| p.valid));
        assert_relative_eq!(series.get(0).unwrap(), 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0, 30.0, 40.0]), 3);
        let k = 0.5;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);
        assert_relative_eq!(series.get(1).unwrap(), e1);
        assert_relative_eq!(series.get(2).unwrap(), e2);
        assert_relative_eq!(series.get(3).unwrap(), e3);
    }

    #[test]
    fn ema_span_1_tracks_close() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0, 5.0]), 1);
        assert_eq!(series.to_column(), vec![Some(10.0), Some(20.0), Some(5.0)]);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&make_bars(&[100.0; 6]), 4);
        for v in series.to_column() {
            assert_relative_eq!(v.unwrap(), 100.0);
        }
    }

    #[test]
    fn ema_span_0_is_all_invalid() {
        let series = calculate_ema(&make_bars(&[10.0, 20.0]), 0);
        assert_eq!(series.to_column(), vec![None, None]);
    }

    #[test]
    fn ema_empty_bars() {
        assert!(calculate_ema(&[], 3).is_empty());
    }

    #[test]
    fn ema_smoothing_factor() {
        assert_relative_eq!(smoothing_factor(10), 2.0 / 11.0);
    }
}
