//! Daily closing-price bars, the only market data the engine consumes.

use chrono::NaiveDate;

use super::error::BacktestError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PriceBar { date, close }
    }
}

/// Reject any series whose dates are not strictly increasing.
pub fn ensure_ordered(bars: &[PriceBar]) -> Result<(), BacktestError> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(BacktestError::NonMonotonicDates {
                index: i + 1,
                previous: pair[0].date,
                current: pair[1].date,
            });
        }
    }
    Ok(())
}
