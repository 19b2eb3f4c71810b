//! Signal generators: turn a price series into per-bar exposure.
//!
//! Each variant produces a [`StrategyFrame`] holding the indicator columns it
//! computed, the 0/1 exposure `signal`, and its first difference `position`
//! (+1 enter, -1 exit, 0 unchanged) which drives the simulator.

pub mod rsi;
pub mod sma_ema;

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::BacktestError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::price::PriceBar;

pub const DEFAULT_SMA_WINDOW: usize = 50;
pub const DEFAULT_EMA_WINDOW: usize = 20;
pub const DEFAULT_RSI_WINDOW: usize = 14;
pub const DEFAULT_RSI_BUY: f64 = 30.0;
pub const DEFAULT_RSI_EXIT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFrame {
    pub dates: Vec<NaiveDate>,
    pub indicators: Vec<IndicatorSeries>,
    pub signal: Vec<u8>,
    pub position: Vec<f64>,
}

impl StrategyFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    SmaEma {
        sma_window: usize,
        ema_window: usize,
    },
    Rsi {
        window: usize,
        buy: f64,
        exit: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    SmaEma,
    Rsi,
}

impl Strategy {
    pub fn sma_ema_default() -> Self {
        Strategy::SmaEma {
            sma_window: DEFAULT_SMA_WINDOW,
            ema_window: DEFAULT_EMA_WINDOW,
        }
    }

    pub fn rsi_default() -> Self {
        Strategy::Rsi {
            window: DEFAULT_RSI_WINDOW,
            buy: DEFAULT_RSI_BUY,
            exit: DEFAULT_RSI_EXIT,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::SmaEma { .. } => StrategyKind::SmaEma,
            Strategy::Rsi { .. } => StrategyKind::Rsi,
        }
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        match *self {
            Strategy::SmaEma {
                sma_window,
                ema_window,
            } => {
                require_positive("sma_window", sma_window)?;
                require_positive("ema_window", ema_window)
            }
            Strategy::Rsi { window, buy, exit } => {
                require_positive("rsi_window", window)?;
                require_threshold("rsi_buy", buy)?;
                require_threshold("rsi_exit", exit)?;
                if buy > exit {
                    return Err(BacktestError::InvalidParameter {
                        name: "rsi_buy".to_string(),
                        reason: format!("{} is above rsi_exit {}", buy, exit),
                    });
                }
                Ok(())
            }
        }
    }

    /// Compute indicators, signal and position for every bar.
    pub fn generate(&self, bars: &[PriceBar]) -> Result<StrategyFrame, BacktestError> {
        self.validate()?;
        let frame = match *self {
            Strategy::SmaEma {
                sma_window,
                ema_window,
            } => sma_ema::generate(bars, sma_window, ema_window),
            Strategy::Rsi { window, buy, exit } => rsi::generate(bars, window, buy, exit),
        };
        Ok(frame)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SmaEma {
                sma_window,
                ema_window,
            } => write!(f, "SMA({})/EMA({}) crossover", sma_window, ema_window),
            Strategy::Rsi { window, buy, exit } => {
                write!(f, "RSI({}) buy<{} exit>{}", window, buy, exit)
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::SmaEma => write!(f, "sma_ema"),
            StrategyKind::Rsi => write!(f, "rsi"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sma_ema" | "sma" | "ema" | "crossover" => Ok(StrategyKind::SmaEma),
            "rsi" => Ok(StrategyKind::Rsi),
            other => Err(format!(
                "unknown strategy '{}' (expected sma_ema or rsi)",
                other
            )),
        }
    }
}

/// First difference of a 0/1 signal; the first bar resolves to 0.
pub fn first_difference(signal: &[u8]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let mut position = Vec::with_capacity(signal.len());
    position.push(0.0);
    position.extend(signal.windows(2).map(|w| w[1] as f64 - w[0] as f64));
    position
}

fn require_positive(name: &str, value: usize) -> Result<(), BacktestError> {
    if value == 0 {
        return Err(BacktestError::InvalidParameter {
            name: name.to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }
    Ok(())
}

fn require_threshold(name: &str, value: f64) -> Result<(), BacktestError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(BacktestError::InvalidParameter {
            name: name.to_string(),
            reason: format!("{} is outside [0, 100]", value),
        });
    }
    Ok(())
}
