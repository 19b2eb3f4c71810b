//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::BacktestError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let kind = read_kind(config)?;
    match kind {
        StrategyKind::SmaEma => {
            validate_window(config, "sma_window")?;
            validate_window(config, "ema_window")?;
        }
        StrategyKind::Rsi => {
            validate_window(config, "rsi_window")?;
            validate_thresholds(config)?;
        }
    }
    Ok(())
}

/// Parse `[section] key` as `T`; `Ok(None)` when absent or blank.
pub fn read_number<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, BacktestError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| BacktestError::config_invalid(section, key, format!("'{}' is not a number", s))),
        _ => Ok(None),
    }
}

/// Parse an optional `[backtest]` date in YYYY-MM-DD form.
pub fn read_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, BacktestError> {
    match config.get_string("backtest", key) {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                BacktestError::config_invalid(
                    "backtest",
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
        _ => Ok(None),
    }
}

/// Strategy kind from `[strategy] kind`, defaulting to the crossover.
pub fn read_kind(config: &dyn ConfigPort) -> Result<StrategyKind, BacktestError> {
    match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s
            .parse::<StrategyKind>()
            .map_err(|reason| BacktestError::config_invalid("strategy", "kind", reason)),
        _ => Ok(StrategyKind::SmaEma),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    if let Some(value) = read_number::<f64>(config, "backtest", "initial_capital")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(BacktestError::config_invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let start = read_date(config, "start_date")?;
    let end = read_date(config, "end_date")?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(BacktestError::config_invalid(
                "backtest",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort, key: &str) -> Result<(), BacktestError> {
    if let Some(value) = read_number::<i64>(config, "strategy", key)? {
        if value < 1 {
            return Err(BacktestError::config_invalid(
                "strategy",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let buy = read_number::<f64>(config, "strategy", "rsi_buy")?;
    let exit = read_number::<f64>(config, "strategy", "rsi_exit")?;

    for (key, value) in [("rsi_buy", buy), ("rsi_exit", exit)] {
        if let Some(v) = value {
            if !(0.0..=100.0).contains(&v) {
                return Err(BacktestError::config_invalid(
                    "strategy",
                    key,
                    format!("{} must be between 0 and 100", key),
                ));
            }
        }
    }

    let buy = buy.unwrap_or(crate::domain::strategy::DEFAULT_RSI_BUY);
    let exit = exit.unwrap_or(crate::domain::strategy::DEFAULT_RSI_EXIT);
    if buy > exit {
        return Err(BacktestError::config_invalid(
            "strategy",
            "rsi_buy",
            "rsi_buy must not exceed rsi_exit",
        ));
    }
    Ok(())
}
