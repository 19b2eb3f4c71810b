//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for strategy-gamble.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("empty price series: no final value to summarise")]
    EmptySeries,

    #[error("position series has {positions} values but price series has {prices} bars")]
    LengthMismatch { prices: usize, positions: usize },

    #[error("dates not strictly increasing at bar {index}: {current} follows {previous}")]
    NonMonotonicDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) | BacktestError::Report { .. } => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. }
            | BacktestError::InvalidParameter { .. } => 2,
            BacktestError::PriceData { .. } | BacktestError::Csv(_) => 3,
            BacktestError::LengthMismatch { .. } | BacktestError::NonMonotonicDates { .. } => 4,
            BacktestError::EmptySeries => 5,
        };
        std::process::ExitCode::from(code)
    }
}
