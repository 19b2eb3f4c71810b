//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod strategy;
pub mod portfolio;
pub mod simulation;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;
