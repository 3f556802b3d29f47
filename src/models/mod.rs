//! Data models for trade inputs and calculation results.

mod config;
mod result;

pub use config::{ConfigFile, MarginMode, PositionSide, TradeConfig, MAX_LEVERAGE, MIN_LEVERAGE};
pub use result::{DcaLevel, RiskLevel, TradeResult, MEDIUM_DISTANCE_PCT, SAFE_DISTANCE_PCT};
