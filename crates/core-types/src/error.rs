// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid symbol '{0}': expected a non-empty alphanumeric pair such as BTCUSDT")]
    InvalidSymbol(String),

    #[error("Unsupported kline interval '{0}'")]
    InvalidInterval(String),

    #[error("Invalid order side '{0}': expected BUY or SELL")]
    InvalidSide(String),
}

pub type Result<T> = std::result::Result<T, Error>;
