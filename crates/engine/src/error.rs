// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied an unusable action, symbol, interval or quantity.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Lookback of {lookback} candles cannot cover the {required}-candle strategy window")]
    LookbackTooShort { lookback: u16, required: usize },

    #[error(transparent)]
    MarketData(#[from] api_client::Error),

    #[error(transparent)]
    Order(#[from] execution::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
