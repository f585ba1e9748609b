// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),

    /// Klines could not be fetched: transport failure, timeout, non-2xx status,
    /// an unreadable payload or an empty series.
    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    /// Transport failure or timeout. Built with the URL stripped, since order URLs are signed.
    #[error("Request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),

    /// The exchange answered with a non-2xx status. `body` is the raw payload.
    #[error("API error: status {status}, body: {body}")]
    ApiError { status: u16, body: String },

    #[error("Failed to sign request: {0}")]
    SigningFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
