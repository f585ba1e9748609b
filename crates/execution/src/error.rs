// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The exchange refused the order or the call never completed.
    /// `payload` is the raw exchange error body, or the local error text.
    #[error("Order rejected: {payload}")]
    OrderRejected { payload: String },
}

impl From<api_client::Error> for Error {
    fn from(err: api_client::Error) -> Self {
        let payload = match err {
            api_client::Error::ApiError { body, .. } => body,
            other => other.to_string(),
        };
        Error::OrderRejected { payload }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
