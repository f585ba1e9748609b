// In crates/web-server/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to bind server address: {0}")]
    ServerBindError(#[source] std::io::Error),

    #[error("Server failed: {0}")]
    ServeError(#[source] std::io::Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Desk(#[from] engine::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::BadRequest(msg) | Error::Desk(engine::Error::InvalidRequest(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            Error::Desk(engine::Error::MarketData(e)) => (StatusCode::BAD_GATEWAY, e.to_string()),
            // The exchange's payload goes back untouched so the user sees the real reason.
            Error::Desk(engine::Error::Order(execution::Error::OrderRejected { payload })) => {
                (StatusCode::BAD_GATEWAY, payload)
            }
            other => {
                tracing::error!(error = %other, "Request failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

