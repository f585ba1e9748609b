// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// A mandatory setting (e.g., an exchange credential) is absent or empty.
    #[error("Missing required configuration: {0}")]
    ConfigurationMissing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
