//! Error handling and custom error types
//!
//! Every failure an analysis can end in is one variant of [`Error`]. None of
//! them carry partial results.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Authentication failed (401): {message}")]
    Auth { message: String },

    #[error("Rate limit exceeded (429): {message}")]
    RateLimit { message: String },

    #[error("Bad request (400): {message}")]
    BadRequest { message: String },

    #[error("Endpoint not found (404): {message}")]
    NotFound { message: String },

    #[error("API error (status {status}): {message}")]
    Unknown {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed API response: {0}")]
    Transport(String),

    #[error("Invalid response format: {0}")]
    Validation(String),
}

impl Error {
    /// Only rate limiting is worth another attempt.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
