use animeta_core::error::ParseError;
use thiserror::Error;

/// Errors from the TVDB API client.
#[derive(Debug, Error)]
pub enum TvdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
