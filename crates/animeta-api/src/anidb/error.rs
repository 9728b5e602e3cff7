use animeta_core::error::ParseError;
use thiserror::Error;

/// Errors from the AniDB HTTP API client.
#[derive(Debug, Error)]
pub enum AnidbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// AniDB answered with an `<error>` document instead of an anime.
    #[error("AniDB refused the request: {0}")]
    Refused(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
