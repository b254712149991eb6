//! OMDb error types.

use thiserror::Error;

/// Result type for OMDb operations.
pub type OmdbResult<T> = Result<T, OmdbError>;

/// Message used when OMDb reports a failure without saying why.
pub const DEFAULT_NOT_FOUND: &str = "Movie not found";
/// Message used when a non-success response carries no `Error` field.
pub const DEFAULT_API_ERROR: &str = "OMDB API error";

/// OMDb errors.
#[derive(Debug, Error)]
pub enum OmdbError {
    /// OMDb answered with `"Response": "False"`.
    #[error("{0}")]
    NotFound(String),

    /// OMDb answered with a non-success HTTP status.
    #[error("{message}")]
    Api {
        /// Upstream HTTP status.
        status: u16,
        /// Upstream `Error` field, or a generic message.
        message: String,
    },

    /// The request timed out or never reached OMDb.
    #[error("OMDB API timeout or network error")]
    Unavailable(#[source] reqwest::Error),

    /// OMDb answered, but not with the JSON we expect.
    #[error("invalid OMDB API response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl OmdbError {
    /// HTTP status this error should surface as.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Api { status, .. } => *status,
            Self::Unavailable(_) => 503,
            Self::InvalidResponse(_) => 502,
            Self::ClientBuild(_) => 500,
        }
    }

    /// Whether OMDb itself reported the failure.
    pub fn is_upstream_rejection(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api { .. })
    }
}
