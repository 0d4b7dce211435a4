//! Unified error types for newsstand.

use crate::envelope::{ErrorInfo, ErrorSource};
use tokio_rusqlite::rusqlite;

/// Unified error types for the newsstand resolution engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., missing query term, bad timestamp).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No cached search matches the given filter set where one is required.
    #[error("no cached search for the given filters: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// A stored cache entry could not be decoded.
    #[error("corrupt cache entry: {0}")]
    CorruptEntry(String),

    /// The upstream news API returned a non-2xx response. Provider status,
    /// code and message are carried through verbatim.
    #[error("news api error (status {status}): {code:?}: {message:?}")]
    Upstream { status: u16, code: Option<String>, message: Option<String> },

    /// All-pages aggregation would exceed the configured result ceiling.
    #[error("unable to collect articles for search with over {ceiling} results (reported {total_results})")]
    TooManyResults { total_results: u32, ceiling: u32 },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    /// Which side of the system boundary the failure originated on.
    pub fn error_source(&self) -> ErrorSource {
        match self {
            Error::Upstream { .. } | Error::TooManyResults { .. } => ErrorSource::External,
            _ => ErrorSource::Internal,
        }
    }

    /// Best-effort HTTP status to report in the response envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::CacheMiss(_) => 404,
            Error::Upstream { status, .. } => *status,
            Error::TooManyResults { .. } => 426,
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptEntry(_) | Error::Config(_) => 500,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for ErrorInfo {
    fn from(err: Error) -> Self {
        ErrorInfo {
            error_source: Some(err.error_source()),
            status_code: Some(err.status_code()),
            message: Some(err.to_string()),
        }
    }
}
