//! Error type definitions for tvtv2xmltv
//!
//! Run-level failures (`AppError`, `SourceError`) abort the generation, while
//! `SkipReason` describes why a single programme was left out of the guide.

use thiserror::Error;

/// Top-level application error type
///
/// Every variant is fatal for the run: the guide is only useful when the
/// lineup and every requested day of grid data could be fetched.
#[derive(Error, Debug)]
pub enum AppError {
    /// Listing service errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output file errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Listing service specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Non-success HTTP status from the listing service
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// Grid response has fewer per-channel entries than the lineup
    #[error("Grid misaligned: expected {expected} channel entries, got {actual}")]
    GridMisaligned { expected: usize, actual: usize },
}

/// Why a single programme record was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Grid cell is not a programme object
    #[error("malformed programme record: {message}")]
    MalformedRecord { message: String },

    #[error("missing start time")]
    MissingStartTime,

    #[error("invalid start time '{input}'")]
    InvalidStartTime { input: String },

    #[error("invalid run time '{input}'")]
    InvalidRunTime { input: String },

    /// Stop time overflowed the representable range
    #[error("run time '{input}' puts the stop time out of range")]
    OutOfRange { input: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an HTTP status error from the listing service
    pub fn http_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Source(SourceError::Http {
            status,
            message: message.into(),
        })
    }

    /// Create a parse error for a listing response
    pub fn parse_error<T: Into<String>, S: Into<String>>(source_type: T, message: S) -> Self {
        Self::Source(SourceError::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        })
    }
}
