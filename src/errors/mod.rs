//! Centralized error handling for tvtv2xmltv
//!
//! # Error Categories
//!
//! - **Configuration Errors**: empty lineup id, unusable base URL, unknown timezone
//! - **Source Errors**: listing service connectivity, status and JSON decoding
//! - **Skip Reasons**: per-programme failures that are logged and never escalate

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
