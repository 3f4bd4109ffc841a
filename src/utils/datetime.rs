//! Centralized datetime handling utilities
//!
//! Parsing of the listing service's timestamps, resolution of IANA zone
//! identifiers and the two output formats used in the guide:
//!
//! - XMLTV programme times: `20240101000000 +0000`
//! - Request windows and the document date: `2024-01-01T00:00:00.000Z`
//!
//! # Usage
//!
//! ```rust
//! use tvtv2xmltv::utils::datetime::DateTimeParser;
//!
//! let start = DateTimeParser::parse_flexible("2024-01-01T00:00:00Z").unwrap();
//! let tz = DateTimeParser::parse_timezone("UTC").unwrap();
//! assert_eq!(
//!     DateTimeParser::format_xmltv(&start.with_timezone(&tz)),
//!     "20240101000000 +0000"
//! );
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;
use thiserror::Error;

/// XMLTV `start`/`stop` attribute format
pub const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Millisecond-precision UTC format used for grid windows and the document date
pub const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Errors that can occur during datetime operations
#[derive(Error, Debug)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected RFC3339 (2024-01-01T00:00:00Z) or an ISO-like local time")]
    InvalidFormat { input: String },

    /// Timezone identifier is not in the IANA database
    #[error("Failed to parse timezone from: {input}")]
    TimezoneParseError { input: String },
}

/// Centralized datetime parsing and formatting utilities
pub struct DateTimeParser;

impl DateTimeParser {
    /// Parse a listing timestamp into an absolute UTC instant
    ///
    /// Supports:
    /// - RFC3339 with `Z` or an explicit offset: "2024-01-01T00:00:00Z"
    /// - ISO without seconds: "2024-01-01T00:00Z"
    /// - Naive forms (assumed UTC): "2024-01-01T00:00:00", "2024-01-01 00:00:00"
    pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
        let trimmed = datetime_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive_formats = [
            "%Y-%m-%dT%H:%M:%S%.fZ",
            "%Y-%m-%dT%H:%MZ",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
        ];

        for format in &naive_formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        Err(DateTimeError::InvalidFormat {
            input: datetime_str.to_string(),
        })
    }

    /// Resolve an IANA zone identifier such as `America/Chicago`
    pub fn parse_timezone(tz_str: &str) -> Result<Tz, DateTimeError> {
        tz_str
            .trim()
            .parse::<Tz>()
            .map_err(|_| DateTimeError::TimezoneParseError {
                input: tz_str.to_string(),
            })
    }

    /// Format a zoned time for XMLTV `start`/`stop` attributes
    pub fn format_xmltv<T: TimeZone>(dt: &DateTime<T>) -> String
    where
        T::Offset: Display,
    {
        dt.format(XMLTV_TIME_FORMAT).to_string()
    }

    /// Format a UTC instant with millisecond precision
    pub fn format_api(dt: &DateTime<Utc>) -> String {
        dt.format(API_TIME_FORMAT).to_string()
    }
}
