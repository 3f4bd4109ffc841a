//! tvtv2xmltv
//!
//! Fetches a broadcast lineup and up to eight days of programme grids from
//! tvtv.us and writes them as a single XMLTV document.

pub mod config;
pub mod epg;
pub mod errors;
pub mod models;
pub mod sources;
pub mod utils;

pub use errors::{AppError, AppResult};
