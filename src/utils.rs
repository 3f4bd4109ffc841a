//! Utility modules for tvtv2xmltv
//!
//! - `utils::datetime` for timestamp parsing, zone resolution and formatting
//! - `utils::http_client` for the HTTP GET capability
//! - `utils::xml_name` for the XML name encoding applied to listing text

pub mod datetime;
pub mod http_client;
pub mod xml_name;

pub use datetime::{DateTimeError, DateTimeParser};
pub use http_client::{HttpClient, StandardHttpClient};
pub use xml_name::{decode_name, encode_name};
