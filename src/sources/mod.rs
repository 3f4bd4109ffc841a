//! Listing sources
//!
//! `ListingSource` abstracts the lineup and grid endpoints so the guide
//! generator can run against the live tvtv.us service or an in-memory fake.

pub mod traits;
pub mod tvtv;

pub use traits::*;
pub use tvtv::{build_lineup, GridDay, TvtvSource};
