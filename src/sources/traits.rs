//! Listing source trait definitions

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{DayWindow, Lineup, StationFilter};
use crate::sources::tvtv::GridDay;

/// Source of lineup and programme grid data
///
/// Both operations are fatal on failure: the guide cannot be produced
/// without the lineup or with a day of grid data missing.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Resolve the ordered lineup records and the grid station filter
    async fn resolve_lineup(&self, lineup_id: &str) -> AppResult<Lineup>;

    /// Fetch one day of programme grid for the given stations
    async fn fetch_grid(
        &self,
        lineup_id: &str,
        window: &DayWindow,
        station_filter: &StationFilter,
    ) -> AppResult<GridDay>;
}
