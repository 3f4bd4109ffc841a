//! tvtv.us listing source
//!
//! Two endpoints are used:
//!
//! - `{base}/api/v1/lineup/{lineupId}/channels` returns a JSON array of
//!   channel records.
//! - `{base}/api/v1/lineup/{lineupId}/grid/{start}/{end}/{stations}` returns a
//!   JSON array holding one programme array per lineup record, in lineup
//!   order.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::models::{Channel, DayWindow, Lineup, LineupEntry, RawChannel, StationFilter};
use crate::sources::traits::ListingSource;
use crate::utils::datetime::DateTimeParser;
use crate::utils::http_client::HttpClient;

/// One day of grid data, positionally aligned with the lineup records
#[derive(Debug, Clone, Default)]
pub struct GridDay {
    entries: Vec<Value>,
}

impl GridDay {
    /// Parse a grid response body
    pub fn from_json(content: &str) -> AppResult<Self> {
        let entries: Vec<Value> = serde_json::from_str(content)
            .map_err(|e| AppError::parse_error("tvtv_grid", e.to_string()))?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Programme cells for the lineup record at `index`
    ///
    /// `None` when the entry is missing or is not an array.
    pub fn programmes_at(&self, index: usize) -> Option<&[Value]> {
        self.entries
            .get(index)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Require at least one entry per lineup record; extra entries are ignored
    pub fn check_alignment(&self, lineup: &Lineup) -> SourceResult<()> {
        if self.entries.len() < lineup.len() {
            return Err(SourceError::GridMisaligned {
                expected: lineup.len(),
                actual: self.entries.len(),
            });
        }
        Ok(())
    }
}

/// Build the lineup from raw channel records
///
/// Every record with a station id feeds the station filter. A channel is
/// defined only for records with a channel number; the call sign becomes a
/// second display name and the logo path is appended to `base_url`.
pub fn build_lineup(records: Vec<RawChannel>, base_url: &str) -> Lineup {
    let mut lineup = Lineup::default();

    for record in records {
        if let Some(ref station_id) = record.station_id {
            lineup.station_filter.push(station_id);
        }

        let channel = record.channel_number.map(|number| {
            let mut display_names = vec![number.clone()];
            if let Some(call_sign) = record.station_call_sign {
                display_names.push(call_sign);
            }

            Channel {
                id: number,
                display_names,
                icon_url: record.logo.map(|logo| format!("{}{}", base_url, logo)),
            }
        });

        if channel.is_none() {
            debug!(
                "Lineup record without channel number (station {:?}) will not be defined",
                record.station_id
            );
        }

        lineup.entries.push(LineupEntry {
            station_id: record.station_id,
            channel,
        });
    }

    lineup
}

/// tvtv.us listing source over any HTTP client
pub struct TvtvSource<C: HttpClient> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> TvtvSource<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn lineup_url(&self, lineup_id: &str) -> String {
        format!("{}/api/v1/lineup/{}/channels", self.base_url, lineup_id)
    }

    pub fn grid_url(
        &self,
        lineup_id: &str,
        window: &DayWindow,
        station_filter: &StationFilter,
    ) -> String {
        format!(
            "{}/api/v1/lineup/{}/grid/{}/{}/{}",
            self.base_url,
            lineup_id,
            DateTimeParser::format_api(&window.start),
            DateTimeParser::format_api(&window.end),
            station_filter
        )
    }
}

#[async_trait]
impl<C: HttpClient> ListingSource for TvtvSource<C> {
    async fn resolve_lineup(&self, lineup_id: &str) -> AppResult<Lineup> {
        let url = self.lineup_url(lineup_id);
        let content = self.client.fetch_text(&url).await?;

        let records: Vec<RawChannel> = serde_json::from_str(&content)
            .map_err(|e| AppError::parse_error("tvtv_lineup", e.to_string()))?;
        let record_count = records.len();

        let lineup = build_lineup(records, &self.base_url);
        let channel_count = lineup.channels().count();

        info!(
            "Resolved lineup '{}': {} records, {} channels",
            lineup_id, record_count, channel_count
        );
        if lineup.station_filter.is_empty() {
            warn!(
                "Lineup '{}' has no station ids, grid requests will be unfiltered",
                lineup_id
            );
        }

        Ok(lineup)
    }

    async fn fetch_grid(
        &self,
        lineup_id: &str,
        window: &DayWindow,
        station_filter: &StationFilter,
    ) -> AppResult<GridDay> {
        let url = self.grid_url(lineup_id, window, station_filter);
        let content = self.client.fetch_text(&url).await?;
        let grid = GridDay::from_json(&content)?;

        debug!(
            "Fetched grid for day {} ({} entries)",
            window.day,
            grid.len()
        );

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct NoopClient;

    #[async_trait]
    impl HttpClient for NoopClient {
        async fn fetch_text(&self, _url: &str) -> AppResult<String> {
            Ok("[]".to_string())
        }
    }

    fn raw(
        number: Option<&str>,
        station: Option<&str>,
        call_sign: Option<&str>,
        logo: Option<&str>,
    ) -> RawChannel {
        RawChannel {
            channel_number: number.map(String::from),
            station_id: station.map(String::from),
            station_call_sign: call_sign.map(String::from),
            logo: logo.map(String::from),
        }
    }

    #[test]
    fn test_build_lineup_channels() {
        let lineup = build_lineup(
            vec![
                raw(Some("7.1"), Some("1000"), Some("KXYZ"), Some("/logo/kxyz.png")),
                raw(Some("9.1"), Some("2000"), None, None),
            ],
            "https://www.tvtv.us",
        );

        let channels: Vec<&Channel> = lineup.channels().collect();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].id, "7.1");
        assert_eq!(channels[0].display_names, vec!["7.1", "KXYZ"]);
        assert_eq!(
            channels[0].icon_url.as_deref(),
            Some("https://www.tvtv.us/logo/kxyz.png")
        );
        assert_eq!(channels[1].display_names, vec!["9.1"]);
        assert_eq!(channels[1].icon_url, None);
        assert_eq!(lineup.station_filter.as_str(), "1000,2000,");
    }

    #[test]
    fn test_build_lineup_keeps_station_without_channel_number() {
        let lineup = build_lineup(
            vec![
                raw(None, Some("3000"), Some("KNON"), None),
                raw(Some("4.1"), None, None, None),
            ],
            "https://www.tvtv.us",
        );

        assert_eq!(lineup.len(), 2);
        assert_eq!(lineup.channels().count(), 1);
        assert_eq!(lineup.entries[0].channel, None);
        assert_eq!(lineup.station_filter.as_str(), "3000,");
    }

    #[test]
    fn test_grid_day_entries() {
        let grid = GridDay::from_json(r#"[[{"title": "A"}], null, []]"#).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.programmes_at(0).map(|p| p.len()), Some(1));
        assert!(grid.programmes_at(1).is_none());
        assert_eq!(grid.programmes_at(2).map(|p| p.len()), Some(0));
        assert!(grid.programmes_at(3).is_none());
    }

    #[test]
    fn test_grid_day_rejects_non_array() {
        let err = GridDay::from_json(r#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, AppError::Source(SourceError::ParseError { .. })));
    }

    #[test]
    fn test_grid_alignment() {
        let lineup = build_lineup(
            vec![raw(Some("1"), Some("1"), None, None), raw(Some("2"), Some("2"), None, None)],
            "https://www.tvtv.us",
        );

        let short = GridDay::from_json("[[]]").unwrap();
        assert!(matches!(
            short.check_alignment(&lineup),
            Err(SourceError::GridMisaligned { expected: 2, actual: 1 })
        ));

        let long = GridDay::from_json("[[], [], []]").unwrap();
        assert!(long.check_alignment(&lineup).is_ok());
    }

    #[test]
    fn test_urls() {
        let source = TvtvSource::new(NoopClient, "https://www.tvtv.us/");
        assert_eq!(
            source.lineup_url("USA-OTA35213"),
            "https://www.tvtv.us/api/v1/lineup/USA-OTA35213/channels"
        );

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut filter = StationFilter::default();
        filter.push("1000");
        filter.push("2000");

        assert_eq!(
            source.grid_url("USA-OTA35213", &DayWindow::for_day(now, 1), &filter),
            "https://www.tvtv.us/api/v1/lineup/USA-OTA35213/grid/2024-01-02T00:00:00.000Z/2024-01-03T00:00:00.000Z/1000,2000,"
        );
    }
}
