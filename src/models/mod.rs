use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::SkipReason;
use crate::utils::datetime::DateTimeParser;

/// Render a JSON scalar the way the listing service's fields are consumed
///
/// Strings are taken as-is, numbers and booleans by their JSON text, and
/// `null` counts as absent. Objects and arrays keep their JSON text.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Optional field that may arrive as a string, number or boolean
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

/// Optional list of free-text tags; a scalar becomes a single tag
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let flags = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
    };
    Ok(flags)
}

/// One record of the lineup channel listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub channel_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub station_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub station_call_sign: Option<String>,
    /// Path relative to the service host
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub logo: Option<String>,
}

/// One programme cell of a grid response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgramme {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub program_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub subtitle: Option<String>,
    /// Single-letter programme kind (`M`ovie, `N`ews, `S`ports, ...)
    #[serde(default, rename = "type", deserialize_with = "deserialize_optional_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flags")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub start_time: Option<String>,
    /// Minutes, string-encoded
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub run_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub duration: Option<String>,
}

impl RawProgramme {
    /// Decode one grid cell
    pub fn from_value(value: &Value) -> Result<Self, SkipReason> {
        Self::deserialize(value).map_err(|e| SkipReason::MalformedRecord {
            message: e.to_string(),
        })
    }
}

/// XMLTV channel definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel number, used as the XMLTV channel id
    pub id: String,
    /// Channel number first, then the call sign when known
    pub display_names: Vec<String>,
    pub icon_url: Option<String>,
}

/// Station ids accumulated while resolving the lineup
///
/// Rendered as `id1,id2,` and used verbatim as the last path segment of the
/// grid request. Records without a channel number still contribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationFilter {
    token: String,
}

impl StationFilter {
    pub fn push(&mut self, station_id: &str) {
        self.token.push_str(station_id);
        self.token.push(',');
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl std::fmt::Display for StationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token)
    }
}

/// One lineup record, kept in listing order
///
/// Grid responses are positionally aligned with these entries, including the
/// ones that produced no channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupEntry {
    pub station_id: Option<String>,
    pub channel: Option<Channel>,
}

/// Resolved lineup: every record plus the grid station filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineup {
    pub entries: Vec<LineupEntry>,
    pub station_filter: StationFilter,
}

impl Lineup {
    /// Channels to define in the guide, in lineup order
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.entries.iter().filter_map(|entry| entry.channel.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// UTC request window `[now + day, now + day + 1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn for_day(now: DateTime<Utc>, day: u32) -> Self {
        Self {
            day,
            start: now + Duration::days(day as i64),
            end: now + Duration::days(day as i64 + 1),
        }
    }
}

/// Programme categories derived from the programme kind and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Movie,
    News,
    Sports,
    Kids,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::News => "news",
            Category::Sports => "sports",
            Category::Kids => "kids",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A programme ready to be written to the guide
#[derive(Debug, Clone, PartialEq)]
pub struct Programme {
    pub program_id: String,
    pub title: String,
    pub subtitle: String,
    pub categories: Vec<Category>,
    /// `HD` flag: `<video><quality>HDTV</quality></video>`
    pub is_hd: bool,
    /// `Stereo` flag: `<audio><stereo>stereo</stereo></audio>`
    pub is_stereo: bool,
    /// `New` flag: empty `<new />` marker
    pub is_new: bool,
    pub start: DateTime<Tz>,
    pub stop: DateTime<Tz>,
    /// Passed through from the listing unchanged
    pub duration: String,
}

impl Programme {
    /// `start` attribute value, `yyyyMMddHHmmss ±hhmm`
    pub fn xmltv_start(&self) -> String {
        DateTimeParser::format_xmltv(&self.start)
    }

    /// `stop` attribute value, `yyyyMMddHHmmss ±hhmm`
    pub fn xmltv_stop(&self) -> String {
        DateTimeParser::format_xmltv(&self.stop)
    }
}
