use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWrite;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::epg::transformer::ProgrammeTransformer;
use crate::epg::writer::{DocumentHeader, XmltvWriter, SOURCE_INFO_NAME};
use crate::errors::{AppError, AppResult};
use crate::models::{DayWindow, LineupEntry, RawProgramme};
use crate::sources::traits::ListingSource;
use crate::sources::tvtv::GridDay;
use crate::utils::datetime::DateTimeParser;

/// Settings for one guide generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub lineup_id: String,
    /// IANA zone id, resolved before the first grid is transformed
    pub timezone: String,
    /// Days of programme data, already clamped to `0..=8`
    pub days: u32,
}

impl From<&Config> for GenerationConfig {
    fn from(config: &Config) -> Self {
        Self {
            lineup_id: config.listing.lineup_id.clone(),
            timezone: config.listing.timezone.clone(),
            days: config.listing.effective_days(),
        }
    }
}

/// Statistics about one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStatistics {
    pub channels_written: usize,
    pub programmes_written: usize,
    pub programmes_skipped: usize,
    pub days_fetched: u32,
    pub bytes_written: u64,
    pub generation_time_ms: u64,
}

/// `source-info-url` from the request host and path, either may be absent
pub fn source_info_url(host: Option<&str>, request_uri: Option<&str>) -> String {
    format!(
        "https://{}{}",
        host.unwrap_or_default(),
        request_uri.unwrap_or_default()
    )
}

/// `source-info-url` from the `HTTP_HOST` and `REQUEST_URI` environment variables
pub fn source_info_url_from_env() -> String {
    let host = std::env::var("HTTP_HOST").ok();
    let request_uri = std::env::var("REQUEST_URI").ok();
    source_info_url(host.as_deref(), request_uri.as_deref())
}

/// Drives lineup resolution, per-day grid fetches and programme emission
pub struct XmltvGenerator<S: ListingSource> {
    source: S,
    config: GenerationConfig,
    source_info_url: String,
}

impl<S: ListingSource> XmltvGenerator<S> {
    pub fn new(source: S, config: GenerationConfig, source_info_url: impl Into<String>) -> Self {
        Self {
            source,
            config,
            source_info_url: source_info_url.into(),
        }
    }

    /// Generate the whole guide into `sink`
    ///
    /// Channels are written once, then the programmes of every day in
    /// lineup order. Any fetch failure or an unknown timezone aborts the run;
    /// individual programmes that cannot be transformed are skipped.
    pub async fn generate<W: AsyncWrite + Unpin>(
        &self,
        sink: W,
        now: DateTime<Utc>,
    ) -> AppResult<(W, GenerationStatistics)> {
        let start_time = Instant::now();
        let mut statistics = GenerationStatistics::default();

        info!(
            "Starting guide generation for lineup '{}' ({} days, timezone {})",
            self.config.lineup_id, self.config.days, self.config.timezone
        );

        let lineup = self.source.resolve_lineup(&self.config.lineup_id).await?;

        let mut writer = XmltvWriter::new(sink);
        writer
            .write_header(&DocumentHeader {
                date: DateTimeParser::format_api(&now),
                source_info_url: self.source_info_url.clone(),
                source_info_name: SOURCE_INFO_NAME.to_string(),
            })
            .await?;

        for channel in lineup.channels() {
            writer.write_channel(channel).await?;
            statistics.channels_written += 1;
        }

        if self.config.days > 0 {
            let timezone = DateTimeParser::parse_timezone(&self.config.timezone)
                .map_err(|e| AppError::configuration(e.to_string()))?;
            let transformer = ProgrammeTransformer::new(timezone);

            for day in 0..self.config.days {
                let window = DayWindow::for_day(now, day);
                let grid = self
                    .source
                    .fetch_grid(&self.config.lineup_id, &window, &lineup.station_filter)
                    .await?;
                grid.check_alignment(&lineup)?;

                let (written, skipped) = self
                    .write_day(&mut writer, &transformer, &lineup.entries, &grid)
                    .await?;
                statistics.programmes_written += written;
                statistics.programmes_skipped += skipped;
                statistics.days_fetched += 1;

                info!(
                    "Day {}: {} programmes written, {} skipped",
                    day, written, skipped
                );
            }
        }

        let (sink, bytes_written) = writer.finish().await?;
        statistics.bytes_written = bytes_written;
        statistics.generation_time_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Guide generation completed for lineup '{}': {} channels, {} programmes, \
             {} skipped, {} bytes, {}ms",
            self.config.lineup_id,
            statistics.channels_written,
            statistics.programmes_written,
            statistics.programmes_skipped,
            statistics.bytes_written,
            statistics.generation_time_ms
        );

        Ok((sink, statistics))
    }

    /// Emit one day of programmes, channel-major
    async fn write_day<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut XmltvWriter<W>,
        transformer: &ProgrammeTransformer,
        entries: &[LineupEntry],
        grid: &GridDay,
    ) -> AppResult<(usize, usize)> {
        let mut written = 0;
        let mut skipped = 0;

        for (index, entry) in entries.iter().enumerate() {
            let Some(cells) = grid.programmes_at(index) else {
                debug!("No programme list at grid position {}", index);
                continue;
            };
            let channel_id = entry.channel.as_ref().map(|channel| channel.id.as_str());

            for cell in cells {
                match RawProgramme::from_value(cell).and_then(|raw| transformer.transform(&raw)) {
                    Ok(programme) => {
                        writer.write_programme(&programme, channel_id).await?;
                        written += 1;
                    }
                    Err(reason) => {
                        let program_id = cell
                            .get("programId")
                            .and_then(|id| id.as_str())
                            .unwrap_or("unknown");
                        warn!(
                            "Skipping programme '{}' on channel {} (station {}): {}",
                            program_id,
                            channel_id.unwrap_or("(none)"),
                            entry.station_id.as_deref().unwrap_or("(none)"),
                            reason
                        );
                        skipped += 1;
                    }
                }
            }
        }

        Ok((written, skipped))
    }

    /// Generate the guide and publish it at `path`
    ///
    /// The document is written to `<path>.tmp` and renamed into place only
    /// once it is complete; on failure the temporary file is removed.
    pub async fn generate_to_file(&self, path: &Path) -> AppResult<GenerationStatistics> {
        let temp_path = temp_path_for(path);

        match self.publish(&temp_path, path).await {
            Ok(statistics) => {
                info!("Published guide to {}", path.display());
                Ok(statistics)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&temp_path).await {
                    debug!(
                        "Failed to remove temporary file {}: {}",
                        temp_path.display(),
                        remove_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn publish(&self, temp_path: &Path, path: &Path) -> AppResult<GenerationStatistics> {
        let file = tokio::fs::File::create(temp_path).await?;
        let (file, statistics) = self.generate(file, Utc::now()).await?;
        file.sync_all().await?;
        tokio::fs::rename(temp_path, path).await?;
        Ok(statistics)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_info_url() {
        assert_eq!(
            source_info_url(Some("guide.example.org"), Some("/xmltv.php")),
            "https://guide.example.org/xmltv.php"
        );
        assert_eq!(source_info_url(None, None), "https://");
        assert_eq!(source_info_url(Some("host"), None), "https://host");
    }

    #[test]
    fn test_generation_config_from_config() {
        let mut config = Config::default();
        config.listing.days = 20;

        let generation = GenerationConfig::from(&config);
        assert_eq!(generation.days, 8);
        assert_eq!(generation.lineup_id, "USA-OTA35213");
        assert_eq!(generation.timezone, "America/Chicago");
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path_for(Path::new("out/xmltv.xml")),
            PathBuf::from("out/xmltv.xml.tmp")
        );
    }
}
