use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tvtv2xmltv::{
    config::Config,
    epg::{source_info_url_from_env, GenerationConfig, XmltvGenerator},
    sources::TvtvSource,
    utils::StandardHttpClient,
};

#[derive(Parser, Debug)]
#[command(name = "tvtv2xmltv")]
#[command(version)]
#[command(about = "Generates an XMLTV guide from tvtv.us listings")]
#[command(long_about = None)]
// A recognised flag left without its value is dropped instead of failing the run
#[command(ignore_errors = true)]
struct Cli {
    /// IANA timezone for programme times
    #[arg(long, value_name = "ZONE")]
    timezone: Option<String>,

    /// tvtv.us lineup identifier
    #[arg(long = "lineUpID", value_name = "ID")]
    lineup_id: Option<String>,

    /// Days of listings (0-8); non-numeric values are ignored
    #[arg(long, value_name = "DAYS", allow_hyphen_values = true)]
    days: Option<String>,

    /// Output file
    #[arg(long = "fileName", value_name = "PATH")]
    file_name: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

/// Flags that take a value, inline (`--days=3`) or as the next argument
const VALUE_FLAGS: &[&str] = &[
    "--timezone",
    "--lineUpID",
    "--days",
    "--fileName",
    "--config",
    "-c",
    "--log-level",
    "-v",
];

const SWITCHES: &[&str] = &["-h", "--help", "-V", "--version"];

/// Keep the program name and the recognised flags, drop everything else
///
/// Each argument is judged on its own, so an unknown flag or a stray word
/// never hides the flags that follow it.
fn recognised_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut kept: Vec<String> = args.next().into_iter().collect();
    let mut args = args.peekable();

    while let Some(arg) = args.next() {
        if SWITCHES.contains(&arg.as_str()) {
            kept.push(arg);
            continue;
        }

        let name = arg.split_once('=').map_or(arg.as_str(), |(name, _)| name);
        if !VALUE_FLAGS.contains(&name) {
            continue;
        }

        let has_inline_value = arg.contains('=');
        kept.push(arg);
        if !has_inline_value {
            if let Some(value) = args.next_if(|next| !next.starts_with("--")) {
                kept.push(value);
            }
        }
    }

    kept
}

impl Cli {
    /// Override configuration values with the flags that were given
    fn apply(&self, config: &mut Config) {
        if let Some(ref timezone) = self.timezone {
            config.listing.timezone = timezone.clone();
        }
        if let Some(ref lineup_id) = self.lineup_id {
            config.listing.lineup_id = lineup_id.clone();
        }
        if let Some(ref days) = self.days {
            match days.trim().parse::<i64>() {
                Ok(days) => config.listing.days = days,
                Err(_) => warn!("Ignoring non-numeric --days value '{}'", days),
            }
        }
        if let Some(ref file_name) = self.file_name {
            config.output.file_name = file_name.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(recognised_args(std::env::args()));

    // Logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tvtv2xmltv={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting tvtv2xmltv v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(ref path) = cli.config {
        info!("Configuration loaded from: {}", path.display());
    }
    cli.apply(&mut config);
    config.validate()?;

    let client = StandardHttpClient::with_timeouts(
        config.service.connect_timeout(),
        config.service.request_timeout(),
    )?;
    let source = TvtvSource::new(client, config.service.base_url.clone());
    let generator = XmltvGenerator::new(
        source,
        GenerationConfig::from(&config),
        source_info_url_from_env(),
    );

    let statistics = generator
        .generate_to_file(&config.output.file_name)
        .await?;

    info!(
        "Wrote {} ({} channels, {} programmes)",
        config.output.file_name.display(),
        statistics.channels_written,
        statistics.programmes_written
    );

    Ok(())
}
