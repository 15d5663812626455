// Command-line surface and the top-level run: load the channel map, verify
// the token, fetch every country, write the workbook.

use crate::api::{ApiClient, DEFAULT_HOST};
use crate::channels::ChannelMap;
use crate::fetch::fetch_country_channels;
use crate::report::{write_workbook, DEFAULT_REPORT_FILE};
use crate::session::MistClient;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mist-country-channels",
    version,
    about = "Mist country channel report: which wifi channels each country allows"
)]
pub struct Args {
    /// Mist API Key
    #[arg(short = 'k', long = "key", env = "MIST_API_TOKEN", hide_env_values = true)]
    pub key: String,

    /// Mist Org ID
    #[arg(short = 'o', long = "org")]
    pub org: String,

    /// Mist EU Environment (accepted for compatibility; does not change the host)
    #[arg(short = 'e', long = "EU", value_name = "VALUE")]
    pub eu: Option<String>,

    /// Site ID for checking Country info
    #[arg(short = 's', long = "site")]
    pub site: String,

    /// API host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Full base URL, overrides --host (e.g. a local proxy)
    #[arg(long, hide = true)]
    pub base_url: Option<String>,

    /// Channel-to-column map (defaults to ./channel_mappings.json, then the user config dir)
    #[arg(short = 'c', long = "channel-map", value_name = "PATH")]
    pub channel_map: Option<PathBuf>,

    /// Output workbook
    #[arg(short = 'f', long = "output", value_name = "PATH", default_value = DEFAULT_REPORT_FILE)]
    pub output: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }

    fn api_client(&self) -> Result<ApiClient> {
        let api = match &self.base_url {
            Some(url) => ApiClient::with_base_url(url, &self.org, &self.key),
            None => ApiClient::new(&self.host, &self.org, &self.key),
        };
        api.context("Failed to set up the API client")
    }
}

/// `RUST_LOG` wins over `-v`.
pub fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Run the report and return where it was written.
pub fn run(args: &Args) -> Result<PathBuf> {
    if args.eu.is_some() {
        log::warn!(
            "--EU does not switch regions; still using {}",
            args.base_url.as_deref().unwrap_or(&args.host)
        );
    }

    // Channel map is checked before any network traffic.
    let map_path = ChannelMap::locate(args.channel_map.as_deref())?;
    let map = ChannelMap::load(&map_path)?;

    let client = MistClient::connect(args.api_client()?)?;
    let entries = fetch_country_channels(&client, &args.site)?;

    write_workbook(&args.output, &entries, &map)
        .with_context(|| format!("Failed to write report {:?}", args.output))?;
    Ok(args.output.clone())
}
