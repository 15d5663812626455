// Fetch loop: list every country Mist knows, then ask the site for the
// channel allowance of each one, in the order the constants list gives.

use crate::model::CountryEntry;
use crate::session::MistClient;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Fetch the channel allowance of every country for `site_id`.
///
/// Any single failure aborts the whole fetch; there is no partial result.
pub fn fetch_country_channels(client: &MistClient, site_id: &str) -> Result<Vec<CountryEntry>> {
    let countries = client
        .countries()
        .context("Failed to fetch the country list")?;
    log::info!("fetching channel data for {} countries", countries.len());

    let pb = ProgressBar::new(countries.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        pb.set_style(style);
    }

    let mut results = Vec::with_capacity(countries.len());
    for country in &countries {
        pb.set_message(country.alpha2.clone());
        log::debug!("fetching ap_channels for {}", country.alpha2);
        let entry = client
            .ap_channels(site_id, &country.alpha2)
            .with_context(|| format!("Failed to fetch channels for country {}", country.alpha2))?;
        results.push(entry);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(results)
}
