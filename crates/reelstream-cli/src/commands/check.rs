use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use comfy_table::{presets, Cell, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use stream_check_config::{Config, ConfigError, PathManager};
use stream_check_core::{RunOptions, WatchlistChecker};
use stream_check_models::{AvailabilityOffer, MatchedResult, MonetizationType, RunOutcome};
use stream_check_sources::{JustWatchClient, LetterboxdFetcher};

use crate::output::Output;

pub struct CheckArgs {
    pub username: Option<String>,
    pub services: Vec<String>,
    pub country: Option<String>,
    pub max_pages: Option<u32>,
    pub config_path: Option<PathBuf>,
}

pub async fn run_check(args: CheckArgs, output: &Output) -> Result<()> {
    tracing::debug!("check command started");

    let mut config = load_config(args.config_path.as_deref())?;
    if let Some(username) = args.username {
        config.username = username;
    }
    if !args.services.is_empty() {
        config.services = args.services;
    }
    if let Some(country) = args.country {
        config.country = country;
    }
    if let Some(max_pages) = args.max_pages {
        config.run.max_pages = max_pages;
    }

    let fetcher = Arc::new(LetterboxdFetcher::new());
    let availability = Arc::new(JustWatchClient::new(
        config.country.clone(),
        config.language.clone(),
    ));
    let checker = WatchlistChecker::new(fetcher, availability)
        .with_options(RunOptions::from(&config.run));

    let spinner = start_spinner(output, &config.username);
    let run = checker.run(&config).await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let outcome = run.map_err(|e| {
        color_eyre::eyre::eyre!("{e}. Run `reelstream config init` to set up a config file.")
    })?;

    if let Some(reason) = &outcome.report.failure {
        output.warn(format!(
            "Run ended early ({reason}); results cover only the pages fetched before the failure."
        ));
    }
    if outcome.report.queries_failed > 0 {
        output.warn(format!(
            "{} availability lookups failed; those films are reported as unknown.",
            outcome.report.queries_failed
        ));
    }

    if output.is_human() {
        render_human(&outcome, output);
    } else {
        output.json(&serde_json::to_value(&outcome)?);
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathManager::default().config_file());
    match Config::load(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            tracing::debug!(path = %path.display(), "no config file, starting from defaults and flags");
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn start_spinner(output: &Output, username: &str) -> Option<ProgressBar> {
    if !output.is_human() || output.is_quiet() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Checking {username}'s watchlist..."));
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

fn render_human(outcome: &RunOutcome, output: &Output) {
    if outcome.results.is_empty() {
        output.info("Watchlist is empty — nothing to check.");
        return;
    }

    let available: Vec<&MatchedResult> =
        outcome.results.iter().filter(|r| r.is_available()).collect();
    let unavailable: Vec<&MatchedResult> = outcome
        .results
        .iter()
        .filter(|r| !r.is_available() && !r.lookup_failed)
        .collect();
    let unknown: Vec<&MatchedResult> =
        outcome.results.iter().filter(|r| r.lookup_failed).collect();

    if available.is_empty() {
        output.info("Nothing from the watchlist is streaming on your services right now.");
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_header(vec!["Film", "Streaming on"]);
        for result in &available {
            table.add_row(vec![
                Cell::new(&result.entry.display_title),
                Cell::new(format_offers(&result.offers)),
            ]);
        }
        output.info(table.to_string());
    }

    output.info(format!(
        "{} of {} films ready to watch",
        available.len().to_string().green(),
        outcome.results.len()
    ));

    if !unavailable.is_empty() {
        output.info(format!(
            "Not on your services ({}): {}",
            unavailable.len(),
            titles(&unavailable)
        ));
    }
    if !unknown.is_empty() {
        output.warn(format!(
            "Availability unknown ({}): {}",
            unknown.len(),
            titles(&unknown)
        ));
    }
}

fn titles(results: &[&MatchedResult]) -> String {
    results
        .iter()
        .map(|r| r.entry.display_title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_offers(offers: &[AvailabilityOffer]) -> String {
    offers
        .iter()
        .map(|o| format!("{} ({})", o.service_id, monetization_label(o.monetization)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn monetization_label(monetization: MonetizationType) -> &'static str {
    match monetization {
        MonetizationType::Subscription => "subscription",
        MonetizationType::Rent => "rent",
        MonetizationType::Buy => "buy",
        MonetizationType::Free => "free",
    }
}
