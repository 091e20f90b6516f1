//! Pipeline runner: wires catalogs, fetcher, score engine, ranking, and join.
//!
//! Two entry points:
//! - `run_from_config()`: loads catalogs and builds the HTTP providers from a
//!   config. Used by the CLI.
//! - `run_pipeline()`: takes loaded entries and provider trait objects. Used by
//!   `run_from_config()` and by tests with in-memory providers.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fundscope_core::data::{
    collect_offerings, load_catalogs, CatalogError, DataError, FetchFailure, FetchProgress,
    FundStatsProvider, MaisRetornoProvider, OfferingsProvider, OfferingsSource,
    StatsApiProvider,
};
use fundscope_core::domain::CatalogEntry;

use crate::availability::{join_availability, without_availability, JoinedRecord};
use crate::config::PipelineConfig;
use crate::ranking::rank;
use crate::score::score_records;

/// Errors that abort a run. Per-fund and per-page failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] DataError),
}

/// Which statistics endpoint to poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsSource {
    #[default]
    Maisretorno,
    StatsApi,
}

impl FromStr for StatsSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maisretorno" => Ok(Self::Maisretorno),
            "stats-api" => Ok(Self::StatsApi),
            other => Err(format!(
                "unknown source '{other}' (expected maisretorno or stats-api)"
            )),
        }
    }
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Ranked, availability-annotated funds.
    pub records: Vec<JoinedRecord>,
    /// Funds whose fetch or parse failed, in catalog order.
    pub not_found: Vec<FetchFailure>,
    /// Catalog entries loaded (found + not found).
    pub loaded: usize,
    /// Rows collected from the secondary provider; `None` when it was not queried.
    pub offerings_count: Option<usize>,
    /// BLAKE3 of the loaded catalog entries.
    pub catalog_hash: String,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
}

impl PipelineReport {
    pub fn found_count(&self) -> usize {
        self.records.len()
    }

    pub fn not_found_count(&self) -> usize {
        self.not_found.len()
    }

    pub fn not_found_identifiers(&self) -> Vec<&str> {
        self.not_found.iter().map(|f| f.identifier.as_str()).collect()
    }
}

/// Content hash of the loaded catalog: one `identifier,category` line per entry.
pub fn catalog_fingerprint(entries: &[CatalogEntry]) -> String {
    let mut hasher = blake3::Hasher::new();
    for entry in entries {
        hasher.update(entry.identifier.as_str().as_bytes());
        hasher.update(b",");
        hasher.update(entry.category.as_str().as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Fetch, score, rank, and join already-loaded catalog entries.
///
/// `offerings = None` skips the secondary provider; every record is then
/// flagged unavailable.
pub fn run_pipeline(
    config: &PipelineConfig,
    entries: &[CatalogEntry],
    provider: &dyn FundStatsProvider,
    offerings: Option<&dyn OfferingsSource>,
    progress: &dyn FetchProgress,
) -> PipelineReport {
    let started_at = Local::now().naive_local();

    let stage = Instant::now();
    let outcome =
        fundscope_core::data::fetch_all(provider, entries, &config.fetch.throttle(), progress);
    tracing::info!(
        found = outcome.found.len(),
        not_found = outcome.not_found.len(),
        elapsed_secs = stage.elapsed().as_secs_f64(),
        "fetch stage complete"
    );

    let mut scored = score_records(outcome.found);
    rank(&mut scored);

    let (records, offerings_count) = match offerings {
        Some(source) => {
            let stage = Instant::now();
            let catalog = collect_offerings(source, &config.offerings.page_request());
            let available: HashSet<String> = catalog.identifiers();
            let joined = join_availability(scored, &available, config.offerings.join_key);
            tracing::info!(
                offerings = catalog.len(),
                available = joined.iter().filter(|j| j.available_on_secondary).count(),
                elapsed_secs = stage.elapsed().as_secs_f64(),
                "join stage complete"
            );
            (joined, Some(catalog.len()))
        }
        None => (without_availability(scored), None),
    };

    PipelineReport {
        records,
        not_found: outcome.not_found,
        loaded: entries.len(),
        offerings_count,
        catalog_hash: catalog_fingerprint(entries),
        started_at,
        finished_at: Local::now().naive_local(),
    }
}

/// Run the whole pipeline against the live endpoints described by `config`.
///
/// Catalog failures abort before any request is made. The HTTP clients live
/// for the duration of this call only.
pub fn run_from_config(
    config: &PipelineConfig,
    source: StatsSource,
    skip_offerings: bool,
    progress: &dyn FetchProgress,
) -> Result<PipelineReport, PipelineError> {
    let entries = load_catalogs(
        &config.catalog_dir,
        &config.catalog_file_prefix,
        &config.categories,
    )?;
    tracing::info!(entries = entries.len(), "catalogs loaded");

    let provider: Box<dyn FundStatsProvider> = match source {
        StatsSource::Maisretorno => {
            Box::new(MaisRetornoProvider::new(&config.fetch.http_settings())?)
        }
        StatsSource::StatsApi => {
            let settings = fundscope_core::data::HttpSettings {
                base_url: config.stats_api.base_url.clone(),
                ..config.fetch.http_settings()
            };
            Box::new(StatsApiProvider::new(&settings, config.stats_api.suffix.clone())?)
        }
    };

    let offerings = if config.offerings.enabled && !skip_offerings {
        Some(OfferingsProvider::new(
            &config.offerings.http_settings(&config.fetch),
            config.offerings.identifier_field.clone(),
        )?)
    } else {
        None
    };

    Ok(run_pipeline(
        config,
        &entries,
        provider.as_ref(),
        offerings.as_ref().map(|o| o as &dyn OfferingsSource),
        progress,
    ))
}
