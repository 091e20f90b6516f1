//! Fetch orchestrator: polls every catalog entry in order with progress reporting.

use super::provider::{DataError, FetchFailure, FetchProgress, FundStatsProvider};
use super::throttle::Throttle;
use crate::domain::{AssetRecord, CatalogEntry};

/// Fetch a single entry: wait, request, normalize.
pub fn fetch_single(
    provider: &dyn FundStatsProvider,
    entry: &CatalogEntry,
    throttle: &Throttle,
) -> Result<AssetRecord, DataError> {
    throttle.wait();
    let stats = provider.fetch(&entry.identifier)?;
    Ok(AssetRecord::from_stats(entry, stats))
}

/// Fetch every entry, one request each, sleeping `throttle` before each request.
///
/// A failure never aborts the batch: the entry is recorded in `not_found` and
/// the loop moves on. Every entry lands in exactly one of the two lists.
pub fn fetch_all(
    provider: &dyn FundStatsProvider,
    entries: &[CatalogEntry],
    throttle: &Throttle,
    progress: &dyn FetchProgress,
) -> FetchOutcome {
    let total = entries.len();
    tracing::info!(
        provider = provider.name(),
        total,
        delay_ms = throttle.delay().as_millis() as u64,
        min_duration_secs = throttle.minimum_duration(total).as_secs(),
        "fetching fund statistics"
    );

    let outcome = entries
        .iter()
        .enumerate()
        .fold(FetchOutcome::default(), |mut acc, (i, entry)| {
            progress.on_start(entry, i, total);

            match fetch_single(provider, entry, throttle) {
                Ok(record) => {
                    progress.on_complete(entry, i, total, &Ok(()));
                    acc.found.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        identifier = %entry.identifier,
                        category = %entry.category,
                        count = i + 1,
                        error = %e,
                        "fund not found"
                    );
                    acc.not_found.push(FetchFailure::new(entry, &e));
                    progress.on_complete(entry, i, total, &Err(e));
                }
            }
            acc
        });

    progress.on_batch_complete(outcome.found.len(), outcome.not_found.len(), total);
    outcome
}

/// Successes and failures of one fetch pass, both in catalog order.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub found: Vec<AssetRecord>,
    pub not_found: Vec<FetchFailure>,
}

impl FetchOutcome {
    pub fn total(&self) -> usize {
        self.found.len() + self.not_found.len()
    }

    /// Identifiers that could not be fetched, in catalog order.
    pub fn not_found_identifiers(&self) -> Vec<&str> {
        self.not_found.iter().map(|f| f.identifier.as_str()).collect()
    }
}
