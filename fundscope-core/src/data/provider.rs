//! Statistics provider trait and structured error types.
//!
//! The FundStatsProvider trait abstracts over the fund statistics endpoints
//! (fund details API, generic stats API) so the fetch loop can be driven by an
//! in-memory provider in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CatalogEntry, Category, FundId, FundStats};

/// Structured error types for data operations.
///
/// Every variant is recoverable at the per-identifier or per-page level;
/// the fetch loop records it and moves on.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("missing field '{0}' in response")]
    MissingField(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DataError::ResponseFormatChanged(e.to_string())
        } else {
            DataError::NetworkUnreachable(e.to_string())
        }
    }
}

/// An identifier that could not be fetched or parsed in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub identifier: FundId,
    pub category: Category,
    pub reason: String,
}

impl FetchFailure {
    pub fn new(entry: &CatalogEntry, error: &DataError) -> Self {
        Self {
            identifier: entry.identifier.clone(),
            category: entry.category,
            reason: error.to_string(),
        }
    }
}

/// Trait for fund statistics sources.
///
/// Implementations perform exactly one request per call and never retry.
pub trait FundStatsProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch and normalize the statistics of a single fund.
    fn fetch(&self, id: &FundId) -> Result<FundStats, DataError>;
}

/// Progress callback for the per-identifier fetch loop.
pub trait FetchProgress {
    /// Called before the request for an entry is issued.
    fn on_start(&self, entry: &CatalogEntry, index: usize, total: usize);

    /// Called when an entry has been processed, successfully or not.
    fn on_complete(
        &self,
        entry: &CatalogEntry,
        index: usize,
        total: usize,
        result: &Result<(), DataError>,
    );

    /// Called once after the last entry.
    fn on_batch_complete(&self, found: usize, not_found: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, _entry: &CatalogEntry, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        entry: &CatalogEntry,
        index: usize,
        total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("count = {}/{total}  OK: {}", index + 1, entry.identifier),
            Err(e) => println!("count = {}/{total}  FAIL: {}: {e}", index + 1, entry.identifier),
        }
    }

    fn on_batch_complete(&self, found: usize, not_found: usize, total: usize) {
        println!("\nFetch complete: {found}/{total} found, {not_found} not found");
    }
}

/// Progress reporter that discards every event.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _entry: &CatalogEntry, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _entry: &CatalogEntry,
        _index: usize,
        _total: usize,
        _result: &Result<(), DataError>,
    ) {
    }

    fn on_batch_complete(&self, _found: usize, _not_found: usize, _total: usize) {}
}
