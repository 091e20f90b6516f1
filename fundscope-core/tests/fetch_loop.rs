//! Integration tests for catalog loading and the throttled fetch loop.
//!
//! Providers are in-memory; no network access.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::time::{Duration, Instant};

use fundscope_core::data::{
    fetch_all, load_catalogs, CatalogError, DataError, FetchProgress, FundStatsProvider,
    SilentProgress, Throttle,
};
use fundscope_core::data::stats_api::parse_stats;
use fundscope_core::domain::{CatalogEntry, Category, FundId, FundStats, HorizonStats};

/// Serves fixed stats, failing for a configured set of identifiers.
struct MockProvider {
    failing: HashSet<&'static str>,
    calls: RefCell<Vec<String>>,
}

impl MockProvider {
    fn failing(ids: &[&'static str]) -> Self {
        Self {
            failing: ids.iter().copied().collect(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FundStatsProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, id: &FundId) -> Result<FundStats, DataError> {
        self.calls.borrow_mut().push(id.to_string());
        if self.failing.contains(id.as_str()) {
            return Err(DataError::HttpStatus {
                status: 404,
                url: format!("mock://{id}"),
            });
        }
        Ok(FundStats {
            name: format!("Fund {id}"),
            last_12_months: HorizonStats::new(10.0, 5.0),
            ..FundStats::default()
        })
    }
}

/// Records the processed counter reported after each item.
#[derive(Default)]
struct CountingProgress {
    completed: RefCell<Vec<(usize, usize)>>,
    batch: Cell<Option<(usize, usize, usize)>>,
}

impl FetchProgress for CountingProgress {
    fn on_start(&self, _entry: &CatalogEntry, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _entry: &CatalogEntry,
        index: usize,
        total: usize,
        _result: &Result<(), DataError>,
    ) {
        self.completed.borrow_mut().push((index + 1, total));
    }

    fn on_batch_complete(&self, found: usize, not_found: usize, total: usize) {
        self.batch.set(Some((found, not_found, total)));
    }
}

fn entries(ids: &[&str]) -> Vec<CatalogEntry> {
    ids.iter()
        .map(|id| CatalogEntry {
            identifier: FundId::new(*id),
            category: Category::Valorizacao,
        })
        .collect()
}

#[test]
fn failed_identifier_is_reported_and_loop_continues() {
    let provider = MockProvider::failing(&["2"]);
    let progress = CountingProgress::default();
    let outcome = fetch_all(
        &provider,
        &entries(&["1", "2", "3"]),
        &Throttle::disabled(),
        &progress,
    );

    let found: Vec<&str> = outcome.found.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(found, vec!["1", "3"]);
    assert_eq!(outcome.not_found_identifiers(), vec!["2"]);
    assert_eq!(outcome.found.len(), 2);
    assert_eq!(outcome.not_found.len(), 1);
    assert!(outcome.not_found[0].reason.contains("404"));

    assert_eq!(*provider.calls.borrow(), vec!["1", "2", "3"]);
    assert_eq!(*progress.completed.borrow(), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(progress.batch.get(), Some((2, 1, 3)));
}

#[test]
fn found_and_not_found_partition_the_input() {
    let ids = ["10", "11", "12", "13", "14", "15"];
    let provider = MockProvider::failing(&["11", "14", "15"]);
    let outcome = fetch_all(&provider, &entries(&ids), &Throttle::disabled(), &SilentProgress);

    assert_eq!(outcome.total(), ids.len());
    let found: HashSet<&str> = outcome.found.iter().map(|r| r.identifier.as_str()).collect();
    let missing: HashSet<&str> = outcome.not_found_identifiers().into_iter().collect();
    assert!(found.is_disjoint(&missing));
    let union: HashSet<&str> = found.union(&missing).copied().collect();
    assert_eq!(union, ids.iter().copied().collect());
}

#[test]
fn each_identifier_is_requested_exactly_once() {
    let provider = MockProvider::failing(&["1", "2"]);
    fetch_all(&provider, &entries(&["1", "2"]), &Throttle::disabled(), &SilentProgress);
    assert_eq!(provider.calls.borrow().len(), 2);
}

#[test]
fn throttle_applies_before_every_request() {
    let provider = MockProvider::failing(&[]);
    let throttle = Throttle::from_millis(10);
    let start = Instant::now();
    fetch_all(&provider, &entries(&["1", "2", "3"]), &throttle, &SilentProgress);
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn catalogs_concatenate_in_category_order_without_dedup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("SuperCarteira_ESTABILIDADE.json"),
        r#"{"ESTABILIDADE": [{"cnpj": "11.111.111/0001-11"}, {"cnpj": "22.222.222/0001-22"}]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("SuperCarteira_OUTROS.json"),
        r#"{"OUTROS": [{"cnpj": "22.222.222/0001-22"}]}"#,
    )
    .unwrap();

    let loaded = load_catalogs(
        dir.path(),
        "SuperCarteira_",
        &[Category::Estabilidade, Category::Outros],
    )
    .unwrap();

    let pairs: Vec<(&str, Category)> = loaded
        .iter()
        .map(|e| (e.identifier.as_str(), e.category))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("11111111000111", Category::Estabilidade),
            ("22222222000122", Category::Estabilidade),
            ("22222222000122", Category::Outros),
        ]
    );
}

#[test]
fn missing_catalog_file_fails_the_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("SuperCarteira_VALORIZACAO.json"),
        r#"{"VALORIZACAO": [{"cnpj": "1"}]}"#,
    )
    .unwrap();

    let err = load_catalogs(
        dir.path(),
        "SuperCarteira_",
        &[Category::Valorizacao, Category::Diversificacao],
    )
    .unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
}

/// Parses a canned generic-stats body per identifier.
struct StatsBodyProvider;

impl FundStatsProvider for StatsBodyProvider {
    fn name(&self) -> &str {
        "stats_body"
    }

    fn fetch(&self, id: &FundId) -> Result<FundStats, DataError> {
        let (positive, negative) = match id.as_str() {
            "2" => (u32::MAX, 1),
            _ => (30, 10),
        };
        let body = format!(
            r#"{{"fund": {{"name": "Fund {id}"}},
                "performance": {{"12m": {{"return": 10.0, "volatility": 5.0}}}},
                "months": {{"positive": {positive}, "negative": {negative}}}}}"#
        );
        parse_stats(&body)
    }
}

#[test]
fn extreme_month_counts_do_not_abort_the_run() {
    let outcome = fetch_all(
        &StatsBodyProvider,
        &entries(&["1", "2", "3"]),
        &Throttle::disabled(),
        &SilentProgress,
    );

    assert_eq!(outcome.total(), 3);
    assert_eq!(outcome.found.len(), 3);
    let extreme = &outcome.found[1];
    assert_eq!(extreme.identifier.as_str(), "2");
    assert!(extreme.positive_months_pct.unwrap() > 99.9);
    assert_eq!(outcome.found[0].positive_months_pct, Some(75.0));
}
