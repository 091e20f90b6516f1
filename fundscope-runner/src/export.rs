//! Result export: ranked table, not-found list, chart points, and run manifest.
//!
//! The ranked table is a flat CSV with one column per field and an empty cell
//! for every missing value. It re-imports losslessly, so a saved table can be
//! fed back into the chart filter without refetching.
//!
//! The manifest carries a `schema_version`; unknown versions are rejected on
//! load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use fundscope_core::data::FetchFailure;
use fundscope_core::domain::{AssetRecord, Category, FundId, HorizonStats};

use crate::availability::JoinedRecord;
use crate::chart::ChartPoint;
use crate::pipeline::PipelineReport;
use crate::score::{ScoredRecord, Scores};

/// Current manifest schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Latest ranked table, overwritten on every run.
pub const LATEST_TABLE: &str = "fund_scores.csv";
pub const NOT_FOUND_FILE: &str = "not_found.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

// ─── Ranked table ───────────────────────────────────────────────────

/// One row of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ResultRow {
    rank: usize,
    identifier: FundId,
    category: Category,
    name: String,
    profitability_12m: Option<f64>,
    volatility_12m: Option<f64>,
    profitability_36m: Option<f64>,
    volatility_36m: Option<f64>,
    profitability_60m: Option<f64>,
    volatility_60m: Option<f64>,
    profitability_begin: Option<f64>,
    volatility_begin: Option<f64>,
    sharpe_ratio_begin: Option<f64>,
    positive_months_pct: Option<f64>,
    negative_months_pct: Option<f64>,
    score_12m: Option<f64>,
    score_36m: Option<f64>,
    score_60m: Option<f64>,
    score_begin: Option<f64>,
    score_mean: Option<f64>,
    score_std: Option<f64>,
    score_all: Option<f64>,
    available_on_secondary: bool,
}

impl ResultRow {
    fn from_record(rank: usize, record: &JoinedRecord) -> Self {
        let a = &record.scored.asset;
        let s = &record.scored.scores;
        Self {
            rank,
            identifier: a.identifier.clone(),
            category: a.category,
            name: a.name.clone(),
            profitability_12m: a.last_12_months.profitability,
            volatility_12m: a.last_12_months.volatility,
            profitability_36m: a.last_36_months.profitability,
            volatility_36m: a.last_36_months.volatility,
            profitability_60m: a.last_60_months.profitability,
            volatility_60m: a.last_60_months.volatility,
            profitability_begin: a.begin.profitability,
            volatility_begin: a.begin.volatility,
            sharpe_ratio_begin: a.sharpe_ratio_begin,
            positive_months_pct: a.positive_months_pct,
            negative_months_pct: a.negative_months_pct,
            score_12m: s.score_12m,
            score_36m: s.score_36m,
            score_60m: s.score_60m,
            score_begin: s.score_begin,
            score_mean: s.score_mean,
            score_std: s.score_std,
            score_all: s.score_all,
            available_on_secondary: record.available_on_secondary,
        }
    }

    fn into_record(self) -> JoinedRecord {
        let stats = |profitability, volatility| HorizonStats {
            profitability,
            volatility,
        };
        JoinedRecord {
            scored: ScoredRecord {
                asset: AssetRecord {
                    identifier: self.identifier,
                    category: self.category,
                    name: self.name,
                    last_12_months: stats(self.profitability_12m, self.volatility_12m),
                    last_36_months: stats(self.profitability_36m, self.volatility_36m),
                    last_60_months: stats(self.profitability_60m, self.volatility_60m),
                    begin: stats(self.profitability_begin, self.volatility_begin),
                    sharpe_ratio_begin: self.sharpe_ratio_begin,
                    positive_months_pct: self.positive_months_pct,
                    negative_months_pct: self.negative_months_pct,
                },
                scores: Scores {
                    score_12m: self.score_12m,
                    score_36m: self.score_36m,
                    score_60m: self.score_60m,
                    score_begin: self.score_begin,
                    score_mean: self.score_mean,
                    score_std: self.score_std,
                    score_all: self.score_all,
                },
            },
            available_on_secondary: self.available_on_secondary,
        }
    }
}

/// Export ranked records as CSV. `rank` starts at 1 and follows slice order.
pub fn export_records_csv(records: &[JoinedRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for (i, record) in records.iter().enumerate() {
        wtr.serialize(ResultRow::from_record(i + 1, record))
            .with_context(|| format!("failed to write row for {}", record.scored.asset.identifier))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse a table written by [`export_records_csv`], in file order.
pub fn import_records_csv(content: &str) -> Result<Vec<JoinedRecord>> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    rdr.deserialize::<ResultRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(ResultRow::into_record)
                .with_context(|| format!("malformed result row {}", i + 1))
        })
        .collect()
}

pub fn load_records_csv(path: &Path) -> Result<Vec<JoinedRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_records_csv(&content)
}

// ─── Not-found list and chart points ────────────────────────────────

pub fn export_not_found_csv(failures: &[FetchFailure]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["identifier", "category", "reason"])?;
    for f in failures {
        wtr.write_record([f.identifier.as_str(), f.category.as_str(), &f.reason])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_chart_csv(points: &[ChartPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["identifier", "category", "name", "profitability", "volatility"])?;
    for p in points {
        wtr.write_record([
            p.identifier.as_str(),
            p.category.as_str(),
            &p.name,
            &format!("{:.2}", p.profitability),
            &format!("{:.2}", p.volatility),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Manifest ───────────────────────────────────────────────────────

/// Run summary stored next to the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
    pub loaded: usize,
    pub found: usize,
    pub not_found: usize,
    pub available_on_secondary: usize,
    pub offerings_count: Option<usize>,
    pub catalog_hash: String,
    pub table_file: String,
}

impl RunManifest {
    pub fn from_report(report: &PipelineReport, table_file: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            started_at: report.started_at,
            finished_at: report.finished_at,
            loaded: report.loaded,
            found: report.found_count(),
            not_found: report.not_found_count(),
            available_on_secondary: report
                .records
                .iter()
                .filter(|r| r.available_on_secondary)
                .count(),
            offerings_count: report.offerings_count,
            catalog_hash: report.catalog_hash.clone(),
            table_file: table_file.to_string(),
        }
    }
}

pub fn export_manifest(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize RunManifest to JSON")
}

/// Deserialize a manifest, rejecting unknown schema versions.
pub fn import_manifest(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize RunManifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Files written by [`save_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub latest: PathBuf,
    pub versioned: PathBuf,
    pub not_found: PathBuf,
    pub manifest: PathBuf,
}

/// Versioned table name for a run finished at `at`.
pub fn versioned_table_name(at: &NaiveDateTime) -> String {
    format!("fund_scores_{}.csv", at.format("%Y-%m-%d--%Hh%M"))
}

/// Save the artifact set of one run under `output_dir`:
/// - `fund_scores.csv`: latest ranked table
/// - `fund_scores_{YYYY-MM-DD--HHhMM}.csv`: the same table, kept per run
/// - `not_found.csv`: identifiers that could not be fetched
/// - `manifest.json`: counts, timestamps and the catalog hash
pub fn save_artifacts(report: &PipelineReport, output_dir: &Path) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let versioned_name = versioned_table_name(&report.finished_at);
    let paths = ArtifactPaths {
        latest: output_dir.join(LATEST_TABLE),
        versioned: output_dir.join(&versioned_name),
        not_found: output_dir.join(NOT_FOUND_FILE),
        manifest: output_dir.join(MANIFEST_FILE),
    };

    let table = export_records_csv(&report.records)?;
    for path in [&paths.latest, &paths.versioned] {
        std::fs::write(path, &table)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    std::fs::write(&paths.not_found, export_not_found_csv(&report.not_found)?)
        .with_context(|| format!("failed to write {}", paths.not_found.display()))?;

    let manifest = RunManifest::from_report(report, &versioned_name);
    std::fs::write(&paths.manifest, export_manifest(&manifest)?)
        .with_context(|| format!("failed to write {}", paths.manifest.display()))?;

    tracing::info!(dir = %output_dir.display(), table = %versioned_name, "artifacts saved");
    Ok(paths)
}

/// Load the manifest of an output directory.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let path = dir.join(MANIFEST_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_manifest(&json)
}
