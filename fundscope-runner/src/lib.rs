//! FundScope Runner: scoring, ranking, availability join, and export.
//!
//! This crate builds on `fundscope-core` to provide:
//! - Pipeline configuration (TOML)
//! - Per-horizon scores and their aggregate
//! - Stable ranking by aggregate score
//! - Availability join against the secondary listing
//! - Chart view filter
//! - CSV/JSON artifacts for each run

pub mod availability;
pub mod chart;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod ranking;
pub mod score;

pub use availability::{join_availability, without_availability, JoinKeyPolicy, JoinedRecord};
pub use chart::{chart_points, round2, ChartBounds, ChartPoint};
pub use config::{
    ChartConfig, ConfigError, FetchConfig, OfferingsConfig, PipelineConfig, StatsApiConfig,
};
pub use export::{
    export_chart_csv, export_not_found_csv, export_records_csv, import_records_csv,
    load_manifest, load_records_csv, save_artifacts, ArtifactPaths, RunManifest,
    SCHEMA_VERSION,
};
pub use pipeline::{
    catalog_fingerprint, run_from_config, run_pipeline, PipelineError, PipelineReport,
    StatsSource,
};
pub use ranking::rank;
pub use score::{compute_scores, score_record, score_records, ScoredRecord, Scores};
