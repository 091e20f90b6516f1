//! FundScope Core: domain types, fund catalogs, and statistics fetchers.
//!
//! This crate contains the data side of the pipeline:
//! - Domain types (fund identifiers, categories, horizons, asset records)
//! - Per-category catalog loading
//! - Fund statistics providers behind the `FundStatsProvider` trait
//! - Fixed-delay throttled fetch loop with per-identifier failure capture
//! - Paginated offerings listing of the secondary provider

pub mod data;
pub mod domain;
