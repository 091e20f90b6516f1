//! Catalog loading, statistics providers, and the throttled fetch loop

pub mod catalog;
pub mod download;
pub mod maisretorno;
pub mod offerings;
pub mod provider;
pub mod stats_api;
pub mod throttle;

pub use catalog::{catalog_path, load_catalogs, load_category, CatalogError};
pub use download::{fetch_all, fetch_single, FetchOutcome};
pub use maisretorno::{HttpSettings, MaisRetornoProvider};
pub use offerings::{
    collect_offerings, OfferingRecord, OfferingsCatalog, OfferingsPage, OfferingsProvider,
    OfferingsSource, PageRequest,
};
pub use provider::{
    DataError, FetchFailure, FetchProgress, FundStatsProvider, SilentProgress, StdoutProgress,
};
pub use stats_api::StatsApiProvider;
pub use throttle::Throttle;
