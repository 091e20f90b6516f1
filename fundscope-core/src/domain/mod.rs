//! Domain types for FundScope

pub mod category;
pub mod horizon;
pub mod ids;
pub mod record;

pub use category::{Category, UnknownCategory};
pub use horizon::Horizon;
pub use ids::FundId;
pub use record::{AssetRecord, CatalogEntry, FundStats, HorizonStats};
