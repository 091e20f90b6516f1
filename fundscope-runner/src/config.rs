//! Serializable pipeline configuration.
//!
//! Every component receives its slice of this struct at construction time;
//! nothing is read from process-wide state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fundscope_core::data::{HttpSettings, PageRequest, Throttle};
use fundscope_core::domain::{Category, Horizon};

use crate::availability::JoinKeyPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Categories to load, in order.
    pub categories: Vec<Category>,
    /// Directory holding one catalog file per category.
    pub catalog_dir: PathBuf,
    /// Catalog file name prefix; the file is `{prefix}{CATEGORY}.json`.
    pub catalog_file_prefix: String,
    /// Where `fetch` writes its artifacts.
    pub output_dir: PathBuf,
    pub fetch: FetchConfig,
    pub stats_api: StatsApiConfig,
    pub offerings: OfferingsConfig,
    pub chart: ChartConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            catalog_dir: PathBuf::from("input"),
            catalog_file_prefix: "SuperCarteira_".into(),
            output_dir: PathBuf::from("output"),
            fetch: FetchConfig::default(),
            stats_api: StatsApiConfig::default(),
            offerings: OfferingsConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("categories must not be empty".into()));
        }
        if self.fetch.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("fetch.base_url must not be empty".into()));
        }
        if self.offerings.page_size == 0 {
            return Err(ConfigError::Invalid("offerings.page_size must be positive".into()));
        }
        if self.offerings.max_pages == 0 {
            return Err(ConfigError::Invalid("offerings.max_pages must be positive".into()));
        }
        if self.chart.suggested_min_profitability > self.chart.suggested_max_profitability
            || self.chart.suggested_min_volatility > self.chart.suggested_max_volatility
        {
            return Err(ConfigError::Invalid("chart suggested bounds are inverted".into()));
        }
        Ok(())
    }
}

/// Primary statistics endpoint and request pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Pause before every statistics request, in milliseconds.
    pub delay_ms: u64,
    /// Per-request timeout. Absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.maisretorno.com".into(),
            user_agent: "insomnia/8.6.1".into(),
            delay_ms: 2000,
            timeout_secs: None,
        }
    }
}

impl FetchConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::from_millis(self.delay_ms)
    }
}

/// Generic stats endpoint (alternative statistics source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsApiConfig {
    pub base_url: String,
    /// Type suffix appended to the identifier (`{id}:{suffix}`).
    pub suffix: String,
}

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.maisretorno.com/v1/general/stats".into(),
            suffix: "fi".into(),
        }
    }
}

/// Secondary provider listing used for the availability join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferingsConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Item field holding the fund identifier.
    pub identifier_field: String,
    pub page_size: usize,
    pub max_pages: usize,
    pub sort_field: String,
    pub sort_direction: String,
    pub join_key: JoinKeyPolicy,
}

impl Default for OfferingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.example-broker.com/funds".into(),
            identifier_field: "cnpj".into(),
            page_size: 100,
            max_pages: 50,
            sort_field: "name".into(),
            sort_direction: "asc".into(),
            join_key: JoinKeyPolicy::Exact,
        }
    }
}

impl OfferingsConfig {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page_size: self.page_size,
            max_pages: self.max_pages,
            sort_field: self.sort_field.clone(),
            sort_direction: self.sort_direction.clone(),
        }
    }

    /// Listing connection settings; identity and timeout follow `fetch`.
    pub fn http_settings(&self, fetch: &FetchConfig) -> HttpSettings {
        HttpSettings {
            base_url: self.base_url.clone(),
            ..fetch.http_settings()
        }
    }
}

/// Defaults for the chart view filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub horizon: Horizon,
    pub suggested_min_profitability: f64,
    pub suggested_max_profitability: f64,
    pub suggested_min_volatility: f64,
    pub suggested_max_volatility: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            horizon: Horizon::Months60,
            suggested_min_profitability: 0.0,
            suggested_max_profitability: 999_999.0,
            suggested_min_volatility: 0.0,
            suggested_max_volatility: 100.0,
        }
    }
}
