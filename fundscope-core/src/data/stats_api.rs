//! Generic stats provider.
//!
//! The generic stats resource is keyed by `{id}:{suffix}` and returns a nested
//! document whose layout differs from the fund details endpoint. The body is
//! flattened into dotted paths and mapped onto canonical field names through
//! [`FIELD_MAP`]; everything outside the table is dropped.

use std::collections::BTreeMap;

use serde_json::Value;

use super::maisretorno::{build_client, HttpSettings};
use super::provider::{DataError, FundStatsProvider};
use crate::domain::{FundId, FundStats, Horizon};

/// Dotted response path → canonical field name.
pub const FIELD_MAP: &[(&str, &str)] = &[
    ("fund.name", "name"),
    ("performance.12m.return", "profitability_12m"),
    ("performance.12m.volatility", "volatility_12m"),
    ("performance.36m.return", "profitability_36m"),
    ("performance.36m.volatility", "volatility_36m"),
    ("performance.60m.return", "profitability_60m"),
    ("performance.60m.volatility", "volatility_60m"),
    ("performance.inception.return", "profitability_begin"),
    ("performance.inception.volatility", "volatility_begin"),
    ("performance.inception.sharpe", "sharpe_ratio_begin"),
    ("months.positive", "positive_months"),
    ("months.negative", "negative_months"),
];

/// Flatten nested objects into `a.b.c` keys. Arrays and scalars are leaves.
pub fn flatten(value: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, path, out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.insert(prefix, value.clone());
            }
        }
    }
}

/// Keep only mapped paths, under their canonical names.
pub fn rename_fields(flat: &BTreeMap<String, Value>) -> BTreeMap<&'static str, Value> {
    FIELD_MAP
        .iter()
        .filter_map(|(path, canonical)| flat.get(*path).map(|v| (*canonical, v.clone())))
        .collect()
}

fn number(fields: &BTreeMap<&'static str, Value>, key: &str) -> Result<Option<f64>, DataError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(DataError::ResponseFormatChanged(format!(
            "field '{key}' is not a number: {other}"
        ))),
    }
}

fn count(fields: &BTreeMap<&'static str, Value>, key: &str) -> Result<Option<u32>, DataError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("field '{key}' is not a month count: {n}"))
            }),
        Some(other) => Err(DataError::ResponseFormatChanged(format!(
            "field '{key}' is not a month count: {other}"
        ))),
    }
}

/// Parse a generic stats body into normalized statistics.
pub fn parse_stats(body: &str) -> Result<FundStats, DataError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("generic stats: {e}")))?;
    let fields = rename_fields(&flatten(&root));

    let name = match fields.get("name") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(DataError::MissingField("name".into())),
    };

    let mut stats = FundStats {
        name,
        sharpe_ratio_begin: number(&fields, "sharpe_ratio_begin")?,
        positive_months: count(&fields, "positive_months")?,
        negative_months: count(&fields, "negative_months")?,
        ..FundStats::default()
    };
    for horizon in Horizon::ALL {
        let h = stats.horizon_mut(horizon);
        h.profitability = number(&fields, &format!("profitability_{}", horizon.suffix()))?;
        h.volatility = number(&fields, &format!("volatility_{}", horizon.suffix()))?;
    }
    Ok(stats)
}

/// Generic stats provider backed by one reusable HTTP client.
pub struct StatsApiProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    suffix: String,
}

impl StatsApiProvider {
    pub fn new(settings: &HttpSettings, suffix: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(settings)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            suffix: suffix.into(),
        })
    }

    pub fn stats_url(&self, id: &FundId) -> String {
        format!("{}/{id}:{}", self.base_url, self.suffix)
    }
}

impl FundStatsProvider for StatsApiProvider {
    fn name(&self) -> &str {
        "stats_api"
    }

    fn fetch(&self, id: &FundId) -> Result<FundStats, DataError> {
        let url = self.stats_url(id);
        tracing::debug!(%url, "requesting generic stats");

        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text()?;
        parse_stats(&body)
    }
}
