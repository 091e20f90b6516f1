//! Fund details provider.
//!
//! Fetches per-fund statistics from the `/v3/funds/stats/{id}/details`
//! endpoint. One request per call, no retries: the fetch loop decides what a
//! failure means for the run.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use super::provider::{DataError, FundStatsProvider};
use crate::domain::{FundId, FundStats, HorizonStats};

/// Connection settings shared by the HTTP providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.maisretorno.com".into(),
            user_agent: "insomnia/8.6.1".into(),
            timeout: None,
        }
    }
}

/// Build the blocking client used for the lifetime of one pipeline run.
pub fn build_client(settings: &HttpSettings) -> Result<reqwest::blocking::Client, DataError> {
    let builder = reqwest::blocking::Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.timeout);
    builder
        .build()
        .map_err(|e| DataError::ClientBuild(e.to_string()))
}

/// Null-tolerant but presence-required number: `null` maps to `None`,
/// an absent key fails deserialization.
fn nullable<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    nicename: String,
    stats: StatsBlock,
}

#[derive(Debug, Deserialize)]
struct StatsBlock {
    timeframe: Timeframe,
}

#[derive(Debug, Deserialize)]
struct Timeframe {
    last_12_months: WindowStats,
    last_36_months: WindowStats,
    last_60_months: WindowStats,
    begin: BeginStats,
}

#[derive(Debug, Deserialize)]
struct WindowStats {
    #[serde(deserialize_with = "nullable")]
    profitability: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    volatility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BeginStats {
    #[serde(deserialize_with = "nullable")]
    profitability: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    volatility: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    sharpe_ratio: Option<f64>,
}

impl From<WindowStats> for HorizonStats {
    fn from(w: WindowStats) -> Self {
        HorizonStats {
            profitability: w.profitability,
            volatility: w.volatility,
        }
    }
}

/// Parse a fund details body into normalized statistics.
pub fn parse_details(body: &str) -> Result<FundStats, DataError> {
    let resp: DetailsResponse = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("fund details: {e}")))?;

    let tf = resp.stats.timeframe;
    Ok(FundStats {
        name: resp.nicename,
        last_12_months: tf.last_12_months.into(),
        last_36_months: tf.last_36_months.into(),
        last_60_months: tf.last_60_months.into(),
        begin: HorizonStats {
            profitability: tf.begin.profitability,
            volatility: tf.begin.volatility,
        },
        sharpe_ratio_begin: tf.begin.sharpe_ratio,
        positive_months: None,
        negative_months: None,
    })
}

/// Fund details provider backed by one reusable HTTP client.
pub struct MaisRetornoProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl MaisRetornoProvider {
    pub fn new(settings: &HttpSettings) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(settings)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the details URL for a fund.
    pub fn details_url(&self, id: &FundId) -> String {
        format!("{}/v3/funds/stats/{id}/details?=", self.base_url)
    }
}

impl FundStatsProvider for MaisRetornoProvider {
    fn name(&self) -> &str {
        "maisretorno"
    }

    fn fetch(&self, id: &FundId) -> Result<FundStats, DataError> {
        let url = self.details_url(id);
        tracing::debug!(%url, "requesting fund details");

        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text()?;
        parse_details(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "nicename": "Alpha FIC FIM",
        "stats": {
            "timeframe": {
                "last_12_months": {"profitability": 10.0, "volatility": 5.0},
                "last_36_months": {"profitability": 30.5, "volatility": null},
                "last_60_months": {"profitability": null, "volatility": null},
                "begin": {"profitability": 120.0, "volatility": 6.0, "sharpe_ratio": 1.4}
            },
            "other": {}
        },
        "unused": 1
    }"#;

    #[test]
    fn parses_all_horizons() {
        let stats = parse_details(BODY).unwrap();
        assert_eq!(stats.name, "Alpha FIC FIM");
        assert_eq!(stats.last_12_months, HorizonStats::new(10.0, 5.0));
        assert_eq!(stats.last_36_months.profitability, Some(30.5));
        assert_eq!(stats.last_36_months.volatility, None);
        assert_eq!(stats.last_60_months, HorizonStats::default());
        assert_eq!(stats.begin, HorizonStats::new(120.0, 6.0));
        assert_eq!(stats.sharpe_ratio_begin, Some(1.4));
    }

    #[test]
    fn missing_horizon_is_a_format_error() {
        let body = r#"{"nicename": "x", "stats": {"timeframe": {
            "last_12_months": {"profitability": 1.0, "volatility": 1.0},
            "last_36_months": {"profitability": 1.0, "volatility": 1.0},
            "begin": {"profitability": 1.0, "volatility": 1.0, "sharpe_ratio": 1.0}
        }}}"#;
        let err = parse_details(body).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
        assert!(err.to_string().contains("last_60_months"));
    }

    #[test]
    fn missing_sharpe_key_is_a_format_error() {
        let body = r#"{"nicename": "x", "stats": {"timeframe": {
            "last_12_months": {"profitability": 1.0, "volatility": 1.0},
            "last_36_months": {"profitability": 1.0, "volatility": 1.0},
            "last_60_months": {"profitability": 1.0, "volatility": 1.0},
            "begin": {"profitability": 1.0, "volatility": 1.0}
        }}}"#;
        assert!(parse_details(body).is_err());
    }

    #[test]
    fn missing_name_is_a_format_error() {
        let body = r#"{"stats": {}}"#;
        assert!(parse_details(body).is_err());
    }

    #[test]
    fn non_json_body_is_a_format_error() {
        assert!(matches!(
            parse_details("<html>blocked</html>"),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }

    #[test]
    fn details_url_trims_trailing_slash() {
        let provider = MaisRetornoProvider::new(&HttpSettings {
            base_url: "https://api.example.com/".into(),
            ..HttpSettings::default()
        })
        .unwrap();
        assert_eq!(
            provider.details_url(&FundId::new("35940266000107")),
            "https://api.example.com/v3/funds/stats/35940266000107/details?="
        );
    }
}
