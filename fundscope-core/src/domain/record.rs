use serde::{Deserialize, Serialize};

use super::category::Category;
use super::horizon::Horizon;
use super::ids::FundId;

/// Profitability and volatility for one horizon, in percent.
///
/// Either value can be absent: providers report `null` for windows the fund
/// has not been alive long enough to cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizonStats {
    pub profitability: Option<f64>,
    pub volatility: Option<f64>,
}

impl HorizonStats {
    pub fn new(profitability: f64, volatility: f64) -> Self {
        Self {
            profitability: Some(profitability),
            volatility: Some(volatility),
        }
    }
}

/// Normalized payload returned by a statistics provider for one fund.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundStats {
    pub name: String,
    pub last_12_months: HorizonStats,
    pub last_36_months: HorizonStats,
    pub last_60_months: HorizonStats,
    pub begin: HorizonStats,
    pub sharpe_ratio_begin: Option<f64>,
    pub positive_months: Option<u32>,
    pub negative_months: Option<u32>,
}

impl FundStats {
    pub fn horizon_mut(&mut self, horizon: Horizon) -> &mut HorizonStats {
        match horizon {
            Horizon::Months12 => &mut self.last_12_months,
            Horizon::Months36 => &mut self.last_36_months,
            Horizon::Months60 => &mut self.last_60_months,
            Horizon::Begin => &mut self.begin,
        }
    }

    /// Share of positive and negative months, in percent.
    ///
    /// Both are `None` unless both counts are known and at least one month
    /// was recorded.
    pub fn month_percentages(&self) -> (Option<f64>, Option<f64>) {
        match (self.positive_months, self.negative_months) {
            (Some(pos), Some(neg)) if pos > 0 || neg > 0 => {
                let total = f64::from(pos) + f64::from(neg);
                (
                    Some(f64::from(pos) / total * 100.0),
                    Some(f64::from(neg) / total * 100.0),
                )
            }
            _ => (None, None),
        }
    }
}

/// One catalog entry: an identifier and the category it was listed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub identifier: FundId,
    pub category: Category,
}

/// A successfully fetched fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub identifier: FundId,
    pub category: Category,
    pub name: String,
    pub last_12_months: HorizonStats,
    pub last_36_months: HorizonStats,
    pub last_60_months: HorizonStats,
    pub begin: HorizonStats,
    pub sharpe_ratio_begin: Option<f64>,
    pub positive_months_pct: Option<f64>,
    pub negative_months_pct: Option<f64>,
}

impl AssetRecord {
    pub fn from_stats(entry: &CatalogEntry, stats: FundStats) -> Self {
        let (positive_months_pct, negative_months_pct) = stats.month_percentages();
        Self {
            identifier: entry.identifier.clone(),
            category: entry.category,
            name: stats.name,
            last_12_months: stats.last_12_months,
            last_36_months: stats.last_36_months,
            last_60_months: stats.last_60_months,
            begin: stats.begin,
            sharpe_ratio_begin: stats.sharpe_ratio_begin,
            positive_months_pct,
            negative_months_pct,
        }
    }

    pub fn horizon(&self, horizon: Horizon) -> &HorizonStats {
        match horizon {
            Horizon::Months12 => &self.last_12_months,
            Horizon::Months36 => &self.last_36_months,
            Horizon::Months60 => &self.last_60_months,
            Horizon::Begin => &self.begin,
        }
    }

    pub fn profitability(&self, horizon: Horizon) -> Option<f64> {
        self.horizon(horizon).profitability
    }

    pub fn volatility(&self, horizon: Horizon) -> Option<f64> {
        self.horizon(horizon).volatility
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_percentages_split_total() {
        let stats = FundStats {
            positive_months: Some(30),
            negative_months: Some(10),
            ..Default::default()
        };
        let (pos, neg) = stats.month_percentages();
        assert!((pos.unwrap() - 75.0).abs() < 1e-12);
        assert!((neg.unwrap() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn month_percentages_missing_when_no_months() {
        let stats = FundStats {
            positive_months: Some(0),
            negative_months: Some(0),
            ..Default::default()
        };
        assert_eq!(stats.month_percentages(), (None, None));
        assert_eq!(FundStats::default().month_percentages(), (None, None));
    }

    #[test]
    fn month_percentages_handle_counts_near_u32_max() {
        let stats = FundStats {
            positive_months: Some(u32::MAX),
            negative_months: Some(1),
            ..Default::default()
        };
        let (pos, neg) = stats.month_percentages();
        let (pos, neg) = (pos.unwrap(), neg.unwrap());
        assert!(pos > 99.9 && pos <= 100.0);
        assert!(neg > 0.0 && neg < 1e-6);
    }

    #[test]
    fn record_takes_identity_from_entry() {
        let entry = CatalogEntry {
            identifier: FundId::new("111"),
            category: Category::Outros,
        };
        let stats = FundStats {
            name: "Fund".into(),
            last_12_months: HorizonStats::new(10.0, 5.0),
            ..Default::default()
        };
        let record = AssetRecord::from_stats(&entry, stats);
        assert_eq!(record.identifier.as_str(), "111");
        assert_eq!(record.category, Category::Outros);
        assert_eq!(record.profitability(Horizon::Months12), Some(10.0));
        assert_eq!(record.volatility(Horizon::Begin), None);
    }
}
