//! Chart view filter: profitability versus volatility points for one horizon.

use serde::{Deserialize, Serialize};

use fundscope_core::domain::{Category, FundId, Horizon};

use crate::availability::JoinedRecord;
use crate::config::ChartConfig;

/// One fund projected onto a single horizon, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub identifier: FundId,
    pub category: Category,
    pub name: String,
    pub profitability: f64,
    pub volatility: f64,
}

/// Inclusive visible window on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartBounds {
    pub min_profitability: f64,
    pub max_profitability: f64,
    pub min_volatility: f64,
    pub max_volatility: f64,
}

impl ChartBounds {
    pub fn suggested(config: &ChartConfig) -> Self {
        Self {
            min_profitability: config.suggested_min_profitability,
            max_profitability: config.suggested_max_profitability,
            min_volatility: config.suggested_min_volatility,
            max_volatility: config.suggested_max_volatility,
        }
    }

    /// Tightest window holding every plottable point of `horizon`.
    ///
    /// `None` when no record has both values on that horizon.
    pub fn from_data(records: &[JoinedRecord], horizon: Horizon) -> Option<Self> {
        let mut points = records.iter().filter_map(|r| project(r, horizon));
        let first = points.next()?;
        let init = Self {
            min_profitability: first.profitability,
            max_profitability: first.profitability,
            min_volatility: first.volatility,
            max_volatility: first.volatility,
        };
        Some(points.fold(init, |b, p| Self {
            min_profitability: b.min_profitability.min(p.profitability),
            max_profitability: b.max_profitability.max(p.profitability),
            min_volatility: b.min_volatility.min(p.volatility),
            max_volatility: b.max_volatility.max(p.volatility),
        }))
    }

    pub fn contains(&self, point: &ChartPoint) -> bool {
        (self.min_profitability..=self.max_profitability).contains(&point.profitability)
            && (self.min_volatility..=self.max_volatility).contains(&point.volatility)
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn project(record: &JoinedRecord, horizon: Horizon) -> Option<ChartPoint> {
    let asset = &record.scored.asset;
    Some(ChartPoint {
        identifier: asset.identifier.clone(),
        category: asset.category,
        name: asset.name.clone(),
        profitability: round2(asset.profitability(horizon)?),
        volatility: round2(asset.volatility(horizon)?),
    })
}

/// Points of `horizon` inside `bounds`, in input order.
///
/// Records missing either value on that horizon are left out.
pub fn chart_points(
    records: &[JoinedRecord],
    horizon: Horizon,
    bounds: &ChartBounds,
) -> Vec<ChartPoint> {
    records
        .iter()
        .filter_map(|r| project(r, horizon))
        .filter(|p| bounds.contains(p))
        .collect()
}
