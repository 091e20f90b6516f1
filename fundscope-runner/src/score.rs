//! Score engine: per-horizon risk-adjusted scores and their aggregate.
//!
//! All arithmetic runs over `Option<f64>`: a score that cannot be computed is
//! `None`, never NaN or infinity.

use serde::{Deserialize, Serialize};

use fundscope_core::domain::{AssetRecord, Horizon};

/// Per-horizon scores plus the aggregate statistics over them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub score_12m: Option<f64>,
    pub score_36m: Option<f64>,
    pub score_60m: Option<f64>,
    pub score_begin: Option<f64>,
    pub score_mean: Option<f64>,
    pub score_std: Option<f64>,
    pub score_all: Option<f64>,
}

/// A fetched fund with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub asset: AssetRecord,
    pub scores: Scores,
}

/// Profitability over volatility. `None` when either is missing, when
/// volatility is zero, or when the quotient is not finite.
pub fn ratio(profitability: Option<f64>, volatility: Option<f64>) -> Option<f64> {
    let (p, v) = (profitability?, volatility?);
    if v == 0.0 {
        return None;
    }
    Some(p / v).filter(|s| s.is_finite())
}

/// Arithmetic mean of the present values. `None` if it overflows.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64).filter(|m| m.is_finite())
}

/// Population standard deviation (ddof = 0) of the present values.
/// `None` if it overflows.
pub fn population_std_present(values: &[Option<f64>]) -> Option<f64> {
    let mean = mean_present(values)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let var = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / present.len() as f64;
    Some(var.sqrt()).filter(|s| s.is_finite())
}

/// Dispersion of the horizon scores.
///
/// When exactly three of the four horizons are missing the result is the
/// `begin` score itself, whichever horizon the survivor is.
pub fn score_std(scores: [Option<f64>; 4]) -> Option<f64> {
    let missing = scores.iter().filter(|s| s.is_none()).count();
    if missing == 3 {
        return scores[3];
    }
    population_std_present(&scores)
}

/// `mean / std`; `None` when either is missing or `std` is zero.
pub fn score_all(mean: Option<f64>, std: Option<f64>) -> Option<f64> {
    let (m, s) = (mean?, std?);
    if s == 0.0 {
        return None;
    }
    Some(m / s).filter(|v| v.is_finite())
}

/// Compute every score of one record.
pub fn compute_scores(asset: &AssetRecord) -> Scores {
    let h = |horizon| ratio(asset.profitability(horizon), asset.volatility(horizon));
    let per_horizon = [
        h(Horizon::Months12),
        h(Horizon::Months36),
        h(Horizon::Months60),
        h(Horizon::Begin),
    ];

    let mean = mean_present(&per_horizon);
    let std = score_std(per_horizon);

    Scores {
        score_12m: per_horizon[0],
        score_36m: per_horizon[1],
        score_60m: per_horizon[2],
        score_begin: per_horizon[3],
        score_mean: mean,
        score_std: std,
        score_all: score_all(mean, std),
    }
}

pub fn score_record(asset: AssetRecord) -> ScoredRecord {
    let scores = compute_scores(&asset);
    ScoredRecord { asset, scores }
}

pub fn score_records(assets: Vec<AssetRecord>) -> Vec<ScoredRecord> {
    assets.into_iter().map(score_record).collect()
}
