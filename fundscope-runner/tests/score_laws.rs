//! Property tests for the score engine and ranking.

use proptest::prelude::*;

use fundscope_core::domain::{AssetRecord, Category, FundId, HorizonStats};
use fundscope_runner::score::{mean_present, population_std_present, score_std};
use fundscope_runner::{compute_scores, rank, score_records};

fn horizon_value() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(-50.0f64..50.0)
}

fn horizon_stats() -> impl Strategy<Value = HorizonStats> {
    (horizon_value(), prop::option::of(0.0f64..40.0)).prop_map(|(p, v)| HorizonStats {
        profitability: p,
        volatility: v,
    })
}

fn asset() -> impl Strategy<Value = AssetRecord> {
    (horizon_stats(), horizon_stats(), horizon_stats(), horizon_stats()).prop_map(
        |(m12, m36, m60, begin)| AssetRecord {
            identifier: FundId::new("1"),
            category: Category::Outros,
            name: "Fund".into(),
            last_12_months: m12,
            last_36_months: m36,
            last_60_months: m60,
            begin,
            sharpe_ratio_begin: None,
            positive_months_pct: None,
            negative_months_pct: None,
        },
    )
}

proptest! {
    #[test]
    fn scores_are_never_nan_or_infinite(a in asset()) {
        let s = compute_scores(&a);
        let all = [
            s.score_12m, s.score_36m, s.score_60m, s.score_begin,
            s.score_mean, s.score_std, s.score_all,
        ];
        for v in all.into_iter().flatten() {
            prop_assert!(v.is_finite());
        }
    }

    #[test]
    fn all_present_uses_mean_and_population_std(
        values in prop::array::uniform4(-10.0f64..10.0)
    ) {
        let scores = values.map(Some);
        let mean = values.iter().sum::<f64>() / 4.0;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
        prop_assert!((mean_present(&scores).unwrap() - mean).abs() < 1e-9);
        prop_assert!((score_std(scores).unwrap() - var.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn three_missing_std_is_begin(value in -10.0f64..10.0, slot in 0usize..4) {
        let mut scores = [None; 4];
        scores[slot] = Some(value);
        // Begin is the survivor only when slot == 3; otherwise it is missing.
        prop_assert_eq!(score_std(scores), scores[3]);
    }

    #[test]
    fn population_std_is_non_negative(values in prop::collection::vec(horizon_value(), 4)) {
        if let Some(std) = population_std_present(&values) {
            prop_assert!(std >= 0.0);
        }
    }

    #[test]
    fn ranking_is_a_descending_permutation(assets in prop::collection::vec(asset(), 0..20)) {
        let mut scored = score_records(assets);
        let before = scored.len();
        rank(&mut scored);
        prop_assert_eq!(scored.len(), before);

        let keys: Vec<Option<f64>> = scored.iter().map(|s| s.scores.score_all).collect();
        let first_missing = keys.iter().position(Option::is_none).unwrap_or(keys.len());
        prop_assert!(keys[first_missing..].iter().all(Option::is_none));
        for w in keys[..first_missing].windows(2) {
            prop_assert!(w[0] >= w[1]);
        }
    }
}
