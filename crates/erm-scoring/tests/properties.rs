//! Property tests for the scoring engine

use erm_scoring::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn average_is_sum_over_len(values in prop::collection::vec(0u8..=5, 1..12)) {
        let expected = values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64;
        prop_assert!((impact_average(&values) - expected).abs() < 1e-12);
    }

    #[test]
    fn inherent_is_product_on_grid(p in 1u8..=5, i in 1u8..=5) {
        let risk = inherent_risk(f64::from(i), Probability::new(p).unwrap());
        if (p, i) == (2, 2) {
            prop_assert_eq!(risk, 3.99);
        } else {
            prop_assert_eq!(risk, f64::from(p) * f64::from(i));
        }
    }

    #[test]
    fn grid_round_trips_cell_value(p in 1u8..=5, i in 1u8..=5) {
        let risk = inherent_risk(f64::from(i), Probability::new(p).unwrap());
        let cell = map_to_grid(risk);
        // products shared by several cells resolve to an equal-valued cell
        prop_assert_eq!(cell.value(), risk);
        if (p, i) == (2, 2) {
            prop_assert_eq!(cell, GridCell::new(2, 2));
        }
    }

    #[test]
    fn grid_always_in_bounds(score in -50.0f64..80.0) {
        let cell = map_to_grid(score);
        prop_assert!((1..=5).contains(&cell.probability));
        prop_assert!((1..=5).contains(&cell.impact));
    }

    #[test]
    fn grid_never_under_represents(score in 1.0f64..=25.0) {
        let cell = map_to_grid(score);
        prop_assert!(cell.value() >= score - 0.01);
    }

    #[test]
    fn effectiveness_monotone(a in 0.0f64..=5.0, b in 0.0f64..=5.0, c in 0.0f64..=5.0, bump in 0.0f64..=5.0) {
        let base = ThreeFactorScores::new(a, b, c).unwrap().effectiveness();
        let raised = ThreeFactorScores::new((a + bump).min(5.0), b, c).unwrap().effectiveness();
        prop_assert!(raised >= base);
        prop_assert!((0.0..=1.0).contains(&base));
    }

    #[test]
    fn residual_bounded_by_inherent(inherent in 0.0f64..=25.0, e in 0.0f64..=1.0) {
        let r = residual_risk(inherent, e);
        prop_assert!(r >= 0.0 && r <= inherent);
    }

    #[test]
    fn classification_is_monotone(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let tables = BandTables::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            classify(lo, RiskScale::PercentOfMax, &tables) <= classify(hi, RiskScale::PercentOfMax, &tables)
        );
    }
}

#[test]
fn percent_scale_tie_breaks() {
    let tables = BandTables::default();
    assert_eq!(classify(25.0, RiskScale::PercentOfMax, &tables), RiskBand::Low);
    assert_eq!(classify(25.01, RiskScale::PercentOfMax, &tables), RiskBand::Medium);
    assert_eq!(classify(100.0, RiskScale::PercentOfMax, &tables), RiskBand::Critical);
}
