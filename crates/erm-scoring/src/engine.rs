//! Scoring engine
//!
//! Ties the pure functions together for one evaluation. Borrowing the
//! config keeps every call side-effect free.

use serde::{Deserialize, Serialize};

use crate::bands::{classify, RiskBand, RiskScale};
use crate::config::ScoringConfig;
use crate::effectiveness::{ControlAssessment, ControlScorer};
use crate::error::ScoringResult;
use crate::grid::{map_to_grid_with_tolerance, GridCell};
use crate::impact::ImpactScores;
use crate::inherent::{inherent_risk, EvaluationMode, Probability};
use crate::residual::{combine_residual, residual_risk};

/// Everything derived from an evaluation's inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InherentAssessment {
    pub mode: EvaluationMode,
    pub scale: RiskScale,
    pub probability: Probability,
    pub impact_average: f64,
    pub impact_maximum: u8,
    /// Impact value fed into the inherent formula for this mode
    pub impact_global: f64,
    pub inherent_risk: f64,
    pub risk_level: RiskBand,
    pub risk_level_label: String,
    pub inherent_cell: GridCell,
}

/// Derived fields for one control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlOutcome {
    pub score: f64,
    pub effectiveness: f64,
    pub residual_risk: f64,
    pub residual_level: RiskBand,
}

/// Residual fields of an evaluation once controls exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualAssessment {
    pub residual_probability: u8,
    pub residual_impact: u8,
    pub residual_risk: f64,
    pub residual_level: RiskBand,
    pub residual_level_label: String,
}

pub struct ScoringEngine<'a> {
    config: &'a ScoringConfig,
    scorer: &'a dyn ControlScorer,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(config: &'a ScoringConfig, scorer: &'a dyn ControlScorer) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.config
    }

    /// Classify a raw product score on the given scale
    pub fn classify_raw(&self, raw: f64, scale: RiskScale) -> RiskBand {
        classify(scale.from_raw(raw), scale, &self.config.bands)
    }

    pub fn label(&self, band: RiskBand, scale: RiskScale) -> &str {
        self.config.bands.table(scale).label(band)
    }

    pub fn map_to_grid(&self, score: f64) -> GridCell {
        map_to_grid_with_tolerance(score, self.config.grid_tolerance)
    }

    pub fn assess_inherent(
        &self,
        mode: EvaluationMode,
        probability: Probability,
        impacts: &ImpactScores,
    ) -> ScoringResult<InherentAssessment> {
        let mode_config = self.config.mode(mode);
        impacts.validate(&mode_config.dimensions)?;

        let impact_global = mode.impact_of(impacts);
        let inherent = inherent_risk(impact_global, probability);
        let scale = mode_config.scale;
        let risk_level = self.classify_raw(inherent, scale);

        Ok(InherentAssessment {
            mode,
            scale,
            probability,
            impact_average: impacts.average(),
            impact_maximum: impacts.maximum(),
            impact_global,
            inherent_risk: inherent,
            risk_level,
            risk_level_label: self.label(risk_level, scale).to_string(),
            inherent_cell: self.map_to_grid(inherent),
        })
    }

    pub fn assess_control(
        &self,
        inherent: &InherentAssessment,
        assessment: &ControlAssessment,
    ) -> ScoringResult<ControlOutcome> {
        let score = assessment.score(self.scorer)?;
        let residual = residual_risk(inherent.inherent_risk, score.effectiveness);
        Ok(ControlOutcome {
            score: score.score,
            effectiveness: score.effectiveness,
            residual_risk: residual,
            residual_level: self.classify_raw(residual, inherent.scale),
        })
    }

    /// Combine control effectivenesses into the evaluation's residual
    /// fields; `None` when there are no controls.
    pub fn assess_residual<I>(&self, inherent: &InherentAssessment, effectivenesses: I) -> Option<ResidualAssessment>
    where
        I: IntoIterator<Item = f64>,
    {
        let residual = combine_residual(inherent.inherent_risk, effectivenesses)?;
        let band = self.classify_raw(residual, inherent.scale);
        let cell = self.map_to_grid(residual);
        Some(ResidualAssessment {
            residual_probability: cell.probability,
            residual_impact: cell.impact,
            residual_risk: residual,
            residual_level: band,
            residual_level_label: self.label(band, inherent.scale).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effectiveness::{ThreeFactorScores, WeightedControlScorer};
    use crate::impact::ImpactDimension;

    fn scenario_impacts() -> ImpactScores {
        ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5, 2, 1, 5, 3, 4, 2])
    }

    #[test]
    fn test_average_mode_scenario() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        let a = engine
            .assess_inherent(EvaluationMode::AverageImpact, Probability::new(4).unwrap(), &scenario_impacts())
            .unwrap();
        assert!((a.impact_average - 3.142857).abs() < 1e-6);
        assert!((a.inherent_risk - 12.5714).abs() < 1e-4);
        // 50.29% of max
        assert_eq!(a.risk_level, RiskBand::High);
        assert_eq!(a.impact_maximum, 5);
    }

    #[test]
    fn test_raw_scale_scenario_is_high_not_critical() {
        let mut config = ScoringConfig::default();
        config.average_impact.scale = RiskScale::RawProduct;
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        let a = engine
            .assess_inherent(EvaluationMode::AverageImpact, Probability::new(4).unwrap(), &scenario_impacts())
            .unwrap();
        assert_eq!(a.risk_level, RiskBand::High);
        assert_eq!(a.risk_level_label, "HIGH LEVEL");
    }

    #[test]
    fn test_control_scenario_residual_is_medium() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        // all fives on the operational set at probability 4 gives 20
        let impacts = ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5; 7]);
        let inherent = engine
            .assess_inherent(EvaluationMode::AverageImpact, Probability::new(4).unwrap(), &impacts)
            .unwrap();
        assert_eq!(inherent.inherent_risk, 20.0);

        let control = ControlAssessment::ThreeFactor(ThreeFactorScores::new(3.0, 4.0, 3.0).unwrap());
        let outcome = engine.assess_control(&inherent, &control).unwrap();
        assert!((outcome.effectiveness - 0.6667).abs() < 1e-4);
        assert!((outcome.residual_risk - 6.667).abs() < 1e-3);
        assert_eq!(outcome.residual_level, RiskBand::Medium);

        let residual = engine.assess_residual(&inherent, [outcome.effectiveness]).unwrap();
        assert_eq!(residual.residual_level, RiskBand::Medium);
        assert_eq!((residual.residual_probability, residual.residual_impact), (2, 4));
    }

    #[test]
    fn test_maximum_mode_uses_highest_dimension() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        let impacts =
            ImpactScores::from_pairs(&ImpactDimension::INFORMATION_SECURITY, &[4, 3, 2, 1, 3, 2, 2, 1]);
        let a = engine
            .assess_inherent(EvaluationMode::MaximumImpact, Probability::new(5).unwrap(), &impacts)
            .unwrap();
        assert_eq!(a.impact_global, 4.0);
        assert_eq!(a.inherent_risk, 20.0);
        assert_eq!(a.scale, RiskScale::RawProduct);
        assert_eq!(a.risk_level, RiskBand::Critical);
    }

    #[test]
    fn test_mode_dimension_set_enforced() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        let result = engine.assess_inherent(
            EvaluationMode::MaximumImpact,
            Probability::new(3).unwrap(),
            &scenario_impacts(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_controls_no_residual() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);
        let inherent = engine
            .assess_inherent(EvaluationMode::AverageImpact, Probability::new(1).unwrap(), &scenario_impacts())
            .unwrap();
        assert!(engine.assess_residual(&inherent, Vec::new()).is_none());
    }
}
