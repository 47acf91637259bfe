//! Injected scoring configuration
//!
//! Band thresholds, dimension sets and control weights are administrator
//! data. They arrive here as a value, never as module-level constants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::bands::{BandTables, RiskScale};
use crate::effectiveness::{FactorWeights, WeightedControlScorer};
use crate::error::{ScoringError, ScoringResult};
use crate::grid::DEFAULT_TOLERANCE;
use crate::impact::ImpactDimension;
use crate::inherent::EvaluationMode;

/// Per-mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeConfig {
    /// Scale the mode classifies on
    pub scale: RiskScale,
    /// Dimensions every evaluation in this mode must rate
    pub dimensions: Vec<ImpactDimension>,
}

impl ModeConfig {
    fn validate(&self, mode: EvaluationMode) -> ScoringResult<()> {
        if self.dimensions.is_empty() {
            return Err(ScoringError::InvalidConfig(format!("{mode} must rate at least one dimension")));
        }
        let unique: BTreeSet<_> = self.dimensions.iter().collect();
        if unique.len() != self.dimensions.len() {
            return Err(ScoringError::InvalidConfig(format!("{mode} lists a dimension twice")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub bands: BandTables,
    pub average_impact: ModeConfig,
    pub maximum_impact: ModeConfig,
    pub control_weights: FactorWeights,
    pub grid_tolerance: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            bands: BandTables::default(),
            average_impact: ModeConfig {
                scale: RiskScale::PercentOfMax,
                dimensions: ImpactDimension::OPERATIONAL.to_vec(),
            },
            maximum_impact: ModeConfig {
                scale: RiskScale::RawProduct,
                dimensions: ImpactDimension::INFORMATION_SECURITY.to_vec(),
            },
            control_weights: FactorWeights::default(),
            grid_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ScoringConfig {
    pub fn mode(&self, mode: EvaluationMode) -> &ModeConfig {
        match mode {
            EvaluationMode::AverageImpact => &self.average_impact,
            EvaluationMode::MaximumImpact => &self.maximum_impact,
        }
    }

    /// Default six-factor scorer built from the configured weights
    pub fn scorer(&self) -> ScoringResult<WeightedControlScorer> {
        WeightedControlScorer::new(self.control_weights)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        self.bands.validate()?;
        self.average_impact.validate(EvaluationMode::AverageImpact)?;
        self.maximum_impact.validate(EvaluationMode::MaximumImpact)?;
        self.control_weights.validate()?;
        if !self.grid_tolerance.is_finite() || self.grid_tolerance <= 0.0 || self.grid_tolerance >= 0.5 {
            return Err(ScoringError::InvalidConfig(format!(
                "grid tolerance must be in (0, 0.5), got {}",
                self.grid_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_mode_scales_are_distinct() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.mode(EvaluationMode::AverageImpact).scale, RiskScale::PercentOfMax);
        assert_eq!(cfg.mode(EvaluationMode::MaximumImpact).scale, RiskScale::RawProduct);
    }

    #[test]
    fn test_scorer_rejects_bad_weights() {
        let mut cfg = ScoringConfig::default();
        assert!(cfg.scorer().is_ok());
        cfg.control_weights.coverage = -1.0;
        assert!(cfg.scorer().is_err());
    }

    #[test]
    fn test_rejects_duplicate_dimension() {
        let mut cfg = ScoringConfig::default();
        cfg.average_impact.dimensions.push(ImpactDimension::Legal);
        assert!(matches!(cfg.validate(), Err(ScoringError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: ScoringConfig = toml::from_str(
            r#"
            grid_tolerance = 0.005

            [bands.raw]
            low_max = 4
            medium_max = 10
            high_max = 18

            [bands.raw.labels]
            low = "LOW LEVEL"
            medium = "MEDIUM LEVEL"
            high = "HIGH LEVEL"
            critical = "CRITICAL LEVEL"

            [bands.percent]
            low_max = 25
            medium_max = 50
            high_max = 75

            [bands.percent.labels]
            low = "LOW"
            medium = "MEDIUM"
            high = "HIGH"
            critical = "CRITICAL"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bands.raw.high_max, 18.0);
        assert_eq!(cfg.grid_tolerance, 0.005);
        assert_eq!(cfg.average_impact, ScoringConfig::default().average_impact);
        assert!(cfg.validate().is_ok());
    }
}
