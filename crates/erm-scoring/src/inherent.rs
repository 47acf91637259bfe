//! Inherent risk

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ScoringError, ScoringResult};
use crate::grid::{cell_value, GRID_SIZE};
use crate::impact::ImpactScores;

/// Probability level on the 1..=5 axis. Zero is meaningless under
/// `impact × probability` and is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Probability(u8);

impl Probability {
    pub fn new(value: u8) -> ScoringResult<Self> {
        if (1..=GRID_SIZE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoringError::ProbabilityOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Probability {
    type Error = ScoringError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for u8 {
    fn from(p: Probability) -> u8 {
        p.0
    }
}

/// Which impact value feeds the inherent formula
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Mean of all rated dimensions
    #[default]
    AverageImpact,
    /// Highest rated dimension ("global impact")
    MaximumImpact,
}

impl EvaluationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AverageImpact => "average_impact",
            Self::MaximumImpact => "maximum_impact",
        }
    }

    /// Impact value this mode uses for the given scores
    pub fn impact_of(&self, scores: &ImpactScores) -> f64 {
        match self {
            Self::AverageImpact => scores.average(),
            Self::MaximumImpact => f64::from(scores.maximum()),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `impact × probability`. An integral impact on the grid axis takes the
/// grid cell value, so `(2, 2)` scores 3.99.
pub fn inherent_risk(impact: f64, probability: Probability) -> f64 {
    let impact = impact.max(0.0);
    if impact.fract() == 0.0 && (1.0..=f64::from(GRID_SIZE)).contains(&impact) {
        return cell_value(probability.value(), impact as u8);
    }
    impact * f64::from(probability.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::ImpactDimension;

    #[test]
    fn test_probability_bounds() {
        assert!(Probability::new(0).is_err());
        assert!(Probability::new(6).is_err());
        assert_eq!(Probability::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_probability_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Probability>("0").is_err());
        assert_eq!(serde_json::from_str::<Probability>("3").unwrap().value(), 3);
    }

    #[test]
    fn test_inherent_is_product() {
        let p = Probability::new(4).unwrap();
        assert_eq!(inherent_risk(5.0, p), 20.0);
        assert!((inherent_risk(22.0 / 7.0, p) - 12.571428).abs() < 1e-5);
    }

    #[test]
    fn test_inherent_two_by_two_override() {
        let p = Probability::new(2).unwrap();
        assert_eq!(inherent_risk(2.0, p), 3.99);
    }

    #[test]
    fn test_modes_pick_different_impacts() {
        let scores = ImpactScores::new()
            .with(ImpactDimension::Economic, 4)
            .with(ImpactDimension::Legal, 2);
        assert_eq!(EvaluationMode::AverageImpact.impact_of(&scores), 3.0);
        assert_eq!(EvaluationMode::MaximumImpact.impact_of(&scores), 4.0);
    }
}
