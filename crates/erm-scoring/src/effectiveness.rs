//! Control effectiveness
//!
//! Two assessment modes are supported side by side:
//!
//! - **Three-factor**: design, execution and robustness, each 0..=5;
//!   `effectiveness = sum / 15`.
//! - **Six-factor**: six weighted sub-scores form a 0..=100 control score,
//!   scaled by the control's mitigation percentage. Weighting is pluggable
//!   through [`ControlScorer`].

use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Highest score a single control factor can take
pub const MAX_FACTOR: f64 = 5.0;

fn check_factor(factor: &'static str, value: f64) -> ScoringResult<()> {
    if value.is_finite() && (0.0..=MAX_FACTOR).contains(&value) {
        Ok(())
    } else {
        Err(ScoringError::FactorOutOfRange { factor, value })
    }
}

/// Aggregate result of scoring one control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlScore {
    /// 0..=100
    pub score: f64,
    /// 0..=1
    pub effectiveness: f64,
}

// ============ Three-factor ============

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThreeFactorScores {
    pub design: f64,
    pub execution: f64,
    #[serde(alias = "solidity")]
    pub robustness: f64,
}

impl ThreeFactorScores {
    pub fn new(design: f64, execution: f64, robustness: f64) -> ScoringResult<Self> {
        let scores = Self { design, execution, robustness };
        scores.validate()?;
        Ok(scores)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        check_factor("design", self.design)?;
        check_factor("execution", self.execution)?;
        check_factor("robustness", self.robustness)
    }

    pub fn effectiveness(&self) -> f64 {
        ((self.design + self.execution + self.robustness) / (3.0 * MAX_FACTOR)).clamp(0.0, 1.0)
    }
}

// ============ Six-factor ============

/// What the control acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationAxis {
    Frequency,
    Impact,
    Both,
}

/// Six rated attributes, each 0..=5 where 5 is best
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SixFactorScores {
    pub applicability: f64,
    pub coverage: f64,
    pub ease_of_use: f64,
    pub segregation: f64,
    pub nature: f64,
    /// 5 means no deviations observed
    pub deviations: f64,
    /// Share of the risk the control is designed to mitigate, 0..=100
    pub mitigation_percent: f64,
    pub mitigates: MitigationAxis,
}

impl SixFactorScores {
    pub fn validate(&self) -> ScoringResult<()> {
        check_factor("applicability", self.applicability)?;
        check_factor("coverage", self.coverage)?;
        check_factor("ease_of_use", self.ease_of_use)?;
        check_factor("segregation", self.segregation)?;
        check_factor("nature", self.nature)?;
        check_factor("deviations", self.deviations)?;
        if !self.mitigation_percent.is_finite() || !(0.0..=100.0).contains(&self.mitigation_percent) {
            return Err(ScoringError::MitigationOutOfRange(self.mitigation_percent));
        }
        Ok(())
    }

    fn factors(&self) -> [f64; 6] {
        [
            self.applicability,
            self.coverage,
            self.ease_of_use,
            self.segregation,
            self.nature,
            self.deviations,
        ]
    }
}

/// Pluggable six-factor scoring. Implementations receive validated input and
/// must return a score in 0..=100 and an effectiveness in 0..=1.
pub trait ControlScorer: Send + Sync {
    fn score(&self, factors: &SixFactorScores) -> ControlScore;
}

/// Relative weight of each six-factor attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorWeights {
    pub applicability: f64,
    pub coverage: f64,
    pub ease_of_use: f64,
    pub segregation: f64,
    pub nature: f64,
    pub deviations: f64,
}

impl FactorWeights {
    fn as_array(&self) -> [f64; 6] {
        [
            self.applicability,
            self.coverage,
            self.ease_of_use,
            self.segregation,
            self.nature,
            self.deviations,
        ]
    }

    pub fn validate(&self) -> ScoringResult<()> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ScoringError::InvalidWeights(
                "weights must be finite and non-negative".into(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ScoringError::InvalidWeights("at least one weight must be positive".into()));
        }
        Ok(())
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            applicability: 15.0,
            coverage: 15.0,
            ease_of_use: 10.0,
            segregation: 15.0,
            nature: 25.0,
            deviations: 20.0,
        }
    }
}

/// Weighted mean of the six factors, scaled by the mitigation percentage.
/// The mitigation axis is carried for reporting and does not change the
/// number.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedControlScorer {
    weights: FactorWeights,
}

impl WeightedControlScorer {
    pub fn new(weights: FactorWeights) -> ScoringResult<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }
}

impl ControlScorer for WeightedControlScorer {
    fn score(&self, factors: &SixFactorScores) -> ControlScore {
        let weights = self.weights.as_array();
        let total: f64 = weights.iter().sum();
        let weighted: f64 = weights.iter().zip(factors.factors()).map(|(w, s)| w * s).sum();
        let score = if total > 0.0 {
            (weighted / (MAX_FACTOR * total) * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let effectiveness = (score / 100.0 * factors.mitigation_percent / 100.0).clamp(0.0, 1.0);
        ControlScore { score, effectiveness }
    }
}

// ============ Assessment ============

/// Control assessment, tagged by mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "factors", rename_all = "snake_case")]
pub enum ControlAssessment {
    ThreeFactor(ThreeFactorScores),
    SixFactor(SixFactorScores),
}

impl ControlAssessment {
    pub fn validate(&self) -> ScoringResult<()> {
        match self {
            Self::ThreeFactor(f) => f.validate(),
            Self::SixFactor(f) => f.validate(),
        }
    }

    /// Validate, then score
    pub fn score(&self, scorer: &dyn ControlScorer) -> ScoringResult<ControlScore> {
        self.validate()?;
        Ok(match self {
            Self::ThreeFactor(f) => {
                let effectiveness = f.effectiveness();
                ControlScore { score: effectiveness * 100.0, effectiveness }
            }
            Self::SixFactor(f) => {
                let raw = scorer.score(f);
                ControlScore {
                    score: raw.score.clamp(0.0, 100.0),
                    effectiveness: raw.effectiveness.clamp(0.0, 1.0),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six(value: f64, mitigation: f64) -> SixFactorScores {
        SixFactorScores {
            applicability: value,
            coverage: value,
            ease_of_use: value,
            segregation: value,
            nature: value,
            deviations: value,
            mitigation_percent: mitigation,
            mitigates: MitigationAxis::Both,
        }
    }

    #[test]
    fn test_three_factor_extremes() {
        assert_eq!(ThreeFactorScores::new(5.0, 5.0, 5.0).unwrap().effectiveness(), 1.0);
        assert_eq!(ThreeFactorScores::new(0.0, 0.0, 0.0).unwrap().effectiveness(), 0.0);
        let e = ThreeFactorScores::new(3.0, 4.0, 3.0).unwrap().effectiveness();
        assert!((e - 0.6667).abs() < 1e-4);
    }

    #[test]
    fn test_three_factor_rejects_out_of_range() {
        assert!(matches!(
            ThreeFactorScores::new(6.0, 1.0, 1.0),
            Err(ScoringError::FactorOutOfRange { factor: "design", .. })
        ));
        assert!(ThreeFactorScores::new(1.0, -0.5, 1.0).is_err());
        assert!(ThreeFactorScores::new(1.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_solidity_alias() {
        let f: ThreeFactorScores =
            serde_json::from_str(r#"{"design":3,"execution":4,"solidity":3}"#).unwrap();
        assert_eq!(f.robustness, 3.0);
        assert!(serde_json::from_str::<ThreeFactorScores>(
            r#"{"design":3,"execution":4,"robustness":3,"extra":1}"#
        )
        .is_err());
    }

    #[test]
    fn test_weighted_scorer() {
        let scorer = WeightedControlScorer::default();
        let full = scorer.score(&six(5.0, 100.0));
        assert!((full.score - 100.0).abs() < 1e-9);
        assert!((full.effectiveness - 1.0).abs() < 1e-9);

        let half = scorer.score(&six(5.0, 50.0));
        assert!((half.effectiveness - 0.5).abs() < 1e-9);

        let none = scorer.score(&six(0.0, 100.0));
        assert_eq!(none.effectiveness, 0.0);
    }

    #[test]
    fn test_custom_weights_shift_score() {
        let scorer = WeightedControlScorer::new(FactorWeights {
            applicability: 0.0,
            coverage: 0.0,
            ease_of_use: 0.0,
            segregation: 0.0,
            nature: 1.0,
            deviations: 0.0,
        })
        .unwrap();
        let mut factors = six(0.0, 100.0);
        factors.nature = 4.0;
        assert!((scorer.score(&factors).score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_validation() {
        let zero = FactorWeights {
            applicability: 0.0,
            coverage: 0.0,
            ease_of_use: 0.0,
            segregation: 0.0,
            nature: 0.0,
            deviations: 0.0,
        };
        assert!(WeightedControlScorer::new(zero).is_err());
    }

    #[test]
    fn test_assessment_validates_before_scoring() {
        let scorer = WeightedControlScorer::default();
        let bad = ControlAssessment::SixFactor(six(2.0, 120.0));
        assert_eq!(bad.score(&scorer), Err(ScoringError::MitigationOutOfRange(120.0)));

        let ok = ControlAssessment::ThreeFactor(ThreeFactorScores::new(5.0, 5.0, 0.0).unwrap());
        let score = ok.score(&scorer).unwrap();
        assert!((score.score - 66.666).abs() < 1e-2);
    }

    #[test]
    fn test_assessment_wire_format() {
        let json = r#"{"mode":"three_factor","factors":{"design":1,"execution":2,"robustness":3}}"#;
        let a: ControlAssessment = serde_json::from_str(json).unwrap();
        assert!(matches!(a, ControlAssessment::ThreeFactor(f) if f.execution == 2.0));
    }
}
