//! Impact dimensions and averaging

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ScoringError, ScoringResult};

/// Highest score a single impact dimension can take
pub const MAX_IMPACT: u8 = 5;

/// Named impact dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactDimension {
    Economic,
    Processes,
    Legal,
    Reputational,
    Personnel,
    Environmental,
    Technological,
    Confidentiality,
    Integrity,
    Availability,
}

impl ImpactDimension {
    /// Every known dimension
    pub const ALL: [ImpactDimension; 10] = [
        Self::Economic,
        Self::Processes,
        Self::Legal,
        Self::Reputational,
        Self::Personnel,
        Self::Environmental,
        Self::Technological,
        Self::Confidentiality,
        Self::Integrity,
        Self::Availability,
    ];

    /// Canonical set rated by the average-impact evaluation
    pub const OPERATIONAL: [ImpactDimension; 7] = [
        Self::Personnel,
        Self::Legal,
        Self::Environmental,
        Self::Processes,
        Self::Reputational,
        Self::Economic,
        Self::Technological,
    ];

    /// Canonical set rated by the maximum-impact evaluation, which adds the
    /// information-security dimensions
    pub const INFORMATION_SECURITY: [ImpactDimension; 8] = [
        Self::Economic,
        Self::Processes,
        Self::Legal,
        Self::Confidentiality,
        Self::Reputational,
        Self::Availability,
        Self::Personnel,
        Self::Integrity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economic => "economic",
            Self::Processes => "processes",
            Self::Legal => "legal",
            Self::Reputational => "reputational",
            Self::Personnel => "personnel",
            Self::Environmental => "environmental",
            Self::Technological => "technological",
            Self::Confidentiality => "confidentiality",
            Self::Integrity => "integrity",
            Self::Availability => "availability",
        }
    }
}

impl fmt::Display for ImpactDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic mean of the supplied scores. Empty input means "not yet
/// evaluated" and yields 0.
pub fn impact_average(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
    sum / values.len() as f64
}

/// Largest supplied score, 0 for empty input
pub fn impact_maximum(values: &[u8]) -> u8 {
    values.iter().copied().max().unwrap_or(0)
}

/// One rated dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImpactScore {
    pub dimension: ImpactDimension,
    pub value: u8,
}

/// Ordered list of rated dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactScores(Vec<ImpactScore>);

impl ImpactScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push
    pub fn with(mut self, dimension: ImpactDimension, value: u8) -> Self {
        self.push(dimension, value);
        self
    }

    pub fn push(&mut self, dimension: ImpactDimension, value: u8) {
        self.0.push(ImpactScore { dimension, value });
    }

    /// Pair each dimension with the value at the same position
    pub fn from_pairs(dimensions: &[ImpactDimension], values: &[u8]) -> Self {
        Self(
            dimensions
                .iter()
                .zip(values)
                .map(|(&dimension, &value)| ImpactScore { dimension, value })
                .collect(),
        )
    }

    pub fn get(&self, dimension: ImpactDimension) -> Option<u8> {
        self.0.iter().find(|s| s.dimension == dimension).map(|s| s.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImpactScore> {
        self.0.iter()
    }

    pub fn values(&self) -> Vec<u8> {
        self.0.iter().map(|s| s.value).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn average(&self) -> f64 {
        impact_average(&self.values())
    }

    pub fn maximum(&self) -> u8 {
        impact_maximum(&self.values())
    }

    /// Require exactly the dimensions in `required`, each once, each in
    /// 0..=5. A short list would otherwise shrink the mean's denominator.
    pub fn validate(&self, required: &[ImpactDimension]) -> ScoringResult<()> {
        let mut seen = BTreeSet::new();
        for score in &self.0 {
            if score.value > MAX_IMPACT {
                return Err(ScoringError::ImpactOutOfRange {
                    dimension: score.dimension,
                    value: score.value,
                });
            }
            if !required.contains(&score.dimension) {
                return Err(ScoringError::UnexpectedDimension(score.dimension));
            }
            if !seen.insert(score.dimension) {
                return Err(ScoringError::DuplicateDimension(score.dimension));
            }
        }
        match required.iter().find(|d| !seen.contains(*d)) {
            Some(missing) => Err(ScoringError::MissingDimension(*missing)),
            None => Ok(()),
        }
    }
}

impl FromIterator<(ImpactDimension, u8)> for ImpactScores {
    fn from_iter<I: IntoIterator<Item = (ImpactDimension, u8)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(dimension, value)| ImpactScore { dimension, value })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operational(values: [u8; 7]) -> ImpactScores {
        ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &values)
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(impact_average(&[]), 0.0);
        assert_eq!(impact_maximum(&[]), 0);
    }

    #[test]
    fn test_average_weights_dimensions_equally() {
        let avg = impact_average(&[5, 2, 1, 5, 3, 4, 2]);
        assert!((avg - 22.0 / 7.0).abs() < 1e-12);
        assert_eq!(impact_maximum(&[5, 2, 1, 5, 3, 4, 2]), 5);
    }

    #[test]
    fn test_validate_accepts_full_set() {
        let scores = operational([5, 2, 1, 5, 3, 4, 2]);
        assert!(scores.validate(&ImpactDimension::OPERATIONAL).is_ok());
        assert_eq!(scores.get(ImpactDimension::Economic), Some(4));
    }

    #[test]
    fn test_validate_rejects_missing_dimension() {
        let scores = ImpactScores::new()
            .with(ImpactDimension::Economic, 3)
            .with(ImpactDimension::Legal, 2);
        let err = scores.validate(&ImpactDimension::OPERATIONAL).unwrap_err();
        assert!(matches!(err, ScoringError::MissingDimension(ImpactDimension::Personnel)));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_strangers() {
        let mut scores = operational([1, 1, 1, 1, 1, 1, 1]);
        scores.push(ImpactDimension::Legal, 3);
        assert_eq!(
            scores.validate(&ImpactDimension::OPERATIONAL),
            Err(ScoringError::DuplicateDimension(ImpactDimension::Legal))
        );

        let mut scores = operational([1, 1, 1, 1, 1, 1, 1]);
        scores.push(ImpactDimension::Integrity, 3);
        assert_eq!(
            scores.validate(&ImpactDimension::OPERATIONAL),
            Err(ScoringError::UnexpectedDimension(ImpactDimension::Integrity))
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let scores = operational([1, 1, 6, 1, 1, 1, 1]);
        assert!(matches!(
            scores.validate(&ImpactDimension::OPERATIONAL),
            Err(ScoringError::ImpactOutOfRange { value: 6, .. })
        ));
    }

    #[test]
    fn test_scores_serialize_as_list() {
        let scores = ImpactScores::new().with(ImpactDimension::Economic, 4);
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"[{"dimension":"economic","value":4}]"#);
    }
}
