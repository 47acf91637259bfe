//! Scoring errors

use thiserror::Error;

use crate::impact::ImpactDimension;

/// Rejections raised at the engine boundary. Inputs are never coerced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// Probability outside 1..=5
    #[error("probability must be an integer between 1 and 5, got {0}")]
    ProbabilityOutOfRange(u8),

    /// Impact score outside 0..=5
    #[error("impact for {dimension} must be between 0 and 5, got {value}")]
    ImpactOutOfRange { dimension: ImpactDimension, value: u8 },

    /// Required dimension not supplied
    #[error("missing required impact dimension: {0}")]
    MissingDimension(ImpactDimension),

    /// Same dimension supplied twice
    #[error("impact dimension supplied more than once: {0}")]
    DuplicateDimension(ImpactDimension),

    /// Dimension not part of the evaluation mode's set
    #[error("impact dimension not accepted by this evaluation mode: {0}")]
    UnexpectedDimension(ImpactDimension),

    /// Control sub-score outside 0..=5 or not finite
    #[error("control factor {factor} must be between 0 and 5, got {value}")]
    FactorOutOfRange { factor: &'static str, value: f64 },

    /// Mitigation percentage outside 0..=100
    #[error("mitigation percentage must be between 0 and 100, got {0}")]
    MitigationOutOfRange(f64),

    /// Malformed band table
    #[error("invalid band table: {0}")]
    InvalidBandTable(String),

    /// Malformed six-factor weights
    #[error("invalid control weights: {0}")]
    InvalidWeights(String),

    /// Any other configuration problem
    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for scoring operations
pub type ScoringResult<T> = Result<T, ScoringError>;
