//! ERM Risk Scoring Engine
//!
//! Pure scoring functions for enterprise risk evaluation. Nothing in this
//! crate touches storage: every threshold table and weight comes from an
//! injected [`ScoringConfig`].
//!
//! # Pipeline
//!
//! ```text
//! ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//! │ Impact scores  │──▶│ Inherent risk  │──▶│  Band (LOW..   │
//! │ (0-5 per dim)  │   │ impact × prob  │   │   CRITICAL)    │
//! └────────────────┘   └───────┬────────┘   └────────────────┘
//!                              │
//!  ┌────────────────┐   ┌──────▼─────────┐   ┌────────────────┐
//!  │ Control scores │──▶│ Residual risk  │──▶│ 5×5 grid cell  │
//!  │ (3 or 6 factor)│   │ inh × (1 - eff)│   │ (heat map)     │
//!  └────────────────┘   └────────────────┘   └────────────────┘
//! ```

pub mod bands;
pub mod config;
pub mod effectiveness;
pub mod engine;
pub mod error;
pub mod grid;
pub mod impact;
pub mod inherent;
pub mod residual;

pub use bands::{classify, BandLabels, BandTable, BandTables, RiskBand, RiskScale};
pub use config::{ModeConfig, ScoringConfig};
pub use effectiveness::{
    ControlAssessment, ControlScore, ControlScorer, FactorWeights, MitigationAxis,
    SixFactorScores, ThreeFactorScores, WeightedControlScorer,
};
pub use engine::{ControlOutcome, InherentAssessment, ResidualAssessment, ScoringEngine};
pub use error::{ScoringError, ScoringResult};
pub use grid::{cell_value, map_to_grid, map_to_grid_with_tolerance, GridCell};
pub use impact::{impact_average, impact_maximum, ImpactDimension, ImpactScore, ImpactScores};
pub use inherent::{inherent_risk, EvaluationMode, Probability};
pub use residual::{combine_residual, residual_risk};
