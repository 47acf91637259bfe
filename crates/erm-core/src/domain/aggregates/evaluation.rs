//! Evaluation aggregate
//!
//! At most one per risk. Every derived field comes out of the scoring
//! engine; there are no setters for them.

use chrono::{DateTime, Utc};
use erm_scoring::{
    EvaluationMode, GridCell, ImpactScores, InherentAssessment, Probability, ResidualAssessment,
    RiskBand, ScoringEngine, ScoringResult,
};
use serde::Serialize;

use crate::domain::value_objects::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    id: EntityId,
    risk_id: EntityId,
    impacts: ImpactScores,
    #[serde(flatten)]
    assessment: InherentAssessment,
    residual: Option<ResidualAssessment>,
    evaluated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn create(
        risk_id: EntityId,
        mode: EvaluationMode,
        probability: Probability,
        impacts: ImpactScores,
        evaluated_by: Option<String>,
        engine: &ScoringEngine<'_>,
    ) -> ScoringResult<Self> {
        let assessment = engine.assess_inherent(mode, probability, &impacts)?;
        let now = Utc::now();
        Ok(Self {
            id: EntityId::new(),
            risk_id,
            impacts,
            assessment,
            residual: None,
            evaluated_by,
            created_at: now,
            updated_at: now,
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn risk_id(&self) -> &EntityId { &self.risk_id }
    pub fn impacts(&self) -> &ImpactScores { &self.impacts }
    pub fn assessment(&self) -> &InherentAssessment { &self.assessment }
    pub fn mode(&self) -> EvaluationMode { self.assessment.mode }
    pub fn probability(&self) -> Probability { self.assessment.probability }
    pub fn inherent_risk(&self) -> f64 { self.assessment.inherent_risk }
    pub fn risk_level(&self) -> RiskBand { self.assessment.risk_level }
    pub fn inherent_cell(&self) -> GridCell { self.assessment.inherent_cell }
    pub fn residual(&self) -> Option<&ResidualAssessment> { self.residual.as_ref() }
    pub fn evaluated_by(&self) -> Option<&str> { self.evaluated_by.as_deref() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Replace the inputs and re-derive. Residual fields are left to the
    /// caller, which must recompute them from the risk's controls.
    pub fn reassess(
        &mut self,
        mode: EvaluationMode,
        probability: Probability,
        impacts: ImpactScores,
        evaluated_by: Option<String>,
        engine: &ScoringEngine<'_>,
    ) -> ScoringResult<()> {
        self.assessment = engine.assess_inherent(mode, probability, &impacts)?;
        self.impacts = impacts;
        if evaluated_by.is_some() {
            self.evaluated_by = evaluated_by;
        }
        self.touch();
        Ok(())
    }

    /// Re-derive from the current inputs, e.g. after a configuration change
    pub fn recompute(&mut self, engine: &ScoringEngine<'_>) -> ScoringResult<()> {
        self.assessment = engine.assess_inherent(self.assessment.mode, self.assessment.probability, &self.impacts)?;
        self.touch();
        Ok(())
    }

    pub fn apply_residual(&mut self, residual: Option<ResidualAssessment>) {
        self.residual = residual;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erm_scoring::{ImpactDimension, ScoringConfig, WeightedControlScorer};

    #[test]
    fn test_reassess_rederives_everything() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        let impacts = ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[1; 7]);
        let mut evaluation = Evaluation::create(
            EntityId::new(),
            EvaluationMode::AverageImpact,
            Probability::new(1).unwrap(),
            impacts,
            Some("auditor".into()),
            &engine,
        )
        .unwrap();
        assert_eq!(evaluation.inherent_risk(), 1.0);
        assert_eq!(evaluation.risk_level(), RiskBand::Low);

        let impacts = ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5; 7]);
        evaluation
            .reassess(EvaluationMode::AverageImpact, Probability::new(5).unwrap(), impacts, None, &engine)
            .unwrap();
        assert_eq!(evaluation.inherent_risk(), 25.0);
        assert_eq!(evaluation.risk_level(), RiskBand::Critical);
        assert_eq!(evaluation.evaluated_by(), Some("auditor"));
    }

    #[test]
    fn test_failed_reassess_keeps_previous_state() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);

        let impacts = ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[2; 7]);
        let mut evaluation = Evaluation::create(
            EntityId::new(),
            EvaluationMode::AverageImpact,
            Probability::new(2).unwrap(),
            impacts.clone(),
            None,
            &engine,
        )
        .unwrap();
        assert_eq!(evaluation.inherent_risk(), 3.99);

        let short = ImpactScores::new().with(ImpactDimension::Legal, 5);
        assert!(evaluation
            .reassess(EvaluationMode::AverageImpact, Probability::new(5).unwrap(), short, None, &engine)
            .is_err());
        assert_eq!(evaluation.impacts(), &impacts);
        assert_eq!(evaluation.inherent_cell(), GridCell::new(2, 2));
    }
}
