//! Control aggregate

use chrono::{DateTime, Utc};
use erm_scoring::{ControlAssessment, ControlOutcome, InherentAssessment, ScoringEngine, ScoringResult};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

/// What the control is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ControlTarget {
    Cause(EntityId),
    Risk(EntityId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    #[default]
    Preventive,
    Detective,
    Corrective,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlDetails {
    pub description: String,
    pub kind: ControlKind,
    pub responsible: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    id: EntityId,
    target: ControlTarget,
    /// Risk the target resolves to
    risk_id: EntityId,
    #[serde(flatten)]
    details: ControlDetails,
    assessment: ControlAssessment,
    /// Absent while the risk has no evaluation
    outcome: Option<ControlOutcome>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Control {
    /// Score against the risk's current evaluation
    pub fn create(
        target: ControlTarget,
        risk_id: EntityId,
        details: ControlDetails,
        assessment: ControlAssessment,
        inherent: &InherentAssessment,
        engine: &ScoringEngine<'_>,
    ) -> ScoringResult<Self> {
        let outcome = engine.assess_control(inherent, &assessment)?;
        let now = Utc::now();
        Ok(Self {
            id: EntityId::new(),
            target,
            risk_id,
            details,
            assessment,
            outcome: Some(outcome),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn target(&self) -> &ControlTarget { &self.target }
    pub fn risk_id(&self) -> &EntityId { &self.risk_id }
    pub fn details(&self) -> &ControlDetails { &self.details }
    pub fn assessment(&self) -> &ControlAssessment { &self.assessment }
    pub fn outcome(&self) -> Option<&ControlOutcome> { self.outcome.as_ref() }
    pub fn effectiveness(&self) -> Option<f64> { self.outcome.as_ref().map(|o| o.effectiveness) }
    pub fn residual_risk(&self) -> Option<f64> { self.outcome.as_ref().map(|o| o.residual_risk) }

    pub fn cause_id(&self) -> Option<&EntityId> {
        match &self.target {
            ControlTarget::Cause(id) => Some(id),
            ControlTarget::Risk(_) => None,
        }
    }

    pub fn update_details(&mut self, details: ControlDetails) {
        self.details = details;
        self.touch();
    }

    /// Swap the factor scores; the caller rescoring the risk follows
    pub fn update_assessment(&mut self, assessment: ControlAssessment) -> ScoringResult<()> {
        assessment.validate()?;
        self.assessment = assessment;
        self.touch();
        Ok(())
    }

    /// Re-derive against the evaluation, or clear when there is none
    pub fn rescore(&mut self, inherent: Option<&InherentAssessment>, engine: &ScoringEngine<'_>) -> ScoringResult<()> {
        self.outcome = match inherent {
            Some(inherent) => Some(engine.assess_control(inherent, &self.assessment)?),
            None => None,
        };
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erm_scoring::{
        EvaluationMode, ImpactDimension, ImpactScores, Probability, RiskBand, ScoringConfig,
        ThreeFactorScores, WeightedControlScorer,
    };

    #[test]
    fn test_control_scored_on_creation_and_cleared_without_evaluation() {
        let config = ScoringConfig::default();
        let scorer = WeightedControlScorer::default();
        let engine = ScoringEngine::new(&config, &scorer);
        let impacts = ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5; 7]);
        let inherent = engine
            .assess_inherent(EvaluationMode::AverageImpact, Probability::new(4).unwrap(), &impacts)
            .unwrap();

        let risk_id = EntityId::new();
        let mut control = Control::create(
            ControlTarget::Risk(risk_id.clone()),
            risk_id,
            ControlDetails { description: "Dual approval".into(), ..Default::default() },
            ControlAssessment::ThreeFactor(ThreeFactorScores::new(3.0, 4.0, 3.0).unwrap()),
            &inherent,
            &engine,
        )
        .unwrap();
        assert_eq!(control.outcome().map(|o| o.residual_level), Some(RiskBand::Medium));
        assert!(control.cause_id().is_none());

        control.rescore(None, &engine).unwrap();
        assert!(control.outcome().is_none());
    }

    #[test]
    fn test_target_wire_format() {
        let target = ControlTarget::Cause(EntityId::from_string("c-1"));
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, r#"{"type":"cause","id":"c-1"}"#);
    }
}
