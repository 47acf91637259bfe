//! Evaluation use cases

use erm_scoring::{Probability, ScoringEngine};
use std::sync::Arc;

use super::scoring::{rescore_all, rescore_risk, ScoringSettings};
use crate::application::dto::EvaluateRisk;
use crate::domain::aggregates::{Evaluation, RiskState};
use crate::domain::value_objects::EntityId;
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{RiskStore, Tables};

/// Create or replace a risk's evaluation and re-derive its residual, inside
/// the caller's transaction
pub(crate) fn upsert_evaluation(
    tables: &mut Tables,
    risk_id: &EntityId,
    command: EvaluateRisk,
    engine: &ScoringEngine<'_>,
) -> ServiceResult<Evaluation> {
    tables.risk(risk_id)?;
    let probability = Probability::new(command.probability)?;

    match tables.evaluations.get_mut(risk_id) {
        Some(existing) => {
            existing.reassess(command.mode, probability, command.impacts, command.evaluated_by, engine)?;
        }
        None => {
            let evaluation = Evaluation::create(
                risk_id.clone(),
                command.mode,
                probability,
                command.impacts,
                command.evaluated_by,
                engine,
            )?;
            tables.evaluations.insert(risk_id.clone(), evaluation);
        }
    }

    rescore_risk(tables, risk_id, engine)?;
    tables
        .evaluations
        .get(risk_id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found("evaluation", risk_id))
}

/// Evaluation application service
pub struct EvaluationService {
    store: Arc<RiskStore>,
    settings: Arc<ScoringSettings>,
}

impl EvaluationService {
    pub fn new(store: Arc<RiskStore>, settings: Arc<ScoringSettings>) -> Self {
        Self { store, settings }
    }

    /// Unevaluated → Evaluated, or an idempotent update while Evaluated.
    /// Existing controls are rescored in the same transaction.
    pub fn evaluate(&self, risk_id: &EntityId, command: EvaluateRisk) -> ServiceResult<Evaluation> {
        let evaluation = self
            .store
            .transact_scored(&self.settings, |tables, engine| upsert_evaluation(tables, risk_id, command, engine))?;

        tracing::info!(
            risk_id = %risk_id,
            mode = %evaluation.mode(),
            inherent = evaluation.inherent_risk(),
            level = %evaluation.risk_level(),
            "Evaluation stored"
        );
        Ok(evaluation)
    }

    pub fn get_by_risk(&self, risk_id: &EntityId) -> ServiceResult<Evaluation> {
        self.store.read(|tables| {
            tables.risk(risk_id)?;
            tables
                .evaluations
                .get(risk_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("evaluation", risk_id))
        })
    }

    pub fn get(&self, evaluation_id: &EntityId) -> ServiceResult<Evaluation> {
        self.store.read(|tables| {
            tables
                .evaluations
                .values()
                .find(|e| e.id() == evaluation_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("evaluation", evaluation_id))
        })
    }

    pub fn list(&self) -> Vec<Evaluation> {
        self.store.read(|tables| tables.evaluations.values().cloned().collect())
    }

    pub fn state(&self, risk_id: &EntityId) -> ServiceResult<RiskState> {
        self.store.read(|tables| {
            tables.risk(risk_id)?;
            Ok(tables.risk_state(risk_id))
        })
    }

    /// Back to Unevaluated. Controls stay but lose their derived fields.
    pub fn delete(&self, risk_id: &EntityId) -> ServiceResult<()> {
        self.store.transact_scored(&self.settings, |tables, engine| {
            tables.risk(risk_id)?;
            tables
                .evaluations
                .remove(risk_id)
                .ok_or_else(|| ServiceError::not_found("evaluation", risk_id))?;
            rescore_risk(tables, risk_id, engine)
        })?;
        tracing::info!(risk_id = %risk_id, "Evaluation deleted");
        Ok(())
    }

    /// Re-derive every evaluation under the current configuration
    pub fn recalculate_all(&self) -> ServiceResult<usize> {
        let count = self
            .store
            .transact_scored(&self.settings, |tables, engine| rescore_all(tables, engine))?;
        tracing::info!(count, "Evaluations recalculated");
        Ok(count)
    }
}
