//! Control use cases

use erm_scoring::ScoringEngine;
use std::sync::Arc;

use super::scoring::{rescore_risk, ScoringSettings};
use crate::application::dto::{ControlEffectiveness, EffectivenessSummary, NewControl, UpdateControl};
use crate::domain::aggregates::{Control, ControlDetails, ControlTarget};
use crate::domain::value_objects::{required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{RiskStore, Tables};

/// Risk a control target belongs to
fn resolve_target(tables: &Tables, target: &ControlTarget) -> ServiceResult<EntityId> {
    match target {
        ControlTarget::Cause(cause_id) => Ok(tables.cause(cause_id)?.risk_id.clone()),
        ControlTarget::Risk(risk_id) => Ok(tables.risk(risk_id)?.id().clone()),
    }
}

/// Score and store a control inside the caller's transaction. The risk
/// must already be evaluated.
pub(crate) fn insert_control(
    tables: &mut Tables,
    target: ControlTarget,
    command: NewControl,
    engine: &ScoringEngine<'_>,
) -> ServiceResult<Control> {
    let risk_id = resolve_target(tables, &target)?;
    let details = ControlDetails {
        description: required_text("description", &command.description)?,
        kind: command.kind,
        responsible: command.responsible,
        frequency: command.frequency,
    };
    let inherent = tables
        .evaluations
        .get(&risk_id)
        .map(|e| e.assessment().clone())
        .ok_or_else(|| {
            ServiceError::PreconditionNotMet(format!(
                "risk {risk_id} has no evaluation; rate the risk before scoring its controls"
            ))
        })?;

    let control = Control::create(target, risk_id.clone(), details, command.assessment, &inherent, engine)?;
    let id = control.id().clone();
    tables.controls.insert(id.clone(), control);
    rescore_risk(tables, &risk_id, engine)?;
    tables.controls.get(&id).cloned().ok_or_else(|| ServiceError::not_found("control", &id))
}

/// Control application service
pub struct ControlService {
    store: Arc<RiskStore>,
    settings: Arc<ScoringSettings>,
}

impl ControlService {
    pub fn new(store: Arc<RiskStore>, settings: Arc<ScoringSettings>) -> Self {
        Self { store, settings }
    }

    /// Evaluated → Residual-Scored
    pub fn create(&self, target: ControlTarget, command: NewControl) -> ServiceResult<Control> {
        let control = self
            .store
            .transact_scored(&self.settings, |tables, engine| insert_control(tables, target, command, engine))?;

        tracing::info!(
            control_id = %control.id(),
            risk_id = %control.risk_id(),
            effectiveness = control.effectiveness().unwrap_or_default(),
            "Control scored"
        );
        Ok(control)
    }

    pub fn get(&self, id: &EntityId) -> ServiceResult<Control> {
        self.store.read(|tables| {
            tables.controls.get(id).cloned().ok_or_else(|| ServiceError::not_found("control", id))
        })
    }

    pub fn update(&self, id: &EntityId, command: UpdateControl) -> ServiceResult<Control> {
        self.store.transact_scored(&self.settings, |tables, engine| {
            let control = tables.controls.get_mut(id).ok_or_else(|| ServiceError::not_found("control", id))?;

            let current = control.details().clone();
            let description = match command.description {
                Some(d) => required_text("description", &d)?,
                None => current.description,
            };
            control.update_details(ControlDetails {
                description,
                kind: command.kind.unwrap_or(current.kind),
                responsible: command.responsible.unwrap_or(current.responsible),
                frequency: command.frequency.unwrap_or(current.frequency),
            });
            if let Some(assessment) = command.assessment {
                control.update_assessment(assessment)?;
            }

            let risk_id = control.risk_id().clone();
            rescore_risk(tables, &risk_id, engine)?;
            tables.controls.get(id).cloned().ok_or_else(|| ServiceError::not_found("control", id))
        })
    }

    /// Removing the last control returns the risk to Evaluated
    pub fn delete(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact_scored(&self.settings, |tables, engine| {
            let control = tables.controls.remove(id).ok_or_else(|| ServiceError::not_found("control", id))?;
            rescore_risk(tables, control.risk_id(), engine)
        })?;
        tracing::info!(control_id = %id, "Control deleted");
        Ok(())
    }

    /// Every control of a risk, attached directly or through a cause
    pub fn list_by_risk(&self, risk_id: &EntityId) -> ServiceResult<Vec<Control>> {
        self.store.read(|tables| {
            tables.risk(risk_id)?;
            Ok(tables.controls_of(risk_id))
        })
    }

    pub fn list_by_cause(&self, cause_id: &EntityId) -> ServiceResult<Vec<Control>> {
        self.store.read(|tables| {
            tables.cause(cause_id)?;
            Ok(tables
                .controls
                .values()
                .filter(|c| c.cause_id() == Some(cause_id))
                .cloned()
                .collect())
        })
    }

    pub fn effectiveness_summary(&self, risk_id: &EntityId) -> ServiceResult<EffectivenessSummary> {
        let controls = self.list_by_risk(risk_id)?;
        let scored: Vec<f64> = controls.iter().filter_map(|c| c.effectiveness()).collect();
        let average_effectiveness = if scored.is_empty() {
            0.0
        } else {
            scored.iter().sum::<f64>() / scored.len() as f64
        };
        Ok(EffectivenessSummary {
            control_count: controls.len(),
            average_effectiveness,
            controls: controls
                .iter()
                .map(|c| ControlEffectiveness {
                    control_id: c.id().clone(),
                    effectiveness: c.effectiveness(),
                    residual_risk: c.residual_risk(),
                })
                .collect(),
        })
    }
}
