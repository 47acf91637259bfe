//! Cause use cases

use chrono::Utc;
use erm_scoring::ScoringEngine;
use std::sync::Arc;

use super::controls::insert_control;
use super::scoring::{rescore_risk, ScoringSettings};
use crate::application::dto::{CauseView, NewCause, UpdateCause};
use crate::domain::aggregates::{Cause, ControlTarget};
use crate::domain::value_objects::{required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{RiskStore, Tables};

pub(crate) fn cause_view(tables: &Tables, cause: &Cause) -> CauseView {
    CauseView {
        cause: cause.clone(),
        controls: tables
            .controls
            .values()
            .filter(|c| c.cause_id() == Some(&cause.id))
            .cloned()
            .collect(),
    }
}

/// Store a cause and its nested controls inside the caller's transaction
pub(crate) fn insert_cause(
    tables: &mut Tables,
    risk_id: &EntityId,
    command: NewCause,
    engine: &ScoringEngine<'_>,
) -> ServiceResult<CauseView> {
    tables.risk(risk_id)?;
    let now = Utc::now();
    let cause = Cause {
        id: EntityId::new(),
        risk_id: risk_id.clone(),
        description: required_text("description", &command.description)?,
        source: command.source,
        frequency: command.frequency,
        selected: command.selected,
        treatment: command.treatment,
        created_at: now,
        updated_at: now,
    };
    let cause_id = cause.id.clone();
    tables.causes.insert(cause_id.clone(), cause);

    for control in command.controls {
        insert_control(tables, ControlTarget::Cause(cause_id.clone()), control, engine)?;
    }

    let cause = tables.cause(&cause_id)?;
    Ok(cause_view(tables, cause))
}

/// Cause application service
pub struct CauseService {
    store: Arc<RiskStore>,
    settings: Arc<ScoringSettings>,
}

impl CauseService {
    pub fn new(store: Arc<RiskStore>, settings: Arc<ScoringSettings>) -> Self {
        Self { store, settings }
    }

    pub fn create(&self, risk_id: &EntityId, command: NewCause) -> ServiceResult<CauseView> {
        let view = self
            .store
            .transact_scored(&self.settings, |tables, engine| insert_cause(tables, risk_id, command, engine))?;
        tracing::info!(cause_id = %view.cause.id, risk_id = %risk_id, controls = view.controls.len(), "Cause created");
        Ok(view)
    }

    pub fn get(&self, id: &EntityId) -> ServiceResult<CauseView> {
        self.store.read(|tables| Ok(cause_view(tables, tables.cause(id)?)))
    }

    pub fn list_by_risk(&self, risk_id: &EntityId) -> ServiceResult<Vec<CauseView>> {
        self.store.read(|tables| {
            tables.risk(risk_id)?;
            Ok(tables
                .causes
                .values()
                .filter(|c| &c.risk_id == risk_id)
                .map(|c| cause_view(tables, c))
                .collect())
        })
    }

    pub fn update(&self, id: &EntityId, command: UpdateCause) -> ServiceResult<CauseView> {
        self.store.transact(|tables| {
            let cause = tables.causes.get_mut(id).ok_or_else(|| ServiceError::not_found("cause", id))?;
            if let Some(description) = command.description {
                cause.description = required_text("description", &description)?;
            }
            if let Some(source) = command.source {
                cause.source = source;
            }
            if let Some(frequency) = command.frequency {
                cause.frequency = frequency;
            }
            if let Some(selected) = command.selected {
                cause.selected = selected;
            }
            if let Some(treatment) = command.treatment {
                cause.treatment = treatment;
            }
            cause.updated_at = Utc::now();

            let cause = tables.cause(id)?;
            Ok(cause_view(tables, cause))
        })
    }

    /// Removes the cause's controls too and rescores the risk
    pub fn delete(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact_scored(&self.settings, |tables, engine| {
            let cause = tables.causes.remove(id).ok_or_else(|| ServiceError::not_found("cause", id))?;
            tables.controls.retain(|_, c| c.cause_id() != Some(id));
            rescore_risk(tables, &cause.risk_id, engine)
        })?;
        tracing::info!(cause_id = %id, "Cause deleted");
        Ok(())
    }
}
