//! Risk register use cases

use std::sync::Arc;

use super::causes::{cause_view, insert_cause};
use super::controls::insert_control;
use super::evaluations::upsert_evaluation;
use super::scoring::ScoringSettings;
use crate::application::dto::{
    CreateRisk, MapPoint, Page, RiskFilter, RiskListItem, RiskStatistics, RiskView, UpdateRisk,
};
use crate::domain::aggregates::{ControlTarget, Risk, RiskClassification, RiskDetails, RiskState};
use crate::domain::value_objects::{required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{require, RiskStore, Tables};
use erm_scoring::RiskBand;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

fn list_item(tables: &Tables, risk: &Risk) -> RiskListItem {
    let evaluation = tables.evaluations.get(risk.id());
    let residual = evaluation.and_then(|e| e.residual());
    RiskListItem {
        risk: risk.clone(),
        state: tables.risk_state(risk.id()),
        inherent_risk: evaluation.map(|e| e.inherent_risk()),
        risk_level: evaluation.map(|e| e.risk_level()),
        residual_risk: residual.map(|r| r.residual_risk),
        residual_level: residual.map(|r| r.residual_level),
    }
}

fn risk_view(tables: &Tables, risk: &Risk) -> RiskView {
    let id = risk.id();
    RiskView {
        risk: risk.clone(),
        state: tables.risk_state(id),
        process: tables.processes.get(risk.process_id()).cloned(),
        evaluation: tables.evaluations.get(id).cloned(),
        causes: tables
            .causes
            .values()
            .filter(|c| &c.risk_id == id)
            .map(|c| cause_view(tables, c))
            .collect(),
        controls: tables
            .controls
            .values()
            .filter(|c| matches!(c.target(), ControlTarget::Risk(r) if r == id))
            .cloned()
            .collect(),
        priority: tables.priorities.get(id).cloned(),
        plans: tables
            .plans
            .values()
            .filter(|p| p.origin.risk_id() == Some(id))
            .cloned()
            .collect(),
    }
}

/// Every optional reference in `details` must point at an existing row
fn check_references(tables: &Tables, details: &RiskDetails) -> ServiceResult<()> {
    require(&tables.risk_types, "risk type", details.risk_type_id.as_ref())?;
    require(&tables.objectives, "objective", details.objective_id.as_ref())?;
    require(&tables.managements, "management", details.management_id.as_ref())?;
    if let Some(subtype_id) = &details.risk_subtype_id {
        let mut candidates = tables
            .risk_types
            .values()
            .filter(|t| details.risk_type_id.as_ref().map_or(true, |type_id| &t.id == type_id));
        if !candidates.any(|t| t.subtypes.iter().any(|s| &s.id == subtype_id)) {
            return Err(ServiceError::not_found("risk subtype", subtype_id));
        }
    }
    Ok(())
}

/// Risk application service
pub struct RiskService {
    store: Arc<RiskStore>,
    settings: Arc<ScoringSettings>,
}

impl RiskService {
    pub fn new(store: Arc<RiskStore>, settings: Arc<ScoringSettings>) -> Self {
        Self { store, settings }
    }

    pub fn list(&self, filter: &RiskFilter) -> Page<RiskListItem> {
        self.store.read(|tables| {
            let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let mut rows: Vec<RiskListItem> = tables
                .risks
                .values()
                .filter(|r| filter.process_id.as_ref().map_or(true, |p| r.process_id() == p))
                .filter(|r| filter.classification.map_or(true, |c| r.classification() == c))
                .filter(|r| {
                    filter
                        .zone
                        .as_deref()
                        .map_or(true, |z| r.details().zone.as_deref() == Some(z))
                })
                .filter(|r| search.map_or(true, |s| r.matches_text(s)))
                .map(|r| list_item(tables, r))
                .filter(|row| filter.level.map_or(true, |level| row.risk_level == Some(level)))
                .collect();
            rows.sort_by(|a, b| {
                a.risk
                    .created_at()
                    .cmp(&b.risk.created_at())
                    .then_with(|| a.risk.number().cmp(&b.risk.number()))
            });
            Page::slice(rows, filter.page, filter.page_size)
        })
    }

    pub fn get(&self, id: &EntityId) -> ServiceResult<RiskView> {
        self.store.read(|tables| Ok(risk_view(tables, tables.risk(id)?)))
    }

    /// Create a risk with its optional evaluation, causes and controls in
    /// one transaction. Nested controls need the evaluation.
    pub fn create(&self, command: CreateRisk) -> ServiceResult<RiskView> {
        let view = self.store.transact_scored(&self.settings, |tables, engine| {
            let process = tables.process(&command.process_id)?;
            let process_id = process.id.clone();
            let details = RiskDetails {
                description: required_text("description", &command.description)?,
                classification: command.classification,
                category: command.category,
                zone: command.zone,
                risk_type_id: command.risk_type_id,
                risk_subtype_id: command.risk_subtype_id,
                objective_id: command.objective_id,
                management_id: command.management_id,
                source: command.source,
                origin: command.origin,
            };
            check_references(tables, &details)?;

            let acronym = details
                .management_id
                .as_ref()
                .and_then(|m| tables.managements.get(m))
                .map(|m| m.acronym.clone());
            let number = tables.next_risk_number(&process_id);
            let risk = Risk::create(process_id, number, acronym.as_deref(), details);
            let risk_id = risk.id().clone();
            tables.risks.insert(risk_id.clone(), risk);

            if let Some(evaluation) = command.evaluation {
                upsert_evaluation(tables, &risk_id, evaluation, engine)?;
            }
            for cause in command.causes {
                insert_cause(tables, &risk_id, cause, engine)?;
            }
            for control in command.controls {
                insert_control(tables, ControlTarget::Risk(risk_id.clone()), control, engine)?;
            }

            Ok(risk_view(tables, tables.risk(&risk_id)?))
        })?;

        tracing::info!(
            risk_id = %view.risk.id(),
            code = view.risk.code(),
            causes = view.causes.len(),
            state = ?view.state,
            "Risk created"
        );
        Ok(view)
    }

    /// Descriptive fields only; identity never changes. An embedded
    /// evaluation is upserted in the same transaction.
    pub fn update(&self, id: &EntityId, command: UpdateRisk) -> ServiceResult<RiskView> {
        self.store.transact_scored(&self.settings, |tables, engine| {
            let current = tables.risk(id)?.details().clone();
            let details = RiskDetails {
                description: match command.description {
                    Some(d) => required_text("description", &d)?,
                    None => current.description,
                },
                classification: command.classification.unwrap_or(current.classification),
                category: command.category.unwrap_or(current.category),
                zone: command.zone.unwrap_or(current.zone),
                risk_type_id: command.risk_type_id.unwrap_or(current.risk_type_id),
                risk_subtype_id: command.risk_subtype_id.unwrap_or(current.risk_subtype_id),
                objective_id: command.objective_id.unwrap_or(current.objective_id),
                management_id: command.management_id.unwrap_or(current.management_id),
                source: command.source.unwrap_or(current.source),
                origin: command.origin.unwrap_or(current.origin),
            };
            check_references(tables, &details)?;

            if let Some(risk) = tables.risks.get_mut(id) {
                risk.update_details(details);
            }
            if let Some(evaluation) = command.evaluation {
                upsert_evaluation(tables, id, evaluation, engine)?;
            }
            Ok(risk_view(tables, tables.risk(id)?))
        })
    }

    /// Cascade: evaluation, causes, controls, priority and preventive plans
    /// go with the risk. Incidents survive and lose the reference.
    pub fn delete(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables.risks.remove(id).ok_or_else(|| ServiceError::not_found("risk", id))?;
            tables.evaluations.remove(id);
            tables.priorities.remove(id);
            tables.causes.retain(|_, c| &c.risk_id != id);
            tables.controls.retain(|_, c| c.risk_id() != id);
            tables.plans.retain(|_, p| p.origin.risk_id() != Some(id));
            for incident in tables.incidents.values_mut() {
                if incident.risk_id.as_ref() == Some(id) {
                    incident.risk_id = None;
                }
            }
            Ok::<_, ServiceError>(())
        })?;
        tracing::info!(risk_id = %id, "Risk deleted");
        Ok(())
    }

    pub fn statistics(&self, process_id: Option<&EntityId>) -> RiskStatistics {
        self.store.read(|tables| {
            let mut stats = RiskStatistics::default();
            for risk in tables
                .risks
                .values()
                .filter(|r| process_id.map_or(true, |p| r.process_id() == p))
            {
                stats.total += 1;
                match risk.classification() {
                    RiskClassification::Negative => stats.negative += 1,
                    RiskClassification::Positive => stats.positive += 1,
                }
                match tables.risk_state(risk.id()) {
                    RiskState::Unevaluated => stats.unevaluated += 1,
                    RiskState::Evaluated => stats.evaluated += 1,
                    RiskState::ResidualScored => {
                        stats.evaluated += 1;
                        stats.residual_scored += 1;
                    }
                }
                if let Some(evaluation) = tables.evaluations.get(risk.id()) {
                    match evaluation.risk_level() {
                        RiskBand::Low => stats.low += 1,
                        RiskBand::Medium => stats.medium += 1,
                        RiskBand::High => stats.high += 1,
                        RiskBand::Critical => stats.critical += 1,
                    }
                }
            }
            stats
        })
    }

    /// Most recently created first
    pub fn recent(&self, limit: Option<usize>) -> Vec<RiskListItem> {
        self.store.read(|tables| {
            let mut risks: Vec<&Risk> = tables.risks.values().collect();
            risks.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
            risks
                .into_iter()
                .take(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
                .map(|r| list_item(tables, r))
                .collect()
        })
    }

    /// Heat-map points for every evaluated risk
    pub fn map_points(&self, process_id: Option<&EntityId>) -> Vec<MapPoint> {
        self.store.read(|tables| {
            tables
                .risks
                .values()
                .filter(|r| process_id.map_or(true, |p| r.process_id() == p))
                .filter_map(|risk| {
                    let evaluation = tables.evaluations.get(risk.id())?;
                    let assessment = evaluation.assessment();
                    let residual = evaluation.residual();
                    Some(MapPoint {
                        risk_id: risk.id().clone(),
                        code: risk.code().to_string(),
                        number: risk.number(),
                        description: risk.description().to_string(),
                        classification: risk.classification(),
                        management_acronym: risk
                            .details()
                            .management_id
                            .as_ref()
                            .and_then(|m| tables.managements.get(m))
                            .map(|m| m.acronym.clone()),
                        probability: assessment.probability.value(),
                        impact: assessment.impact_global,
                        inherent_risk: assessment.inherent_risk,
                        risk_level: assessment.risk_level,
                        inherent_cell: assessment.inherent_cell,
                        residual_risk: residual.map(|r| r.residual_risk),
                        residual_level: residual.map(|r| r.residual_level),
                        residual_cell: residual
                            .map(|r| erm_scoring::GridCell::new(r.residual_probability, r.residual_impact))
                            .unwrap_or(assessment.inherent_cell),
                    })
                })
                .collect()
        })
    }
}
