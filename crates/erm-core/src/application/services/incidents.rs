//! Materialized risk events

use chrono::{NaiveDate, Utc};
use erm_scoring::impact::MAX_IMPACT;
use erm_scoring::ImpactDimension;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::dto::{CreateIncident, IncidentStatistics, UpdateIncident};
use crate::domain::aggregates::{Incident, IncidentStatus};
use crate::domain::value_objects::{in_range, required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{require, RiskStore, Tables};

fn check_impacts(impacts: &BTreeMap<ImpactDimension, u8>) -> ServiceResult<()> {
    for (dimension, &value) in impacts {
        in_range(dimension.as_str(), value, 0, MAX_IMPACT)?;
    }
    Ok(())
}

fn check_references(tables: &Tables, risk_id: Option<&EntityId>, process_id: Option<&EntityId>) -> ServiceResult<()> {
    require(&tables.risks, "risk", risk_id)?;
    require(&tables.processes, "process", process_id)
}

fn check_dates(incident: &Incident) -> ServiceResult<()> {
    if let (Some(occurred), Some(resolved)) = (incident.occurred_on, incident.resolved_on) {
        if resolved < occurred {
            return Err(ServiceError::validation(format!(
                "resolved_on {resolved} is before occurred_on {occurred}"
            )));
        }
    }
    Ok(())
}

pub struct IncidentService {
    store: Arc<RiskStore>,
}

impl IncidentService {
    pub fn new(store: Arc<RiskStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, command: CreateIncident) -> ServiceResult<Incident> {
        check_impacts(&command.impacts)?;
        let incident = self.store.transact(|tables| {
            check_references(tables, command.risk_id.as_ref(), command.process_id.as_ref())?;
            let now = Utc::now();
            let code = match command.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                Some(code) => code.to_string(),
                None => Incident::generated_code(now),
            };
            if tables.incidents.values().any(|i| i.code == code) {
                return Err(ServiceError::Conflict(format!("incident code {code} is already used")));
            }
            let incident = Incident {
                id: EntityId::new(),
                code,
                title: required_text("title", &command.title)?,
                description: command.description,
                risk_id: command.risk_id,
                process_id: command.process_id,
                responsible: command.responsible,
                status: command.status.unwrap_or_default(),
                occurred_on: command.occurred_on,
                reported_on: command.reported_on.unwrap_or_else(|| now.date_naive()),
                resolved_on: command.resolved_on,
                reported_by: command.reported_by,
                corrective_actions: command.corrective_actions,
                impacts: command.impacts,
                created_at: now,
                updated_at: now,
            };
            check_dates(&incident)?;
            tables.incidents.insert(incident.id.clone(), incident.clone());
            Ok::<_, ServiceError>(incident)
        })?;
        tracing::info!(incident_id = %incident.id, code = %incident.code, status = ?incident.status, "Incident reported");
        Ok(incident)
    }

    pub fn get(&self, id: &EntityId) -> ServiceResult<Incident> {
        self.store.read(|tables| tables.incident(id).cloned())
    }

    pub fn update(&self, id: &EntityId, command: UpdateIncident) -> ServiceResult<Incident> {
        if let Some(impacts) = &command.impacts {
            check_impacts(impacts)?;
        }
        self.store.transact(|tables| {
            check_references(
                tables,
                command.risk_id.as_ref().and_then(Option::as_ref),
                command.process_id.as_ref().and_then(Option::as_ref),
            )?;
            let current = tables.incident(id)?.clone();
            let incident = Incident {
                title: match command.title {
                    Some(title) => required_text("title", &title)?,
                    None => current.title,
                },
                description: command.description.unwrap_or(current.description),
                risk_id: command.risk_id.unwrap_or(current.risk_id),
                process_id: command.process_id.unwrap_or(current.process_id),
                responsible: command.responsible.unwrap_or(current.responsible),
                status: command.status.unwrap_or(current.status),
                occurred_on: command.occurred_on.unwrap_or(current.occurred_on),
                resolved_on: command.resolved_on.unwrap_or(current.resolved_on),
                reported_by: command.reported_by.unwrap_or(current.reported_by),
                corrective_actions: command.corrective_actions.unwrap_or(current.corrective_actions),
                impacts: command.impacts.unwrap_or(current.impacts),
                updated_at: Utc::now(),
                ..current
            };
            check_dates(&incident)?;
            tables.incidents.insert(id.clone(), incident.clone());
            Ok(incident)
        })
    }

    /// Reactive plans of the incident are deleted with it
    pub fn delete(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .incidents
                .remove(id)
                .ok_or_else(|| ServiceError::not_found("incident", id))?;
            tables.plans.retain(|_, p| p.origin.incident_id() != Some(id));
            Ok::<_, ServiceError>(())
        })?;
        tracing::info!(incident_id = %id, "Incident deleted");
        Ok(())
    }

    /// Most recently reported first
    pub fn list(&self, status: Option<IncidentStatus>) -> Vec<Incident> {
        self.store.read(|tables| {
            let mut incidents: Vec<Incident> = tables
                .incidents
                .values()
                .filter(|i| status.map_or(true, |s| i.status == s))
                .cloned()
                .collect();
            incidents.sort_by(|a, b| b.reported_on.cmp(&a.reported_on).then_with(|| b.created_at.cmp(&a.created_at)));
            incidents
        })
    }

    pub fn by_risk(&self, risk_id: &EntityId) -> ServiceResult<Vec<Incident>> {
        self.store.read(|tables| {
            tables.risk(risk_id)?;
            Ok(tables
                .incidents
                .values()
                .filter(|i| i.risk_id.as_ref() == Some(risk_id))
                .cloned()
                .collect())
        })
    }

    /// Reported within `from..=to`
    pub fn by_period(&self, from: NaiveDate, to: NaiveDate) -> ServiceResult<Vec<Incident>> {
        if from > to {
            return Err(ServiceError::validation(format!("period start {from} is after its end {to}")));
        }
        Ok(self.store.read(|tables| {
            tables
                .incidents
                .values()
                .filter(|i| (from..=to).contains(&i.reported_on))
                .cloned()
                .collect()
        }))
    }

    pub fn statistics(&self) -> IncidentStatistics {
        self.store.read(|tables| {
            let mut by_status: BTreeMap<IncidentStatus, usize> =
                IncidentStatus::ALL.iter().map(|s| (*s, 0)).collect();
            let mut means = Vec::new();
            for incident in tables.incidents.values() {
                *by_status.entry(incident.status).or_default() += 1;
                means.extend(incident.impact_mean());
            }
            let average_impact = (!means.is_empty()).then(|| means.iter().sum::<f64>() / means.len() as f64);
            let max_impact = means.iter().copied().reduce(f64::max);
            IncidentStatistics {
                total: tables.incidents.len(),
                by_status,
                average_impact,
                max_impact,
            }
        })
    }
}
