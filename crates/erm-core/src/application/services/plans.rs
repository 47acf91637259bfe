//! Action plans, preventive (from a risk) or reactive (from an incident)

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::application::dto::{CreatePlan, PlanStatistics, UpdatePlan};
use crate::domain::aggregates::{ActionPlan, PlanOrigin, PlanStatus, DEFAULT_PLAN_PRIORITY};
use crate::domain::value_objects::{in_range, required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{RiskStore, Tables};

pub const MAX_PROGRESS: u8 = 100;

fn check_origin(tables: &Tables, origin: &PlanOrigin) -> ServiceResult<()> {
    match origin {
        PlanOrigin::Preventive { risk_id } => tables.risk(risk_id).map(|_| ()),
        PlanOrigin::Reactive { incident_id } => tables.incident(incident_id).map(|_| ()),
    }
}

/// Field rules shared by create and update, checked on the merged plan
fn check_plan(plan: &ActionPlan) -> ServiceResult<()> {
    required_text("description", &plan.description)?;
    in_range("priority", plan.priority, 1, 5)?;
    in_range("progress", plan.progress, 0, MAX_PROGRESS)?;
    if let (Some(start), Some(end)) = (plan.start_date, plan.end_date) {
        if start > end {
            return Err(ServiceError::validation(format!("start_date {start} is after end_date {end}")));
        }
    }
    if plan.budget.is_some_and(|b| b < Decimal::ZERO) {
        return Err(ServiceError::validation("budget must not be negative"));
    }
    Ok(())
}

pub struct ActionPlanService {
    store: Arc<RiskStore>,
}

impl ActionPlanService {
    pub fn new(store: Arc<RiskStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, command: CreatePlan) -> ServiceResult<ActionPlan> {
        let plan = self.store.transact(|tables| {
            check_origin(tables, &command.origin)?;
            let now = Utc::now();
            let plan = ActionPlan {
                id: EntityId::new(),
                origin: command.origin,
                name: command.name,
                description: command.description.trim().to_string(),
                objective: command.objective,
                responsible: command.responsible,
                start_date: command.start_date,
                end_date: command.end_date,
                scheduled_date: command.scheduled_date,
                executed_date: command.executed_date,
                status: command.status.unwrap_or_default(),
                priority: command.priority.unwrap_or(DEFAULT_PLAN_PRIORITY),
                budget: command.budget,
                progress: command.progress.unwrap_or(0),
                notes: command.notes,
                created_at: now,
                updated_at: now,
            };
            check_plan(&plan)?;
            tables.plans.insert(plan.id.clone(), plan.clone());
            Ok::<_, ServiceError>(plan)
        })?;
        tracing::info!(plan_id = %plan.id, origin = ?plan.origin, "Action plan created");
        Ok(plan)
    }

    pub fn get(&self, id: &EntityId) -> ServiceResult<ActionPlan> {
        self.store
            .read(|tables| tables.plans.get(id).cloned().ok_or_else(|| ServiceError::not_found("action plan", id)))
    }

    pub fn update(&self, id: &EntityId, command: UpdatePlan) -> ServiceResult<ActionPlan> {
        self.store.transact(|tables| {
            let current = tables
                .plans
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("action plan", id))?;
            let plan = ActionPlan {
                name: command.name.unwrap_or(current.name),
                description: command.description.map(|d| d.trim().to_string()).unwrap_or(current.description),
                objective: command.objective.unwrap_or(current.objective),
                responsible: command.responsible.unwrap_or(current.responsible),
                start_date: command.start_date.unwrap_or(current.start_date),
                end_date: command.end_date.unwrap_or(current.end_date),
                scheduled_date: command.scheduled_date.unwrap_or(current.scheduled_date),
                executed_date: command.executed_date.unwrap_or(current.executed_date),
                status: command.status.unwrap_or(current.status),
                priority: command.priority.unwrap_or(current.priority),
                budget: command.budget.unwrap_or(current.budget),
                progress: command.progress.unwrap_or(current.progress),
                notes: command.notes.unwrap_or(current.notes),
                updated_at: Utc::now(),
                ..current
            };
            check_plan(&plan)?;
            tables.plans.insert(id.clone(), plan.clone());
            Ok(plan)
        })
    }

    pub fn delete(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .plans
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("action plan", id))
        })
    }

    pub fn list(&self, status: Option<PlanStatus>) -> Vec<ActionPlan> {
        self.store.read(|tables| {
            tables
                .plans
                .values()
                .filter(|p| status.map_or(true, |s| p.status == s))
                .cloned()
                .collect()
        })
    }

    /// Preventive plans of a risk
    pub fn by_risk(&self, risk_id: &EntityId) -> ServiceResult<Vec<ActionPlan>> {
        self.store.read(|tables| {
            tables.risk(risk_id)?;
            Ok(tables
                .plans
                .values()
                .filter(|p| p.origin.risk_id() == Some(risk_id))
                .cloned()
                .collect())
        })
    }

    /// Reactive plans of an incident
    pub fn by_incident(&self, incident_id: &EntityId) -> ServiceResult<Vec<ActionPlan>> {
        self.store.read(|tables| {
            tables.incident(incident_id)?;
            Ok(tables
                .plans
                .values()
                .filter(|p| p.origin.incident_id() == Some(incident_id))
                .cloned()
                .collect())
        })
    }

    /// Scheduled before `today` and not completed, earliest first
    pub fn overdue(&self, today: NaiveDate) -> Vec<ActionPlan> {
        self.store.read(|tables| {
            let mut plans: Vec<ActionPlan> = tables.plans.values().filter(|p| p.is_overdue(today)).cloned().collect();
            plans.sort_by_key(|p| p.scheduled_date);
            plans
        })
    }

    /// Status counts; `overdue` also counts plans past their schedule
    /// whatever their stored status
    pub fn statistics(&self, today: NaiveDate) -> PlanStatistics {
        self.store.read(|tables| {
            let mut stats = PlanStatistics::default();
            for plan in tables.plans.values() {
                stats.total += 1;
                match plan.status {
                    PlanStatus::Planned => stats.planned += 1,
                    PlanStatus::InProgress => stats.in_progress += 1,
                    PlanStatus::Completed => stats.completed += 1,
                    PlanStatus::Overdue => {}
                }
                if plan.status == PlanStatus::Overdue || plan.is_overdue(today) {
                    stats.overdue += 1;
                }
                match plan.origin {
                    PlanOrigin::Preventive { .. } => stats.preventive += 1,
                    PlanOrigin::Reactive { .. } => stats.reactive += 1,
                }
            }
            stats
        })
    }
}
