//! Risk prioritization

use chrono::Utc;
use std::sync::Arc;

use crate::application::dto::UpsertPriority;
use crate::domain::aggregates::Priority;
use crate::domain::value_objects::EntityId;
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::RiskStore;

fn check_non_negative(field: &str, value: Option<f64>) -> ServiceResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(ServiceError::validation(format!("{field} must be a non-negative number")))
        }
        _ => Ok(()),
    }
}

pub struct PriorityService {
    store: Arc<RiskStore>,
}

impl PriorityService {
    pub fn new(store: Arc<RiskStore>) -> Self {
        Self { store }
    }

    /// One priority per risk; a second call replaces the first
    pub fn upsert(&self, risk_id: &EntityId, command: UpsertPriority) -> ServiceResult<Priority> {
        check_non_negative("final_rating", command.final_rating)?;
        check_non_negative("score", command.score)?;
        self.store.transact(|tables| {
            tables.risk(risk_id)?;
            let now = Utc::now();
            let priority = match tables.priorities.remove(risk_id) {
                Some(existing) => Priority {
                    final_rating: command.final_rating,
                    response: command.response,
                    responsible: command.responsible,
                    score: command.score,
                    updated_at: now,
                    ..existing
                },
                None => Priority {
                    id: EntityId::new(),
                    risk_id: risk_id.clone(),
                    final_rating: command.final_rating,
                    response: command.response,
                    responsible: command.responsible,
                    score: command.score,
                    created_at: now,
                    updated_at: now,
                },
            };
            tables.priorities.insert(risk_id.clone(), priority.clone());
            Ok(priority)
        })
    }

    pub fn get(&self, risk_id: &EntityId) -> ServiceResult<Priority> {
        self.store.read(|tables| {
            tables
                .priorities
                .get(risk_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("priority", risk_id))
        })
    }

    /// Highest final rating first; unrated priorities last
    pub fn list(&self) -> Vec<Priority> {
        self.store.read(|tables| {
            let mut priorities: Vec<Priority> = tables.priorities.values().cloned().collect();
            priorities.sort_by(|a, b| {
                let a = a.final_rating.unwrap_or(f64::NEG_INFINITY);
                let b = b.final_rating.unwrap_or(f64::NEG_INFINITY);
                b.total_cmp(&a)
            });
            priorities
        })
    }

    pub fn delete(&self, risk_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .priorities
                .remove(risk_id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("priority", risk_id))
        })
    }
}
