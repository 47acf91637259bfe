//! Action plan aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

/// A plan is preventive (against a risk) or reactive (after an incident),
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanOrigin {
    Preventive { risk_id: EntityId },
    Reactive { incident_id: EntityId },
}

impl PlanOrigin {
    pub fn risk_id(&self) -> Option<&EntityId> {
        match self {
            Self::Preventive { risk_id } => Some(risk_id),
            Self::Reactive { .. } => None,
        }
    }

    pub fn incident_id(&self) -> Option<&EntityId> {
        match self {
            Self::Reactive { incident_id } => Some(incident_id),
            Self::Preventive { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Overdue,
}

impl PlanStatus {
    pub const ALL: [PlanStatus; 4] = [Self::Planned, Self::InProgress, Self::Completed, Self::Overdue];
}

pub const DEFAULT_PLAN_PRIORITY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: EntityId,
    pub origin: PlanOrigin,
    pub name: Option<String>,
    pub description: String,
    pub objective: Option<String>,
    pub responsible: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub executed_date: Option<NaiveDate>,
    pub status: PlanStatus,
    /// 1 (highest) ..= 5
    pub priority: u8,
    pub budget: Option<Decimal>,
    /// Percent complete, 0..=100
    pub progress: u8,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActionPlan {
    /// Scheduled before `today` and not yet completed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != PlanStatus::Completed && self.scheduled_date.is_some_and(|d| d < today)
    }
}
