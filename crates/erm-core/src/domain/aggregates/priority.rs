//! Risk prioritization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

/// Treatment decision for a prioritized risk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskResponse {
    Accept,
    #[default]
    Mitigate,
    Transfer,
    Avoid,
}

/// One per risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub id: EntityId,
    pub risk_id: EntityId,
    pub final_rating: Option<f64>,
    pub response: RiskResponse,
    pub responsible: Option<String>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
