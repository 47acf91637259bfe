//! Cause entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

/// How a cause is being managed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseTreatment {
    Control,
    Plan,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cause {
    pub id: EntityId,
    pub risk_id: EntityId,
    pub description: String,
    /// Source category (people, process, legal, infrastructure, external)
    pub source: Option<String>,
    /// Frequency category (rare .. expected)
    pub frequency: Option<String>,
    /// Marks the selected root cause
    pub selected: bool,
    pub treatment: Option<CauseTreatment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
