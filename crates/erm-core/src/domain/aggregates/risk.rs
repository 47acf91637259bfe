//! Risk aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

/// Code suffix used when a risk has no management unit
pub const DEFAULT_CODE_SUFFIX: &str = "R";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClassification {
    #[default]
    Negative,
    Positive,
}

/// Where a risk is in the evaluation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskState {
    /// No evaluation yet
    Unevaluated,
    /// Inherent fields populated
    Evaluated,
    /// At least one scored control, residual fields populated
    ResidualScored,
}

/// Mutable descriptive fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDetails {
    pub description: String,
    pub classification: RiskClassification,
    /// Causal category
    pub category: Option<String>,
    pub zone: Option<String>,
    pub risk_type_id: Option<EntityId>,
    pub risk_subtype_id: Option<EntityId>,
    pub objective_id: Option<EntityId>,
    pub management_id: Option<EntityId>,
    pub source: Option<String>,
    pub origin: Option<String>,
}

/// Risk aggregate root. Identity (id, process, sequential number and code)
/// is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Risk {
    id: EntityId,
    process_id: EntityId,
    number: u32,
    code: String,
    #[serde(flatten)]
    details: RiskDetails,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Risk {
    /// `number` is the next sequence value within the process; `acronym`
    /// comes from the risk's management unit
    pub fn create(process_id: EntityId, number: u32, acronym: Option<&str>, details: RiskDetails) -> Self {
        let now = Utc::now();
        let suffix = acronym.filter(|a| !a.trim().is_empty()).unwrap_or(DEFAULT_CODE_SUFFIX);
        Self {
            id: EntityId::new(),
            process_id,
            number,
            code: format!("{number}{}", suffix.trim()),
            details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn process_id(&self) -> &EntityId { &self.process_id }
    pub fn number(&self) -> u32 { self.number }
    pub fn code(&self) -> &str { &self.code }
    pub fn details(&self) -> &RiskDetails { &self.details }
    pub fn description(&self) -> &str { &self.details.description }
    pub fn classification(&self) -> RiskClassification { self.details.classification }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn update_details(&mut self, details: RiskDetails) {
        self.details = details;
        self.touch();
    }

    /// Case-insensitive match on description or causal category
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.details.description.to_lowercase().contains(&needle)
            || self
                .details
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
