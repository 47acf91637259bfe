//! Process aggregate
//!
//! A business process and the strategic analysis attached to it: DOFA
//! (SWOT) items, applicable regulations, internal/external context,
//! benchmarking against peers, and responsible users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Strategic,
    Operational,
    Support,
    Compliance,
    Management,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 5] = [
        Self::Strategic,
        Self::Operational,
        Self::Support,
        Self::Compliance,
        Self::Management,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Strategic => "Strategic",
            Self::Operational => "Operational",
            Self::Support => "Support",
            Self::Compliance => "Compliance",
            Self::Management => "Management",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub kind: ProcessKind,
    pub area_id: Option<EntityId>,
    pub management_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Process {
    pub fn new(name: String, kind: ProcessKind) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            name,
            description: None,
            objective: None,
            kind,
            area_id: None,
            management_id: None,
            owner_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy under a fresh identity, name suffixed with "(Copy)"
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            name: format!("{} (Copy)", self.name),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============ DOFA ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DofaKind {
    Strength,
    Opportunity,
    Weakness,
    Threat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DofaItem {
    pub id: EntityId,
    pub process_id: EntityId,
    pub kind: DofaKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// DOFA items bucketed by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DofaMatrix {
    pub strengths: Vec<DofaItem>,
    pub opportunities: Vec<DofaItem>,
    pub weaknesses: Vec<DofaItem>,
    pub threats: Vec<DofaItem>,
}

impl FromIterator<DofaItem> for DofaMatrix {
    fn from_iter<I: IntoIterator<Item = DofaItem>>(iter: I) -> Self {
        let mut matrix = Self::default();
        for item in iter {
            match item.kind {
                DofaKind::Strength => matrix.strengths.push(item),
                DofaKind::Opportunity => matrix.opportunities.push(item),
                DofaKind::Weakness => matrix.weaknesses.push(item),
                DofaKind::Threat => matrix.threats.push(item),
            }
        }
        matrix
    }
}

// ============ Regulations ============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulationStatus {
    #[default]
    Existing,
    Proposed,
    Repealed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    #[default]
    Total,
    Partial,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub id: EntityId,
    pub process_id: EntityId,
    pub name: String,
    pub regulator: Option<String>,
    pub status: RegulationStatus,
    pub compliance: ComplianceLevel,
    pub sanctions: Option<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============ Context ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: EntityId,
    pub process_id: EntityId,
    pub kind: ContextKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextGroups {
    pub internal: Vec<ContextItem>,
    pub external: Vec<ContextItem>,
}

// ============ Benchmarking ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub id: EntityId,
    pub process_id: EntityId,
    pub company: String,
    pub risk: String,
    pub classification: Option<String>,
    /// Peer's rating of the risk, 1..=5
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// Link between a process and a responsible user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOwner {
    pub process_id: EntityId,
    pub user_id: EntityId,
    pub assigned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_gets_new_identity() {
        let original = Process::new("Payroll".into(), ProcessKind::Support);
        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Payroll (Copy)");
        assert_eq!(copy.kind, ProcessKind::Support);
    }

    #[test]
    fn test_dofa_matrix_groups_by_kind() {
        let process_id = EntityId::new();
        let item = |kind| DofaItem {
            id: EntityId::new(),
            process_id: process_id.clone(),
            kind,
            description: "x".into(),
            created_at: Utc::now(),
        };
        let matrix: DofaMatrix = vec![item(DofaKind::Threat), item(DofaKind::Strength), item(DofaKind::Threat)]
            .into_iter()
            .collect();
        assert_eq!(matrix.threats.len(), 2);
        assert_eq!(matrix.strengths.len(), 1);
        assert!(matrix.weaknesses.is_empty());
    }
}
