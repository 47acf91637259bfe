//! Commands and read models
//!
//! Every command rejects unknown fields: callers cannot smuggle extra
//! attributes into an update.

use chrono::NaiveDate;
use erm_scoring::{
    ControlAssessment, EvaluationMode, GridCell, ImpactDimension, ImpactScores, RiskBand, ScoringConfig,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregates::*;
use crate::domain::value_objects::EntityId;

/// Clearable field of a partial update: absent keeps the stored value,
/// `null` clears it and a value replaces it
pub type Patch<T> = Option<Option<T>>;

fn nullable<'de, T, D>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============ Paging ============

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slice `all` into the requested page (1-based)
    pub fn slice(all: Vec<T>, page: Option<u32>, page_size: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let total = all.len() as u64;
        let total_pages = total.div_ceil(u64::from(page_size)) as u32;
        let skip = (page as usize - 1).saturating_mul(page_size as usize);
        let items = all.into_iter().skip(skip).take(page_size as usize).collect();
        Self { items, total, page, page_size, total_pages }
    }
}

// ============ Processes ============

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProcess {
    pub name: String,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub kind: ProcessKind,
    pub area_id: Option<EntityId>,
    pub management_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProcess {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub objective: Patch<String>,
    pub kind: Option<ProcessKind>,
    #[serde(default, deserialize_with = "nullable")]
    pub area_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub management_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub owner_id: Patch<EntityId>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkUpdateProcesses {
    pub ids: Vec<EntityId>,
    pub changes: UpdateProcess,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDofaItem {
    pub kind: DofaKind,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRegulation {
    pub name: String,
    pub regulator: Option<String>,
    #[serde(default)]
    pub status: RegulationStatus,
    #[serde(default)]
    pub compliance: ComplianceLevel,
    pub sanctions: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewContextItem {
    pub kind: ContextKind,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBenchmark {
    pub company: String,
    pub risk: String,
    pub classification: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignOwner {
    pub user_id: EntityId,
}

// ============ Organization ============

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaInput {
    pub name: String,
    pub description: Option<String>,
    pub director: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagementInput {
    pub name: String,
    pub acronym: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    pub position_id: Option<EntityId>,
    pub area_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "nullable")]
    pub position_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub area_id: Patch<EntityId>,
    pub active: Option<bool>,
}

// ============ Risks ============

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskFilter {
    pub process_id: Option<EntityId>,
    pub classification: Option<RiskClassification>,
    pub level: Option<RiskBand>,
    pub zone: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateRisk {
    #[serde(default)]
    pub mode: EvaluationMode,
    /// Validated into a `Probability` by the service
    pub probability: u8,
    pub impacts: ImpactScores,
    pub evaluated_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewControl {
    pub description: String,
    #[serde(default)]
    pub kind: ControlKind,
    pub responsible: Option<String>,
    pub frequency: Option<String>,
    pub assessment: ControlAssessment,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateControl {
    pub description: Option<String>,
    pub kind: Option<ControlKind>,
    #[serde(default, deserialize_with = "nullable")]
    pub responsible: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub frequency: Patch<String>,
    pub assessment: Option<ControlAssessment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCause {
    pub description: String,
    pub source: Option<String>,
    pub frequency: Option<String>,
    #[serde(default)]
    pub selected: bool,
    pub treatment: Option<CauseTreatment>,
    /// Controls attached to this cause, scored in the same transaction
    #[serde(default)]
    pub controls: Vec<NewControl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCause {
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub source: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub frequency: Patch<String>,
    pub selected: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub treatment: Patch<CauseTreatment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRisk {
    pub process_id: EntityId,
    pub description: String,
    #[serde(default)]
    pub classification: RiskClassification,
    pub category: Option<String>,
    pub zone: Option<String>,
    pub risk_type_id: Option<EntityId>,
    pub risk_subtype_id: Option<EntityId>,
    pub objective_id: Option<EntityId>,
    pub management_id: Option<EntityId>,
    pub source: Option<String>,
    pub origin: Option<String>,
    /// Applied before any nested control is scored
    pub evaluation: Option<EvaluateRisk>,
    #[serde(default)]
    pub causes: Vec<NewCause>,
    /// Controls attached directly to the risk
    #[serde(default)]
    pub controls: Vec<NewControl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRisk {
    pub description: Option<String>,
    pub classification: Option<RiskClassification>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub zone: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub risk_type_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub risk_subtype_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub objective_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub management_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub source: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub origin: Patch<String>,
    /// Create or replace the evaluation in the same transaction
    pub evaluation: Option<EvaluateRisk>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpsertPriority {
    pub final_rating: Option<f64>,
    #[serde(default)]
    pub response: RiskResponse,
    pub responsible: Option<String>,
    pub score: Option<f64>,
}

// ============ Action plans ============

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePlan {
    pub origin: PlanOrigin,
    pub name: Option<String>,
    pub description: String,
    pub objective: Option<String>,
    pub responsible: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub executed_date: Option<NaiveDate>,
    pub status: Option<PlanStatus>,
    pub priority: Option<u8>,
    pub budget: Option<Decimal>,
    pub progress: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePlan {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Patch<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub objective: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub responsible: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub scheduled_date: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub executed_date: Patch<NaiveDate>,
    pub status: Option<PlanStatus>,
    pub priority: Option<u8>,
    #[serde(default, deserialize_with = "nullable")]
    pub budget: Patch<Decimal>,
    pub progress: Option<u8>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Patch<String>,
}

// ============ Incidents ============

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIncident {
    pub code: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub risk_id: Option<EntityId>,
    pub process_id: Option<EntityId>,
    pub responsible: Option<String>,
    pub status: Option<IncidentStatus>,
    pub occurred_on: Option<NaiveDate>,
    pub reported_on: Option<NaiveDate>,
    pub resolved_on: Option<NaiveDate>,
    pub reported_by: Option<String>,
    pub corrective_actions: Option<String>,
    #[serde(default)]
    pub impacts: BTreeMap<ImpactDimension, u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateIncident {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub risk_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub process_id: Patch<EntityId>,
    #[serde(default, deserialize_with = "nullable")]
    pub responsible: Patch<String>,
    pub status: Option<IncidentStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub occurred_on: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub resolved_on: Patch<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub reported_by: Patch<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub corrective_actions: Patch<String>,
    pub impacts: Option<BTreeMap<ImpactDimension, u8>>,
}

// ============ Catalogs ============

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImpactTypeInput {
    pub dimension: Option<ImpactDimension>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub levels: Vec<ImpactLevel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectiveInput {
    pub code: Option<String>,
    pub description: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapConfigUpdate {
    pub kind: MapKind,
    pub data: serde_json::Value,
}

// ============ Utilities ============

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewObservation {
    pub process_id: EntityId,
    pub author_id: EntityId,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub user_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}

/// Observation with its author resolved
#[derive(Debug, Clone, Serialize)]
pub struct ObservationView {
    #[serde(flatten)]
    pub observation: Observation,
    pub author: Option<User>,
}

// ============ Read models ============

#[derive(Debug, Clone, Serialize)]
pub struct CauseView {
    #[serde(flatten)]
    pub cause: Cause,
    pub controls: Vec<Control>,
}

/// Row of the risk register listing
#[derive(Debug, Clone, Serialize)]
pub struct RiskListItem {
    #[serde(flatten)]
    pub risk: Risk,
    pub state: RiskState,
    pub inherent_risk: Option<f64>,
    pub risk_level: Option<RiskBand>,
    pub residual_risk: Option<f64>,
    pub residual_level: Option<RiskBand>,
}

/// Risk with everything hanging off it
#[derive(Debug, Clone, Serialize)]
pub struct RiskView {
    #[serde(flatten)]
    pub risk: Risk,
    pub state: RiskState,
    pub process: Option<Process>,
    pub evaluation: Option<Evaluation>,
    pub causes: Vec<CauseView>,
    /// Controls attached directly to the risk
    pub controls: Vec<Control>,
    pub priority: Option<Priority>,
    pub plans: Vec<ActionPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskStatistics {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
    pub negative: usize,
    pub positive: usize,
    pub evaluated: usize,
    pub unevaluated: usize,
    pub residual_scored: usize,
}

/// One plotted risk on the heat maps
#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub risk_id: EntityId,
    pub code: String,
    pub number: u32,
    pub description: String,
    pub classification: RiskClassification,
    pub management_acronym: Option<String>,
    pub probability: u8,
    pub impact: f64,
    pub inherent_risk: f64,
    pub risk_level: RiskBand,
    pub inherent_cell: GridCell,
    pub residual_risk: Option<f64>,
    pub residual_level: Option<RiskBand>,
    /// Residual cell, or the inherent cell while no control is scored
    pub residual_cell: GridCell,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlEffectiveness {
    pub control_id: EntityId,
    pub effectiveness: Option<f64>,
    pub residual_risk: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectivenessSummary {
    pub control_count: usize,
    /// Mean over scored controls, 0 when none
    pub average_effectiveness: f64,
    pub controls: Vec<ControlEffectiveness>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanStatistics {
    pub total: usize,
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    pub preventive: usize,
    pub reactive: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentStatistics {
    pub total: usize,
    pub by_status: BTreeMap<IncidentStatus, usize>,
    /// Mean of per-incident impact means
    pub average_impact: Option<f64>,
    /// Largest per-incident impact mean
    pub max_impact: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessKindInfo {
    pub kind: ProcessKind,
    pub label: &'static str,
}

/// Scoring configuration as currently in force
#[derive(Debug, Clone, Serialize)]
pub struct ScoringConfigView {
    pub version: u64,
    pub config: ScoringConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessView {
    #[serde(flatten)]
    pub process: Process,
    pub dofa: DofaMatrix,
    pub regulations: Vec<Regulation>,
    pub context: ContextGroups,
    pub benchmarking: Vec<BenchmarkEntry>,
    pub owners: Vec<User>,
    pub risk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice() {
        let page = Page::slice((1..=23).collect::<Vec<_>>(), Some(3), Some(10));
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);

        let page = Page::slice(vec![1, 2, 3], None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);

        let past_end = Page::slice(vec![1, 2, 3], Some(9), Some(2));
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn test_commands_reject_unknown_fields() {
        let json = r#"{"probability":3,"impacts":[],"inherent_risk":1}"#;
        assert!(serde_json::from_str::<EvaluateRisk>(json).is_err());

        let json = r#"{"probability":3,"impacts":[]}"#;
        let cmd: EvaluateRisk = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.mode, EvaluationMode::AverageImpact);
    }

    #[test]
    fn test_patch_fields_distinguish_null_from_absent() {
        let update: UpdateRisk = serde_json::from_str(r#"{"zone":null,"category":"Fraud"}"#).unwrap();
        assert_eq!(update.zone, Some(None));
        assert_eq!(update.category, Some(Some("Fraud".to_string())));
        assert_eq!(update.source, None);

        let update: UpdateControl = serde_json::from_str(r#"{"responsible":null}"#).unwrap();
        assert_eq!(update.responsible, Some(None));
        assert_eq!(update.frequency, None);
    }
}
