//! Aggregates module

pub mod action_plan;
pub mod catalog;
pub mod cause;
pub mod control;
pub mod evaluation;
pub mod incident;
pub mod organization;
pub mod priority;
pub mod process;
pub mod risk;
pub mod utility;

pub use action_plan::{ActionPlan, PlanOrigin, PlanStatus, DEFAULT_PLAN_PRIORITY};
pub use catalog::{
    AxisLevel, CatalogEntry, Frequency, ImpactLevel, ImpactType, MapAxes, MapConfig, MapKind, Objective,
    RiskLevelInfo, RiskSubtype, RiskType,
};
pub use cause::{Cause, CauseTreatment};
pub use control::{Control, ControlDetails, ControlKind, ControlTarget};
pub use evaluation::Evaluation;
pub use incident::{Incident, IncidentStatus};
pub use organization::{Area, Management, Position, User, UserRole};
pub use priority::{Priority, RiskResponse};
pub use process::{
    BenchmarkEntry, ComplianceLevel, ContextGroups, ContextItem, ContextKind, DofaItem, DofaKind, DofaMatrix,
    Process, ProcessKind, ProcessOwner, Regulation, RegulationStatus,
};
pub use risk::{Risk, RiskClassification, RiskDetails, RiskState};
pub use utility::{ChangeAction, Notification, Observation, ProcessChange, Task, TaskStatus};
