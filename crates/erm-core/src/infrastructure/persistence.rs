//! In-memory relational store
//!
//! All tables live in one [`Tables`] value behind a single lock. Writers
//! stage their changes on a copy and commit only on success, so a
//! multi-entity write is all-or-nothing and readers never see a half-applied
//! change.

use erm_scoring::ScoringEngine;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::services::ScoringSettings;
use crate::domain::aggregates::catalog::{
    default_consequences, default_frequencies, default_impact_types, default_origins, default_sources,
};
use crate::domain::aggregates::*;
use crate::domain::value_objects::EntityId;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    // Processes and their analysis
    pub processes: BTreeMap<EntityId, Process>,
    pub dofa: BTreeMap<EntityId, DofaItem>,
    pub regulations: BTreeMap<EntityId, Regulation>,
    pub context: BTreeMap<EntityId, ContextItem>,
    pub benchmarking: BTreeMap<EntityId, BenchmarkEntry>,
    pub process_owners: Vec<ProcessOwner>,

    // Organization
    pub areas: BTreeMap<EntityId, Area>,
    pub managements: BTreeMap<EntityId, Management>,
    pub positions: BTreeMap<EntityId, Position>,
    pub users: BTreeMap<EntityId, User>,

    // Risk register
    pub risks: BTreeMap<EntityId, Risk>,
    /// Keyed by risk id: one evaluation per risk
    pub evaluations: BTreeMap<EntityId, Evaluation>,
    pub causes: BTreeMap<EntityId, Cause>,
    pub controls: BTreeMap<EntityId, Control>,
    /// Keyed by risk id: one priority per risk
    pub priorities: BTreeMap<EntityId, Priority>,
    pub plans: BTreeMap<EntityId, ActionPlan>,
    pub incidents: BTreeMap<EntityId, Incident>,

    // Catalogs
    pub impact_types: BTreeMap<EntityId, ImpactType>,
    pub frequencies: Vec<Frequency>,
    pub sources: Vec<CatalogEntry>,
    pub origins: Vec<CatalogEntry>,
    pub consequences: Vec<CatalogEntry>,
    pub risk_types: BTreeMap<EntityId, RiskType>,
    pub objectives: BTreeMap<EntityId, Objective>,
    pub map_config: MapConfig,

    // Utilities
    pub observations: BTreeMap<EntityId, Observation>,
    /// Append-only, oldest first
    pub process_history: Vec<ProcessChange>,
    pub tasks: BTreeMap<EntityId, Task>,
    pub notifications: BTreeMap<EntityId, Notification>,
}

impl Tables {
    /// Empty register with the stock catalogs loaded
    pub fn with_default_catalogs() -> Self {
        Self {
            impact_types: default_impact_types().into_iter().map(|t| (t.id.clone(), t)).collect(),
            frequencies: default_frequencies(),
            sources: default_sources(),
            origins: default_origins(),
            consequences: default_consequences(),
            ..Self::default()
        }
    }

    pub fn process(&self, id: &EntityId) -> ServiceResult<&Process> {
        self.processes.get(id).ok_or_else(|| ServiceError::not_found("process", id))
    }

    pub fn risk(&self, id: &EntityId) -> ServiceResult<&Risk> {
        self.risks.get(id).ok_or_else(|| ServiceError::not_found("risk", id))
    }

    pub fn cause(&self, id: &EntityId) -> ServiceResult<&Cause> {
        self.causes.get(id).ok_or_else(|| ServiceError::not_found("cause", id))
    }

    pub fn incident(&self, id: &EntityId) -> ServiceResult<&Incident> {
        self.incidents.get(id).ok_or_else(|| ServiceError::not_found("incident", id))
    }

    pub fn user(&self, id: &EntityId) -> ServiceResult<&User> {
        self.users.get(id).ok_or_else(|| ServiceError::not_found("user", id))
    }

    /// Next sequential risk number within a process
    pub fn next_risk_number(&self, process_id: &EntityId) -> u32 {
        self.risks
            .values()
            .filter(|r| r.process_id() == process_id)
            .map(|r| r.number())
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn risk_state(&self, risk_id: &EntityId) -> RiskState {
        match self.evaluations.get(risk_id) {
            None => RiskState::Unevaluated,
            Some(e) if e.residual().is_some() => RiskState::ResidualScored,
            Some(_) => RiskState::Evaluated,
        }
    }

    pub fn controls_of(&self, risk_id: &EntityId) -> Vec<Control> {
        self.controls.values().filter(|c| c.risk_id() == risk_id).cloned().collect()
    }
}

/// Reject an optional reference to a row that does not exist
pub fn require<T>(table: &BTreeMap<EntityId, T>, entity: &'static str, id: Option<&EntityId>) -> ServiceResult<()> {
    match id {
        Some(id) if !table.contains_key(id) => Err(ServiceError::not_found(entity, id)),
        _ => Ok(()),
    }
}

/// Shared handle to the tables
#[derive(Debug, Default)]
pub struct RiskStore {
    tables: Arc<RwLock<Tables>>,
}

impl RiskStore {
    pub fn new() -> Self {
        Self::with_tables(Tables::with_default_catalogs())
    }

    pub fn with_tables(tables: Tables) -> Self {
        Self { tables: Arc::new(RwLock::new(tables)) }
    }

    /// Run a query against a consistent snapshot
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&self.tables.read())
    }

    /// Apply `f` atomically: its changes become visible only if it returns
    /// `Ok`, otherwise they are discarded
    pub fn transact<T, E>(&self, f: impl FnOnce(&mut Tables) -> Result<T, E>) -> Result<T, E> {
        let mut tables = self.tables.write();
        let mut staged = tables.clone();
        let out = f(&mut staged)?;
        *tables = staged;
        Ok(out)
    }

    /// [`transact`](Self::transact) with an engine over the scoring profile
    /// in force. The profile is loaded after the write lock is taken, so a
    /// concurrent configuration swap lands wholly before or after `f`.
    pub fn transact_scored<T>(
        &self,
        settings: &ScoringSettings,
        f: impl FnOnce(&mut Tables, &ScoringEngine<'_>) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        self.transact(|tables| {
            let profile = settings.profile();
            f(tables, &profile.engine())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_transaction_leaves_no_trace() {
        let store = RiskStore::new();
        let result: ServiceResult<()> = store.transact(|t| {
            let process = Process::new("Treasury".into(), ProcessKind::Operational);
            t.processes.insert(process.id.clone(), process);
            Err(ServiceError::validation("abort"))
        });
        assert!(result.is_err());
        assert!(store.read(|t| t.processes.is_empty()));
    }

    #[test]
    fn test_committed_transaction_is_visible() {
        let store = RiskStore::new();
        let id = store
            .transact(|t| -> ServiceResult<EntityId> {
                let process = Process::new("Treasury".into(), ProcessKind::Operational);
                let id = process.id.clone();
                t.processes.insert(id.clone(), process);
                Ok(id)
            })
            .unwrap();
        assert!(store.read(|t| t.process(&id).is_ok()));
    }

    #[test]
    fn test_risk_numbers_are_sequential_per_process() {
        let mut tables = Tables::default();
        let process_a = EntityId::new();
        let process_b = EntityId::new();
        assert_eq!(tables.next_risk_number(&process_a), 1);
        for _ in 0..2 {
            let risk = Risk::create(process_a.clone(), tables.next_risk_number(&process_a), None, RiskDetails::default());
            tables.risks.insert(risk.id().clone(), risk);
        }
        assert_eq!(tables.next_risk_number(&process_a), 3);
        assert_eq!(tables.next_risk_number(&process_b), 1);
    }

    #[test]
    fn test_default_catalogs_loaded() {
        let tables = Tables::with_default_catalogs();
        assert_eq!(tables.frequencies.len(), 5);
        assert_eq!(tables.impact_types.len(), 8);
        assert_eq!(tables.consequences.len(), 2);
    }
}
