//! Process catalog and process analysis (DOFA, regulations, context,
//! benchmarking, owners)

use chrono::Utc;
use std::sync::Arc;

use crate::application::dto::{
    AssignOwner, BulkUpdateProcesses, CreateProcess, NewBenchmark, NewContextItem, NewDofaItem, NewRegulation,
    ProcessView, UpdateProcess,
};
use crate::domain::aggregates::*;
use crate::domain::value_objects::{in_range, required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{require, RiskStore, Tables};

fn check_references(
    tables: &Tables,
    area_id: Option<&EntityId>,
    management_id: Option<&EntityId>,
    owner_id: Option<&EntityId>,
) -> ServiceResult<()> {
    require(&tables.areas, "area", area_id)?;
    require(&tables.managements, "management", management_id)?;
    require(&tables.users, "user", owner_id)
}

fn apply_update(tables: &mut Tables, id: &EntityId, changes: &UpdateProcess) -> ServiceResult<()> {
    check_references(
        tables,
        changes.area_id.as_ref().and_then(Option::as_ref),
        changes.management_id.as_ref().and_then(Option::as_ref),
        changes.owner_id.as_ref().and_then(Option::as_ref),
    )?;
    let process = tables.processes.get_mut(id).ok_or_else(|| ServiceError::not_found("process", id))?;
    if let Some(name) = &changes.name {
        process.name = required_text("name", name)?;
    }
    if let Some(description) = &changes.description {
        process.description = description.clone();
    }
    if let Some(objective) = &changes.objective {
        process.objective = objective.clone();
    }
    if let Some(kind) = changes.kind {
        process.kind = kind;
    }
    if let Some(area_id) = &changes.area_id {
        process.area_id = area_id.clone();
    }
    if let Some(management_id) = &changes.management_id {
        process.management_id = management_id.clone();
    }
    if let Some(owner_id) = &changes.owner_id {
        process.owner_id = owner_id.clone();
    }
    if let Some(active) = changes.active {
        process.active = active;
    }
    process.touch();
    let change = ProcessChange::record(process, ChangeAction::Updated, changed_fields(changes));
    tables.process_history.push(change);
    Ok(())
}

fn changed_fields(changes: &UpdateProcess) -> Vec<String> {
    [
        ("name", changes.name.is_some()),
        ("description", changes.description.is_some()),
        ("objective", changes.objective.is_some()),
        ("kind", changes.kind.is_some()),
        ("area_id", changes.area_id.is_some()),
        ("management_id", changes.management_id.is_some()),
        ("owner_id", changes.owner_id.is_some()),
        ("active", changes.active.is_some()),
    ]
    .into_iter()
    .filter(|(_, set)| *set)
    .map(|(field, _)| field.to_string())
    .collect()
}

fn context_groups<'a>(items: impl Iterator<Item = &'a ContextItem>) -> ContextGroups {
    let mut groups = ContextGroups::default();
    for item in items {
        match item.kind {
            ContextKind::Internal => groups.internal.push(item.clone()),
            ContextKind::External => groups.external.push(item.clone()),
        }
    }
    groups
}

fn process_view(tables: &Tables, process: &Process) -> ProcessView {
    let id = &process.id;
    ProcessView {
        process: process.clone(),
        dofa: tables.dofa.values().filter(|d| &d.process_id == id).cloned().collect(),
        regulations: tables.regulations.values().filter(|r| &r.process_id == id).cloned().collect(),
        context: context_groups(tables.context.values().filter(|c| &c.process_id == id)),
        benchmarking: tables.benchmarking.values().filter(|b| &b.process_id == id).cloned().collect(),
        owners: tables
            .process_owners
            .iter()
            .filter(|o| &o.process_id == id)
            .filter_map(|o| tables.users.get(&o.user_id).cloned())
            .collect(),
        risk_count: tables.risks.values().filter(|r| r.process_id() == id).count(),
    }
}

pub struct ProcessService {
    store: Arc<RiskStore>,
}

impl ProcessService {
    pub fn new(store: Arc<RiskStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, command: CreateProcess) -> ServiceResult<Process> {
        let process = self.store.transact(|tables| {
            check_references(
                tables,
                command.area_id.as_ref(),
                command.management_id.as_ref(),
                command.owner_id.as_ref(),
            )?;
            let mut process = Process::new(required_text("name", &command.name)?, command.kind);
            process.description = command.description;
            process.objective = command.objective;
            process.area_id = command.area_id;
            process.management_id = command.management_id;
            process.owner_id = command.owner_id;
            tables.process_history.push(ProcessChange::record(&process, ChangeAction::Created, Vec::new()));
            tables.processes.insert(process.id.clone(), process.clone());
            Ok::<_, ServiceError>(process)
        })?;
        tracing::info!(process_id = %process.id, name = %process.name, "Process created");
        Ok(process)
    }

    pub fn get(&self, id: &EntityId) -> ServiceResult<ProcessView> {
        self.store.read(|tables| Ok(process_view(tables, tables.process(id)?)))
    }

    /// Sorted by name
    pub fn list(&self, kind: Option<ProcessKind>, active: Option<bool>) -> Vec<Process> {
        self.store.read(|tables| {
            let mut processes: Vec<Process> = tables
                .processes
                .values()
                .filter(|p| kind.map_or(true, |k| p.kind == k))
                .filter(|p| active.map_or(true, |a| p.active == a))
                .cloned()
                .collect();
            processes.sort_by(|a, b| a.name.cmp(&b.name));
            processes
        })
    }

    pub fn update(&self, id: &EntityId, changes: UpdateProcess) -> ServiceResult<Process> {
        self.store.transact(|tables| {
            apply_update(tables, id, &changes)?;
            tables.process(id).cloned()
        })
    }

    /// All-or-nothing: one unknown id rejects the whole batch
    pub fn bulk_update(&self, command: BulkUpdateProcesses) -> ServiceResult<usize> {
        if command.ids.is_empty() {
            return Err(ServiceError::validation("ids must not be empty"));
        }
        let count = self.store.transact(|tables| {
            for id in &command.ids {
                apply_update(tables, id, &command.changes)?;
            }
            Ok::<_, ServiceError>(command.ids.len())
        })?;
        tracing::info!(count, "Processes updated in bulk");
        Ok(count)
    }

    /// Refused while risks still reference the process
    pub fn delete(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            let change = ProcessChange::record(tables.process(id)?, ChangeAction::Deleted, Vec::new());
            let risks = tables.risks.values().filter(|r| r.process_id() == id).count();
            if risks > 0 {
                return Err(ServiceError::Conflict(format!("process {id} still has {risks} risks")));
            }
            tables.processes.remove(id);
            tables.observations.retain(|_, o| &o.process_id != id);
            tables.process_history.push(change);
            tables.dofa.retain(|_, d| &d.process_id != id);
            tables.regulations.retain(|_, r| &r.process_id != id);
            tables.context.retain(|_, c| &c.process_id != id);
            tables.benchmarking.retain(|_, b| &b.process_id != id);
            tables.process_owners.retain(|o| &o.process_id != id);
            for incident in tables.incidents.values_mut() {
                if incident.process_id.as_ref() == Some(id) {
                    incident.process_id = None;
                }
            }
            Ok::<_, ServiceError>(())
        })?;
        tracing::info!(process_id = %id, "Process deleted");
        Ok(())
    }

    /// Copy with a fresh identity, carrying over the DOFA, regulations and
    /// context. Risks are not copied.
    pub fn duplicate(&self, id: &EntityId) -> ServiceResult<ProcessView> {
        let view = self.store.transact(|tables| {
            let copy = tables.process(id)?.duplicate();
            let copy_id = copy.id.clone();
            let now = Utc::now();

            let dofa: Vec<DofaItem> = tables
                .dofa
                .values()
                .filter(|d| &d.process_id == id)
                .map(|d| DofaItem { id: EntityId::new(), process_id: copy_id.clone(), created_at: now, ..d.clone() })
                .collect();
            let regulations: Vec<Regulation> = tables
                .regulations
                .values()
                .filter(|r| &r.process_id == id)
                .map(|r| Regulation { id: EntityId::new(), process_id: copy_id.clone(), created_at: now, ..r.clone() })
                .collect();
            let context: Vec<ContextItem> = tables
                .context
                .values()
                .filter(|c| &c.process_id == id)
                .map(|c| ContextItem { id: EntityId::new(), process_id: copy_id.clone(), created_at: now, ..c.clone() })
                .collect();

            tables.dofa.extend(dofa.into_iter().map(|d| (d.id.clone(), d)));
            tables.regulations.extend(regulations.into_iter().map(|r| (r.id.clone(), r)));
            tables.context.extend(context.into_iter().map(|c| (c.id.clone(), c)));
            tables.process_history.push(ProcessChange::record(&copy, ChangeAction::Duplicated, Vec::new()));
            tables.processes.insert(copy_id.clone(), copy);

            Ok::<_, ServiceError>(process_view(tables, tables.process(&copy_id)?))
        })?;
        tracing::info!(source_id = %id, process_id = %view.process.id, "Process duplicated");
        Ok(view)
    }

    // ============ DOFA ============

    pub fn add_dofa(&self, process_id: &EntityId, command: NewDofaItem) -> ServiceResult<DofaItem> {
        self.store.transact(|tables| {
            tables.process(process_id)?;
            let item = DofaItem {
                id: EntityId::new(),
                process_id: process_id.clone(),
                kind: command.kind,
                description: required_text("description", &command.description)?,
                created_at: Utc::now(),
            };
            tables.dofa.insert(item.id.clone(), item.clone());
            Ok(item)
        })
    }

    pub fn dofa(&self, process_id: &EntityId) -> ServiceResult<DofaMatrix> {
        self.store.read(|tables| {
            tables.process(process_id)?;
            Ok(tables.dofa.values().filter(|d| &d.process_id == process_id).cloned().collect())
        })
    }

    pub fn delete_dofa(&self, item_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables.dofa.remove(item_id).map(|_| ()).ok_or_else(|| ServiceError::not_found("dofa item", item_id))
        })
    }

    // ============ Regulations ============

    pub fn add_regulation(&self, process_id: &EntityId, command: NewRegulation) -> ServiceResult<Regulation> {
        self.store.transact(|tables| {
            tables.process(process_id)?;
            let regulation = Regulation {
                id: EntityId::new(),
                process_id: process_id.clone(),
                name: required_text("name", &command.name)?,
                regulator: command.regulator,
                status: command.status,
                compliance: command.compliance,
                sanctions: command.sanctions,
                comments: command.comments,
                created_at: Utc::now(),
            };
            tables.regulations.insert(regulation.id.clone(), regulation.clone());
            Ok(regulation)
        })
    }

    pub fn regulations(&self, process_id: &EntityId) -> ServiceResult<Vec<Regulation>> {
        self.store.read(|tables| {
            tables.process(process_id)?;
            Ok(tables.regulations.values().filter(|r| &r.process_id == process_id).cloned().collect())
        })
    }

    pub fn delete_regulation(&self, regulation_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .regulations
                .remove(regulation_id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("regulation", regulation_id))
        })
    }

    // ============ Context ============

    pub fn add_context(&self, process_id: &EntityId, command: NewContextItem) -> ServiceResult<ContextItem> {
        self.store.transact(|tables| {
            tables.process(process_id)?;
            let item = ContextItem {
                id: EntityId::new(),
                process_id: process_id.clone(),
                kind: command.kind,
                description: required_text("description", &command.description)?,
                created_at: Utc::now(),
            };
            tables.context.insert(item.id.clone(), item.clone());
            Ok(item)
        })
    }

    pub fn context(&self, process_id: &EntityId) -> ServiceResult<ContextGroups> {
        self.store.read(|tables| {
            tables.process(process_id)?;
            Ok(context_groups(tables.context.values().filter(|c| &c.process_id == process_id)))
        })
    }

    pub fn delete_context(&self, item_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .context
                .remove(item_id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("context item", item_id))
        })
    }

    // ============ Benchmarking ============

    /// Replace the whole benchmarking table of a process
    pub fn replace_benchmarking(
        &self,
        process_id: &EntityId,
        entries: Vec<NewBenchmark>,
    ) -> ServiceResult<Vec<BenchmarkEntry>> {
        self.store.transact(|tables| {
            tables.process(process_id)?;
            let now = Utc::now();
            let mut rows = Vec::with_capacity(entries.len());
            for entry in entries {
                rows.push(BenchmarkEntry {
                    id: EntityId::new(),
                    process_id: process_id.clone(),
                    company: required_text("company", &entry.company)?,
                    risk: required_text("risk", &entry.risk)?,
                    classification: entry.classification,
                    rating: entry.rating.map(|r| in_range("rating", r, 1, 5)).transpose()?,
                    created_at: now,
                });
            }
            tables.benchmarking.retain(|_, b| &b.process_id != process_id);
            tables.benchmarking.extend(rows.iter().map(|b| (b.id.clone(), b.clone())));
            Ok(rows)
        })
    }

    pub fn benchmarking(&self, process_id: &EntityId) -> ServiceResult<Vec<BenchmarkEntry>> {
        self.store.read(|tables| {
            tables.process(process_id)?;
            Ok(tables.benchmarking.values().filter(|b| &b.process_id == process_id).cloned().collect())
        })
    }

    pub fn delete_benchmark(&self, entry_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .benchmarking
                .remove(entry_id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("benchmark entry", entry_id))
        })
    }

    // ============ Owners ============

    pub fn add_owner(&self, process_id: &EntityId, command: AssignOwner) -> ServiceResult<ProcessOwner> {
        self.store.transact(|tables| {
            tables.process(process_id)?;
            tables.user(&command.user_id)?;
            if tables
                .process_owners
                .iter()
                .any(|o| &o.process_id == process_id && o.user_id == command.user_id)
            {
                return Err(ServiceError::Conflict(format!(
                    "user {} already owns process {process_id}",
                    command.user_id
                )));
            }
            let owner = ProcessOwner {
                process_id: process_id.clone(),
                user_id: command.user_id,
                assigned_at: Utc::now(),
            };
            tables.process_owners.push(owner.clone());
            Ok(owner)
        })
    }

    pub fn remove_owner(&self, process_id: &EntityId, user_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            let before = tables.process_owners.len();
            tables
                .process_owners
                .retain(|o| !(&o.process_id == process_id && &o.user_id == user_id));
            if tables.process_owners.len() == before {
                return Err(ServiceError::not_found("process owner", user_id));
            }
            Ok(())
        })
    }

    pub fn owners(&self, process_id: &EntityId) -> ServiceResult<Vec<User>> {
        self.store.read(|tables| Ok(process_view(tables, tables.process(process_id)?).owners))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ProcessService {
        ProcessService::new(Arc::new(RiskStore::new()))
    }

    fn create(service: &ProcessService, name: &str) -> Process {
        service
            .create(CreateProcess {
                name: name.into(),
                description: None,
                objective: None,
                kind: ProcessKind::Operational,
                area_id: None,
                management_id: None,
                owner_id: None,
            })
            .unwrap()
    }

    #[test]
    fn test_duplicate_copies_analysis() {
        let service = service();
        let process = create(&service, "Payments");
        service
            .add_dofa(&process.id, NewDofaItem { kind: DofaKind::Threat, description: "Fraud".into() })
            .unwrap();
        service
            .add_context(&process.id, NewContextItem { kind: ContextKind::External, description: "Regulator".into() })
            .unwrap();

        let copy = service.duplicate(&process.id).unwrap();
        assert_eq!(copy.process.name, "Payments (Copy)");
        assert_eq!(copy.dofa.threats.len(), 1);
        assert_eq!(copy.context.external.len(), 1);
        assert_ne!(copy.dofa.threats[0].id, service.dofa(&process.id).unwrap().threats[0].id);
    }

    #[test]
    fn test_bulk_update_is_atomic() {
        let service = service();
        let a = create(&service, "A");
        let changes = UpdateProcess { active: Some(false), ..Default::default() };

        let err = service
            .bulk_update(BulkUpdateProcesses { ids: vec![a.id.clone(), EntityId::from_string("missing")], changes })
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert!(service.get(&a.id).unwrap().process.active);
    }

    #[test]
    fn test_blank_name_rejected() {
        let service = service();
        let process = create(&service, "Treasury");
        let err = service
            .update(&process.id, UpdateProcess { name: Some("  ".into()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_benchmarking_replaced_wholesale() {
        let service = service();
        let process = create(&service, "Lending");
        let entry = |company: &str| NewBenchmark {
            company: company.into(),
            risk: "Credit default".into(),
            classification: None,
            rating: Some(3),
        };
        service.replace_benchmarking(&process.id, vec![entry("A"), entry("B")]).unwrap();
        service.replace_benchmarking(&process.id, vec![entry("C")]).unwrap();
        let rows = service.benchmarking(&process.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company, "C");
    }
}
