//! Application services
//!
//! Every service shares one [`RiskStore`]. Services that derive scores also
//! share the [`ScoringSettings`] so a configuration swap reaches all of them.

pub mod catalogs;
pub mod causes;
pub mod controls;
pub mod evaluations;
pub mod incidents;
pub mod organization;
pub mod plans;
pub mod priorities;
pub mod processes;
pub mod risks;
pub mod scoring;
pub mod utilities;

use std::sync::Arc;

pub use catalogs::CatalogService;
pub use causes::CauseService;
pub use controls::ControlService;
pub use evaluations::EvaluationService;
pub use incidents::IncidentService;
pub use organization::OrganizationService;
pub use plans::ActionPlanService;
pub use priorities::PriorityService;
pub use processes::ProcessService;
pub use risks::RiskService;
pub use scoring::{ScoringProfile, ScoringSettings};
pub use utilities::UtilityService;

use crate::infrastructure::persistence::RiskStore;

/// All services wired to one store
pub struct ErmServices {
    pub processes: ProcessService,
    pub organization: OrganizationService,
    pub risks: RiskService,
    pub evaluations: EvaluationService,
    pub causes: CauseService,
    pub controls: ControlService,
    pub priorities: PriorityService,
    pub plans: ActionPlanService,
    pub incidents: IncidentService,
    pub catalogs: CatalogService,
    pub utilities: UtilityService,
    store: Arc<RiskStore>,
    settings: Arc<ScoringSettings>,
}

impl ErmServices {
    pub fn new(store: Arc<RiskStore>, settings: Arc<ScoringSettings>) -> Self {
        Self {
            processes: ProcessService::new(store.clone()),
            organization: OrganizationService::new(store.clone()),
            risks: RiskService::new(store.clone(), settings.clone()),
            evaluations: EvaluationService::new(store.clone(), settings.clone()),
            causes: CauseService::new(store.clone(), settings.clone()),
            controls: ControlService::new(store.clone(), settings.clone()),
            priorities: PriorityService::new(store.clone()),
            plans: ActionPlanService::new(store.clone()),
            incidents: IncidentService::new(store.clone()),
            catalogs: CatalogService::new(store.clone(), settings.clone()),
            utilities: UtilityService::new(store.clone()),
            store,
            settings,
        }
    }

    /// Empty register with stock catalogs and default scoring
    pub fn in_memory() -> Self {
        Self::new(Arc::new(RiskStore::new()), Arc::new(ScoringSettings::default()))
    }

    pub fn store(&self) -> &Arc<RiskStore> {
        &self.store
    }

    pub fn settings(&self) -> &Arc<ScoringSettings> {
        &self.settings
    }
}
