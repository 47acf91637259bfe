//! Reference catalogs and the scoring configuration

use chrono::Utc;
use erm_scoring::ScoringConfig;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::scoring::{rescore_all, ScoringSettings};
use crate::application::dto::{
    ImpactTypeInput, MapConfigUpdate, NamedInput, ObjectiveInput, ProcessKindInfo, ScoringConfigView,
};
use crate::domain::aggregates::catalog::{map_axes, risk_levels};
use crate::domain::aggregates::*;
use crate::domain::value_objects::{in_range, required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::RiskStore;

/// Levels must be 1..=5 and each level described once
fn checked_levels(mut levels: Vec<ImpactLevel>) -> ServiceResult<Vec<ImpactLevel>> {
    let mut seen = BTreeSet::new();
    for level in &mut levels {
        in_range("level", level.level, 1, 5)?;
        level.description = required_text("description", &level.description)?;
        if !seen.insert(level.level) {
            return Err(ServiceError::validation(format!("level {} is described twice", level.level)));
        }
    }
    levels.sort_by_key(|l| l.level);
    Ok(levels)
}

fn checked_entries(inputs: Vec<NamedInput>) -> ServiceResult<Vec<CatalogEntry>> {
    inputs
        .into_iter()
        .map(|input| {
            Ok(CatalogEntry {
                id: EntityId::new(),
                name: required_text("name", &input.name)?,
                description: input.description,
            })
        })
        .collect()
}

pub struct CatalogService {
    store: Arc<RiskStore>,
    settings: Arc<ScoringSettings>,
}

impl CatalogService {
    pub fn new(store: Arc<RiskStore>, settings: Arc<ScoringSettings>) -> Self {
        Self { store, settings }
    }

    // ============ Impact types ============

    pub fn impact_types(&self) -> Vec<ImpactType> {
        self.store.read(|tables| tables.impact_types.values().cloned().collect())
    }

    pub fn impact_type(&self, id: &EntityId) -> ServiceResult<ImpactType> {
        self.store.read(|tables| {
            tables
                .impact_types
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("impact type", id))
        })
    }

    pub fn create_impact_type(&self, input: ImpactTypeInput) -> ServiceResult<ImpactType> {
        let impact_type = ImpactType {
            id: EntityId::new(),
            dimension: input.dimension,
            name: required_text("name", &input.name)?,
            description: input.description,
            levels: checked_levels(input.levels)?,
        };
        self.store.transact(|tables| {
            tables.impact_types.insert(impact_type.id.clone(), impact_type.clone());
            Ok(impact_type)
        })
    }

    pub fn update_impact_type(&self, id: &EntityId, input: ImpactTypeInput) -> ServiceResult<ImpactType> {
        let name = required_text("name", &input.name)?;
        let levels = checked_levels(input.levels)?;
        self.store.transact(|tables| {
            let impact_type = tables
                .impact_types
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("impact type", id))?;
            impact_type.dimension = input.dimension;
            impact_type.name = name;
            impact_type.description = input.description;
            impact_type.levels = levels;
            Ok(impact_type.clone())
        })
    }

    /// Swap every level description of a type at once
    pub fn replace_impact_levels(&self, id: &EntityId, levels: Vec<ImpactLevel>) -> ServiceResult<ImpactType> {
        let levels = checked_levels(levels)?;
        self.store.transact(|tables| {
            let impact_type = tables
                .impact_types
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("impact type", id))?;
            impact_type.levels = levels;
            Ok(impact_type.clone())
        })
    }

    pub fn delete_impact_type(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables
                .impact_types
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("impact type", id))
        })
    }

    // ============ Flat lists ============

    pub fn frequencies(&self) -> Vec<Frequency> {
        self.store.read(|tables| tables.frequencies.clone())
    }

    pub fn replace_frequencies(&self, frequencies: Vec<Frequency>) -> ServiceResult<Vec<Frequency>> {
        let mut seen = BTreeSet::new();
        let mut checked = Vec::with_capacity(frequencies.len());
        for frequency in frequencies {
            in_range("level", frequency.level, 1, 5)?;
            if !seen.insert(frequency.level) {
                return Err(ServiceError::validation(format!("frequency level {} listed twice", frequency.level)));
            }
            checked.push(Frequency { name: required_text("name", &frequency.name)?, ..frequency });
        }
        checked.sort_by_key(|f| f.level);
        self.store.transact(|tables| {
            tables.frequencies = checked.clone();
            Ok(checked)
        })
    }

    pub fn sources(&self) -> Vec<CatalogEntry> {
        self.store.read(|tables| tables.sources.clone())
    }

    pub fn replace_sources(&self, inputs: Vec<NamedInput>) -> ServiceResult<Vec<CatalogEntry>> {
        let entries = checked_entries(inputs)?;
        self.store.transact(|tables| {
            tables.sources = entries.clone();
            Ok(entries)
        })
    }

    pub fn origins(&self) -> Vec<CatalogEntry> {
        self.store.read(|tables| tables.origins.clone())
    }

    pub fn replace_origins(&self, inputs: Vec<NamedInput>) -> ServiceResult<Vec<CatalogEntry>> {
        let entries = checked_entries(inputs)?;
        self.store.transact(|tables| {
            tables.origins = entries.clone();
            Ok(entries)
        })
    }

    pub fn consequences(&self) -> Vec<CatalogEntry> {
        self.store.read(|tables| tables.consequences.clone())
    }

    pub fn replace_consequences(&self, inputs: Vec<NamedInput>) -> ServiceResult<Vec<CatalogEntry>> {
        let entries = checked_entries(inputs)?;
        self.store.transact(|tables| {
            tables.consequences = entries.clone();
            Ok(entries)
        })
    }

    // ============ Risk types ============

    pub fn risk_types(&self) -> Vec<RiskType> {
        self.store.read(|tables| tables.risk_types.values().cloned().collect())
    }

    pub fn create_risk_type(&self, input: NamedInput) -> ServiceResult<RiskType> {
        let risk_type = RiskType {
            id: EntityId::new(),
            name: required_text("name", &input.name)?,
            description: input.description,
            subtypes: Vec::new(),
        };
        self.store.transact(|tables| {
            tables.risk_types.insert(risk_type.id.clone(), risk_type.clone());
            Ok(risk_type)
        })
    }

    pub fn update_risk_type(&self, id: &EntityId, input: NamedInput) -> ServiceResult<RiskType> {
        let name = required_text("name", &input.name)?;
        self.store.transact(|tables| {
            let risk_type = tables
                .risk_types
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("risk type", id))?;
            risk_type.name = name;
            risk_type.description = input.description;
            Ok(risk_type.clone())
        })
    }

    /// Refused while a risk is classified under the type
    pub fn delete_risk_type(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            if !tables.risk_types.contains_key(id) {
                return Err(ServiceError::not_found("risk type", id));
            }
            if tables.risks.values().any(|r| r.details().risk_type_id.as_ref() == Some(id)) {
                return Err(ServiceError::Conflict(format!("risk type {id} is still in use")));
            }
            tables.risk_types.remove(id);
            Ok(())
        })
    }

    pub fn add_subtype(&self, type_id: &EntityId, input: NamedInput) -> ServiceResult<RiskSubtype> {
        let subtype = RiskSubtype {
            id: EntityId::new(),
            name: required_text("name", &input.name)?,
            description: input.description,
        };
        self.store.transact(|tables| {
            let risk_type = tables
                .risk_types
                .get_mut(type_id)
                .ok_or_else(|| ServiceError::not_found("risk type", type_id))?;
            risk_type.subtypes.push(subtype.clone());
            Ok(subtype)
        })
    }

    pub fn delete_subtype(&self, type_id: &EntityId, subtype_id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            if tables.risks.values().any(|r| r.details().risk_subtype_id.as_ref() == Some(subtype_id)) {
                return Err(ServiceError::Conflict(format!("risk subtype {subtype_id} is still in use")));
            }
            let risk_type = tables
                .risk_types
                .get_mut(type_id)
                .ok_or_else(|| ServiceError::not_found("risk type", type_id))?;
            let before = risk_type.subtypes.len();
            risk_type.subtypes.retain(|s| &s.id != subtype_id);
            if risk_type.subtypes.len() == before {
                return Err(ServiceError::not_found("risk subtype", subtype_id));
            }
            Ok(())
        })
    }

    // ============ Objectives ============

    pub fn objectives(&self) -> Vec<Objective> {
        self.store.read(|tables| tables.objectives.values().cloned().collect())
    }

    pub fn create_objective(&self, input: ObjectiveInput) -> ServiceResult<Objective> {
        let objective = Objective {
            id: EntityId::new(),
            code: input.code,
            description: required_text("description", &input.description)?,
            active: input.active.unwrap_or(true),
            created_at: Utc::now(),
        };
        self.store.transact(|tables| {
            tables.objectives.insert(objective.id.clone(), objective.clone());
            Ok(objective)
        })
    }

    pub fn update_objective(&self, id: &EntityId, input: ObjectiveInput) -> ServiceResult<Objective> {
        let description = required_text("description", &input.description)?;
        self.store.transact(|tables| {
            let objective = tables
                .objectives
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("objective", id))?;
            objective.code = input.code;
            objective.description = description;
            if let Some(active) = input.active {
                objective.active = active;
            }
            Ok(objective.clone())
        })
    }

    pub fn delete_objective(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            if !tables.objectives.contains_key(id) {
                return Err(ServiceError::not_found("objective", id));
            }
            if tables.risks.values().any(|r| r.details().objective_id.as_ref() == Some(id)) {
                return Err(ServiceError::Conflict(format!("objective {id} is still in use")));
            }
            tables.objectives.remove(id);
            Ok(())
        })
    }

    // ============ Heat map ============

    pub fn map_config(&self) -> MapConfig {
        self.store.read(|tables| tables.map_config.clone())
    }

    pub fn set_map_config(&self, update: MapConfigUpdate) -> ServiceResult<MapConfig> {
        if !update.data.is_object() {
            return Err(ServiceError::validation("map configuration must be a JSON object"));
        }
        self.store.transact(|tables| {
            tables.map_config.set(update.kind, update.data);
            Ok(tables.map_config.clone())
        })
    }

    // ============ Static lists ============

    pub fn process_kinds(&self) -> Vec<ProcessKindInfo> {
        ProcessKind::ALL
            .iter()
            .map(|&kind| ProcessKindInfo { kind, label: kind.label() })
            .collect()
    }

    pub fn risk_levels(&self) -> Vec<RiskLevelInfo> {
        risk_levels()
    }

    pub fn map_axes(&self) -> MapAxes {
        map_axes()
    }

    // ============ Scoring configuration ============

    pub fn scoring_config(&self) -> ScoringConfigView {
        ScoringConfigView {
            version: self.settings.version(),
            config: self.settings.current().as_ref().clone(),
        }
    }

    /// Validate, re-derive every stored evaluation under the new tables,
    /// then swap. Nothing changes if any evaluation no longer scores.
    pub fn replace_scoring_config(&self, config: ScoringConfig) -> ServiceResult<ScoringConfigView> {
        let profile = self.settings.prepare(config)?;
        let config = profile.config().clone();
        let (rescored, version) = self.store.transact(|tables| {
            let rescored = rescore_all(tables, &profile.engine())?;
            Ok::<_, ServiceError>((rescored, self.settings.install(profile)))
        })?;
        tracing::info!(version, rescored, "Scoring configuration replaced");
        Ok(ScoringConfigView { version, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(RiskStore::new()), Arc::new(ScoringSettings::default()))
    }

    #[test]
    fn test_levels_checked_and_sorted() {
        let service = service();
        let id = service.impact_types()[0].id.clone();
        let levels = vec![
            ImpactLevel { level: 2, description: "two".into() },
            ImpactLevel { level: 1, description: "one".into() },
        ];
        let updated = service.replace_impact_levels(&id, levels).unwrap();
        assert_eq!(updated.levels[0].level, 1);

        let duplicate = vec![
            ImpactLevel { level: 3, description: "a".into() },
            ImpactLevel { level: 3, description: "b".into() },
        ];
        assert!(matches!(service.replace_impact_levels(&id, duplicate), Err(ServiceError::Validation(_))));
        assert!(matches!(
            service.replace_impact_levels(&id, vec![ImpactLevel { level: 6, description: "x".into() }]),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_sources_replaced_wholesale() {
        let service = service();
        assert_eq!(service.sources().len(), 5);
        service
            .replace_sources(vec![NamedInput { name: "Vendors".into(), description: None }])
            .unwrap();
        let sources = service.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "Vendors");
    }

    #[test]
    fn test_subtype_lifecycle() {
        let service = service();
        let risk_type = service
            .create_risk_type(NamedInput { name: "Operational".into(), description: None })
            .unwrap();
        let subtype = service
            .add_subtype(&risk_type.id, NamedInput { name: "Fraud".into(), description: None })
            .unwrap();
        assert_eq!(service.risk_types()[0].subtypes.len(), 1);
        service.delete_subtype(&risk_type.id, &subtype.id).unwrap();
        assert!(matches!(
            service.delete_subtype(&risk_type.id, &subtype.id),
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_map_config_requires_object() {
        let service = service();
        let bad = MapConfigUpdate { kind: MapKind::Inherent, data: serde_json::json!([1, 2]) };
        assert!(matches!(service.set_map_config(bad), Err(ServiceError::Validation(_))));
        let good = MapConfigUpdate { kind: MapKind::Tolerance, data: serde_json::json!({"max": 12}) };
        assert_eq!(service.set_map_config(good).unwrap().tolerance["max"], 12);
    }

    #[test]
    fn test_scoring_config_swap_bumps_version() {
        let service = service();
        assert_eq!(service.scoring_config().version, 1);
        let mut config = ScoringConfig::default();
        config.bands.raw.high_max = 18.0;
        let view = service.replace_scoring_config(config).unwrap();
        assert_eq!(view.version, 2);
        assert_eq!(service.scoring_config().config.bands.raw.high_max, 18.0);

        let mut invalid = ScoringConfig::default();
        invalid.grid_tolerance = 0.9;
        assert!(service.replace_scoring_config(invalid).is_err());
        assert_eq!(service.scoring_config().version, 2);
    }
}
