//! Scoring settings and residual recomputation

use arc_swap::ArcSwap;
use erm_scoring::{ControlScorer, ScoringConfig, ScoringEngine, WeightedControlScorer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::value_objects::EntityId;
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::Tables;

/// A configuration and the control scorer that goes with it. Swapped as one
/// unit so an engine never pairs tables with a stale scorer.
pub struct ScoringProfile {
    config: Arc<ScoringConfig>,
    scorer: Arc<dyn ControlScorer>,
}

impl ScoringProfile {
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn scorer(&self) -> &dyn ControlScorer {
        self.scorer.as_ref()
    }

    pub fn engine(&self) -> ScoringEngine<'_> {
        ScoringEngine::new(&self.config, self.scorer.as_ref())
    }
}

/// Hot-swappable scoring configuration
///
/// Swaps happen only inside a store transaction, and scored writes load the
/// profile inside theirs, so both serialize on the store's write lock.
pub struct ScoringSettings {
    profile: ArcSwap<ScoringProfile>,
    /// Injected scorer, kept across configuration swaps
    custom_scorer: Option<Arc<dyn ControlScorer>>,
    version: AtomicU64,
}

impl ScoringSettings {
    /// Six-factor controls are scored with the configured weights
    pub fn new(config: ScoringConfig) -> ServiceResult<Self> {
        Self::build(config, None)
    }

    /// Six-factor controls are scored by `scorer` whatever the weights say
    pub fn with_scorer(config: ScoringConfig, scorer: Arc<dyn ControlScorer>) -> ServiceResult<Self> {
        Self::build(config, Some(scorer))
    }

    fn build(config: ScoringConfig, custom_scorer: Option<Arc<dyn ControlScorer>>) -> ServiceResult<Self> {
        let profile = prepare_profile(config, custom_scorer.as_ref())?;
        Ok(Self {
            profile: ArcSwap::from_pointee(profile),
            custom_scorer,
            version: AtomicU64::new(1),
        })
    }

    pub fn current(&self) -> Arc<ScoringConfig> {
        Arc::clone(&self.profile.load().config)
    }

    pub fn profile(&self) -> Arc<ScoringProfile> {
        self.profile.load_full()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Validate `config` and pair it with its scorer, without installing it
    pub fn prepare(&self, config: ScoringConfig) -> ServiceResult<ScoringProfile> {
        prepare_profile(config, self.custom_scorer.as_ref())
    }

    /// Install a prepared profile. Callers hold the store's write lock.
    pub(crate) fn install(&self, profile: ScoringProfile) -> u64 {
        self.profile.store(Arc::new(profile));
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }
}

fn prepare_profile(config: ScoringConfig, custom: Option<&Arc<dyn ControlScorer>>) -> ServiceResult<ScoringProfile> {
    config.validate()?;
    let scorer: Arc<dyn ControlScorer> = match custom {
        Some(scorer) => Arc::clone(scorer),
        None => Arc::new(config.scorer()?),
    };
    Ok(ScoringProfile { config: Arc::new(config), scorer })
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            profile: ArcSwap::from_pointee(ScoringProfile {
                config: Arc::new(ScoringConfig::default()),
                scorer: Arc::new(WeightedControlScorer::default()),
            }),
            custom_scorer: None,
            version: AtomicU64::new(1),
        }
    }
}

/// Re-derive every control of a risk against its evaluation, then the
/// evaluation's residual fields. Without an evaluation the controls'
/// derived fields are cleared.
pub(crate) fn rescore_risk(tables: &mut Tables, risk_id: &EntityId, engine: &ScoringEngine<'_>) -> ServiceResult<()> {
    let inherent = tables.evaluations.get(risk_id).map(|e| e.assessment().clone());

    let mut effectivenesses = Vec::new();
    for control in tables.controls.values_mut().filter(|c| c.risk_id() == risk_id) {
        control.rescore(inherent.as_ref(), engine)?;
        effectivenesses.extend(control.effectiveness());
    }

    if let (Some(evaluation), Some(inherent)) = (tables.evaluations.get_mut(risk_id), inherent.as_ref()) {
        evaluation.apply_residual(engine.assess_residual(inherent, effectivenesses));
    }
    Ok(())
}

/// Re-derive every evaluation and control, e.g. after the band tables
/// changed. Fails on the first evaluation the engine no longer accepts.
pub(crate) fn rescore_all(tables: &mut Tables, engine: &ScoringEngine<'_>) -> ServiceResult<usize> {
    let risk_ids: Vec<EntityId> = tables.evaluations.keys().cloned().collect();
    for risk_id in &risk_ids {
        if let Some(evaluation) = tables.evaluations.get_mut(risk_id) {
            evaluation.recompute(engine).map_err(|e| {
                ServiceError::Conflict(format!("evaluation of risk {risk_id} is no longer valid: {e}"))
            })?;
        }
        rescore_risk(tables, risk_id, engine)?;
    }
    Ok(risk_ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use erm_scoring::{ControlScore, MitigationAxis, SixFactorScores};

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScoringConfig::default();
        config.grid_tolerance = 0.0;
        assert!(matches!(ScoringSettings::new(config), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_install_bumps_version() {
        let settings = ScoringSettings::default();
        assert_eq!(settings.version(), 1);
        let mut config = ScoringConfig::default();
        config.bands.raw.high_max = 19.0;
        let profile = settings.prepare(config).unwrap();
        assert_eq!(settings.install(profile), 2);
        assert_eq!(settings.current().bands.raw.high_max, 19.0);
    }

    #[test]
    fn test_bad_weights_rejected_at_prepare() {
        let settings = ScoringSettings::default();
        let mut config = ScoringConfig::default();
        config.control_weights.nature = f64::NAN;
        assert!(matches!(settings.prepare(config), Err(ServiceError::Validation(_))));
        assert_eq!(settings.version(), 1);
    }

    struct FlatScorer;

    impl ControlScorer for FlatScorer {
        fn score(&self, _factors: &SixFactorScores) -> ControlScore {
            ControlScore { score: 50.0, effectiveness: 0.5 }
        }
    }

    #[test]
    fn test_injected_scorer_survives_swap() {
        let settings = ScoringSettings::with_scorer(ScoringConfig::default(), Arc::new(FlatScorer)).unwrap();
        let profile = settings.prepare(ScoringConfig::default()).unwrap();
        settings.install(profile);

        let factors = SixFactorScores {
            applicability: 5.0,
            coverage: 5.0,
            ease_of_use: 5.0,
            segregation: 5.0,
            nature: 5.0,
            deviations: 5.0,
            mitigation_percent: 100.0,
            mitigates: MitigationAxis::Both,
        };
        let outcome = settings.profile().scorer().score(&factors);
        assert_eq!(outcome.effectiveness, 0.5);
    }
}
