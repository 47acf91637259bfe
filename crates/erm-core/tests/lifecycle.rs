//! Risk lifecycle across services

use erm_core::application::dto::*;
use erm_core::domain::aggregates::*;
use erm_core::{EntityId, ErmServices, RiskStore, ScoringSettings, ServiceError};
use erm_scoring::{
    ControlAssessment, ControlScore, ControlScorer, EvaluationMode, GridCell, ImpactDimension, ImpactScores,
    MitigationAxis, RiskBand, ScoringConfig, SixFactorScores, ThreeFactorScores, WeightedControlScorer,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn process(services: &ErmServices) -> Process {
    services
        .processes
        .create(CreateProcess {
            name: "Payments".into(),
            description: None,
            objective: None,
            kind: ProcessKind::Operational,
            area_id: None,
            management_id: None,
            owner_id: None,
        })
        .unwrap()
}

fn risk_command(process_id: &EntityId) -> CreateRisk {
    CreateRisk {
        process_id: process_id.clone(),
        description: "Payment released to a fraudulent beneficiary".into(),
        classification: RiskClassification::Negative,
        category: None,
        zone: None,
        risk_type_id: None,
        risk_subtype_id: None,
        objective_id: None,
        management_id: None,
        source: None,
        origin: None,
        evaluation: None,
        causes: Vec::new(),
        controls: Vec::new(),
    }
}

fn evaluation() -> EvaluateRisk {
    EvaluateRisk {
        mode: EvaluationMode::AverageImpact,
        probability: 4,
        impacts: ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5, 2, 1, 5, 3, 4, 2]),
        evaluated_by: None,
    }
}

fn control() -> NewControl {
    three_factor_control(3.0, 4.0, 3.0)
}

fn three_factor_control(design: f64, execution: f64, robustness: f64) -> NewControl {
    NewControl {
        description: "Call-back verification".into(),
        kind: ControlKind::Preventive,
        responsible: None,
        frequency: None,
        assessment: ControlAssessment::ThreeFactor(ThreeFactorScores::new(design, execution, robustness).unwrap()),
    }
}

/// All fives at probability 4: inherent 20, 80 % of the maximum
fn critical_evaluation() -> EvaluateRisk {
    EvaluateRisk {
        impacts: ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5; 7]),
        ..evaluation()
    }
}

#[test]
fn test_state_machine_round_trip() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let risk = services.risks.create(risk_command(&process.id)).unwrap();
    let id = risk.risk.id().clone();
    assert_eq!(risk.state, RiskState::Unevaluated);
    assert_eq!(risk.risk.code(), "1R");

    let evaluated = services.evaluations.evaluate(&id, evaluation()).unwrap();
    assert!((evaluated.inherent_risk() - 12.5714).abs() < 1e-3);
    assert_eq!(evaluated.risk_level(), RiskBand::High);
    assert_eq!(services.evaluations.state(&id).unwrap(), RiskState::Evaluated);

    let scored = services.controls.create(ControlTarget::Risk(id.clone()), control()).unwrap();
    assert!((scored.effectiveness().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(services.evaluations.state(&id).unwrap(), RiskState::ResidualScored);
    let residual = services.evaluations.get_by_risk(&id).unwrap().residual().cloned().unwrap();
    assert!(residual.residual_risk < evaluated.inherent_risk());

    services.controls.delete(scored.id()).unwrap();
    assert_eq!(services.evaluations.state(&id).unwrap(), RiskState::Evaluated);
    assert!(services.evaluations.get_by_risk(&id).unwrap().residual().is_none());
}

#[test]
fn test_control_requires_evaluation() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let risk = services.risks.create(risk_command(&process.id)).unwrap();

    let err = services
        .controls
        .create(ControlTarget::Risk(risk.risk.id().clone()), control())
        .unwrap_err();
    assert!(matches!(err, ServiceError::PreconditionNotMet(_)));
    assert!(services.controls.list_by_risk(risk.risk.id()).unwrap().is_empty());
}

#[test]
fn test_nested_create_is_atomic() {
    let services = ErmServices::in_memory();
    let process = process(&services);

    // Nested control without an evaluation aborts the whole create
    let command = CreateRisk {
        causes: vec![NewCause {
            description: "Email request".into(),
            source: None,
            frequency: None,
            selected: true,
            treatment: None,
            controls: vec![control()],
        }],
        ..risk_command(&process.id)
    };
    assert!(services.risks.create(command).is_err());
    assert_eq!(services.risks.statistics(None).total, 0);
    assert!(services.store().read(|t| t.causes.is_empty()));

    let command = CreateRisk {
        evaluation: Some(evaluation()),
        causes: vec![NewCause {
            description: "Email request".into(),
            source: None,
            frequency: None,
            selected: true,
            treatment: None,
            controls: vec![control()],
        }],
        ..risk_command(&process.id)
    };
    let view = services.risks.create(command).unwrap();
    assert_eq!(view.state, RiskState::ResidualScored);
    assert_eq!(view.causes[0].controls.len(), 1);
}

#[test]
fn test_evaluation_delete_clears_control_outcomes() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let view = services
        .risks
        .create(CreateRisk { evaluation: Some(evaluation()), controls: vec![control()], ..risk_command(&process.id) })
        .unwrap();
    let id = view.risk.id().clone();

    services.evaluations.delete(&id).unwrap();
    assert_eq!(services.evaluations.state(&id).unwrap(), RiskState::Unevaluated);
    let controls = services.controls.list_by_risk(&id).unwrap();
    assert_eq!(controls.len(), 1);
    assert!(controls[0].outcome().is_none());

    services.evaluations.evaluate(&id, evaluation()).unwrap();
    assert_eq!(services.evaluations.state(&id).unwrap(), RiskState::ResidualScored);
    assert!(services.controls.list_by_risk(&id).unwrap()[0].outcome().is_some());
}

#[test]
fn test_risk_delete_cascades() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let view = services
        .risks
        .create(CreateRisk { evaluation: Some(evaluation()), controls: vec![control()], ..risk_command(&process.id) })
        .unwrap();
    let id = view.risk.id().clone();
    services
        .priorities
        .upsert(&id, UpsertPriority { final_rating: Some(12.0), response: RiskResponse::Mitigate, responsible: None, score: None })
        .unwrap();
    let incident = services
        .incidents
        .create(CreateIncident {
            code: Some("INC-1".into()),
            title: "Duplicate payment".into(),
            description: None,
            risk_id: Some(id.clone()),
            process_id: None,
            responsible: None,
            status: None,
            occurred_on: None,
            reported_on: None,
            resolved_on: None,
            reported_by: None,
            corrective_actions: None,
            impacts: Default::default(),
        })
        .unwrap();

    services.risks.delete(&id).unwrap();
    assert!(matches!(services.risks.get(&id), Err(ServiceError::NotFound { .. })));
    services.store().read(|t| {
        assert!(t.evaluations.is_empty());
        assert!(t.controls.is_empty());
        assert!(t.priorities.is_empty());
    });
    assert_eq!(services.incidents.get(&incident.id).unwrap().risk_id, None);
}

#[test]
fn test_scoring_config_swap_rescores_register() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let view = services
        .risks
        .create(CreateRisk { evaluation: Some(evaluation()), ..risk_command(&process.id) })
        .unwrap();
    assert_eq!(view.evaluation.as_ref().map(|e| e.risk_level()), Some(RiskBand::High));

    // 50.29 % falls in MEDIUM once the medium band reaches 60 %
    let mut config = services.settings().current().as_ref().clone();
    config.bands.percent.medium_max = 60.0;
    services.catalogs.replace_scoring_config(config).unwrap();

    let evaluation = services.evaluations.get_by_risk(view.risk.id()).unwrap();
    assert_eq!(evaluation.risk_level(), RiskBand::Medium);
}

#[test]
fn test_risk_codes_use_management_acronym() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let management = services
        .organization
        .create_management(ManagementInput { name: "Treasury".into(), acronym: "TRE".into(), description: None })
        .unwrap();
    services.risks.create(risk_command(&process.id)).unwrap();
    let second = services
        .risks
        .create(CreateRisk { management_id: Some(management.id), ..risk_command(&process.id) })
        .unwrap();
    assert_eq!(second.risk.number(), 2);
    assert_eq!(second.risk.code(), "2TRE");
}

#[test]
fn test_most_effective_control_sets_residual() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let view = services
        .risks
        .create(CreateRisk { evaluation: Some(critical_evaluation()), ..risk_command(&process.id) })
        .unwrap();
    let id = view.risk.id().clone();
    assert_eq!(view.evaluation.as_ref().map(|e| e.inherent_risk()), Some(20.0));

    let target = || ControlTarget::Risk(id.clone());
    services.controls.create(target(), three_factor_control(1.0, 1.0, 1.0)).unwrap();
    let best = services.controls.create(target(), three_factor_control(5.0, 5.0, 4.0)).unwrap();
    services.controls.create(target(), three_factor_control(2.0, 2.0, 2.0)).unwrap();

    // 20 × (1 − 14/15)
    let residual = services.evaluations.get_by_risk(&id).unwrap().residual().cloned().unwrap();
    assert!((residual.residual_risk - 1.3333).abs() < 1e-3);
    assert_eq!((residual.residual_probability, residual.residual_impact), (1, 2));
    assert_eq!(residual.residual_level, RiskBand::Low);

    // The weakest controls alone would leave 20 × 0.6 = 12
    let weaker = services
        .controls
        .update(
            best.id(),
            UpdateControl {
                assessment: Some(ControlAssessment::ThreeFactor(ThreeFactorScores::new(3.0, 3.0, 3.0).unwrap())),
                ..UpdateControl::default()
            },
        )
        .unwrap();
    assert!((weaker.effectiveness().unwrap() - 0.6).abs() < 1e-9);
    let residual = services.evaluations.get_by_risk(&id).unwrap().residual().cloned().unwrap();
    assert!((residual.residual_risk - 8.0).abs() < 1e-9);
    assert_eq!((residual.residual_probability, residual.residual_impact), (2, 4));
    assert_eq!(residual.residual_level, RiskBand::Medium);
}

#[test]
fn test_two_by_two_cell_is_raw_low() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let risk = services.risks.create(risk_command(&process.id)).unwrap();

    let evaluated = services
        .evaluations
        .evaluate(
            risk.risk.id(),
            EvaluateRisk {
                mode: EvaluationMode::MaximumImpact,
                probability: 2,
                impacts: ImpactScores::from_pairs(&ImpactDimension::INFORMATION_SECURITY, &[2, 1, 1, 1, 2, 1, 1, 1]),
                evaluated_by: None,
            },
        )
        .unwrap();
    assert_eq!(evaluated.inherent_risk(), 3.99);
    assert_eq!(evaluated.risk_level(), RiskBand::Low);
    assert_eq!(evaluated.assessment().inherent_cell, GridCell::new(2, 2));
}

/// Blocks the first six-factor score until the test thread is ready
struct GatedScorer {
    armed: AtomicBool,
    gate: Arc<Barrier>,
}

impl ControlScorer for GatedScorer {
    fn score(&self, factors: &SixFactorScores) -> ControlScore {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.gate.wait();
            thread::sleep(Duration::from_millis(100));
        }
        WeightedControlScorer::default().score(factors)
    }
}

#[test]
fn test_evaluation_during_config_swap_uses_new_tables() {
    let gate = Arc::new(Barrier::new(2));
    let scorer = Arc::new(GatedScorer { armed: AtomicBool::new(false), gate: Arc::clone(&gate) });
    let settings = ScoringSettings::with_scorer(ScoringConfig::default(), scorer.clone()).unwrap();
    let services = ErmServices::new(Arc::new(RiskStore::new()), Arc::new(settings));
    let process = process(&services);

    let six_factor = NewControl {
        assessment: ControlAssessment::SixFactor(SixFactorScores {
            applicability: 4.0,
            coverage: 4.0,
            ease_of_use: 4.0,
            segregation: 4.0,
            nature: 4.0,
            deviations: 4.0,
            mitigation_percent: 100.0,
            mitigates: MitigationAxis::Both,
        }),
        ..control()
    };
    services
        .risks
        .create(CreateRisk { evaluation: Some(evaluation()), controls: vec![six_factor], ..risk_command(&process.id) })
        .unwrap();
    let pending = services.risks.create(risk_command(&process.id)).unwrap();

    let mut config = ScoringConfig::default();
    config.bands.percent.medium_max = 60.0;
    scorer.armed.store(true, Ordering::SeqCst);

    let evaluated = thread::scope(|scope| {
        // Holds the write lock while rescoring stalls on the gate
        let swap = scope.spawn(|| services.catalogs.replace_scoring_config(config));
        gate.wait();
        let evaluated = services.evaluations.evaluate(pending.risk.id(), evaluation()).unwrap();
        swap.join().unwrap().unwrap();
        evaluated
    });

    assert_eq!(services.settings().version(), 2);
    // 50.29 % is HIGH under the old tables and MEDIUM under the new ones
    assert_eq!(evaluated.risk_level(), RiskBand::Medium);
    for risk in services.risks.list(&RiskFilter::default()).items {
        assert_eq!(risk.risk_level, Some(RiskBand::Medium));
    }
}

#[test]
fn test_update_can_clear_optional_fields() {
    let services = ErmServices::in_memory();
    let process = process(&services);
    let view = services
        .risks
        .create(CreateRisk {
            zone: Some("North".into()),
            category: Some("Fraud".into()),
            evaluation: Some(evaluation()),
            controls: vec![NewControl { responsible: Some("Treasury desk".into()), ..control() }],
            ..risk_command(&process.id)
        })
        .unwrap();
    let id = view.risk.id().clone();

    let updated = services
        .risks
        .update(&id, UpdateRisk { zone: Some(None), ..UpdateRisk::default() })
        .unwrap();
    assert_eq!(updated.risk.details().zone, None);
    assert_eq!(updated.risk.details().category.as_deref(), Some("Fraud"));

    let control_id = view.controls[0].id().clone();
    let cleared = services
        .controls
        .update(&control_id, UpdateControl { responsible: Some(None), ..UpdateControl::default() })
        .unwrap();
    assert_eq!(cleared.details().responsible, None);
}
