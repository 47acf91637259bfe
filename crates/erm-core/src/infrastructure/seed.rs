//! Demo register for local runs
//!
//! Built through the public services so the seeded rows obey the same rules
//! as anything a client creates.

use chrono::{Duration, Utc};
use erm_scoring::{ControlAssessment, EvaluationMode, ImpactDimension, ImpactScores, ThreeFactorScores};

use crate::application::dto::*;
use crate::application::services::ErmServices;
use crate::domain::aggregates::*;
use crate::error::ServiceResult;

/// Counts of what [`seed_demo`] created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub processes: usize,
    pub risks: usize,
    pub controls: usize,
    pub plans: usize,
    pub incidents: usize,
}

fn control(description: &str, design: f64, execution: f64, robustness: f64) -> ServiceResult<NewControl> {
    Ok(NewControl {
        description: description.to_string(),
        kind: ControlKind::Preventive,
        responsible: Some("Treasury lead".to_string()),
        frequency: Some("Daily".to_string()),
        assessment: ControlAssessment::ThreeFactor(ThreeFactorScores::new(design, execution, robustness)?),
    })
}

pub fn seed_demo(services: &ErmServices) -> ServiceResult<SeedSummary> {
    let org = &services.organization;
    let area = org.create_area(AreaInput {
        name: "Finance".into(),
        description: Some("Corporate finance".into()),
        director: Some("CFO".into()),
    })?;
    let treasury = org.create_management(ManagementInput {
        name: "Treasury".into(),
        acronym: "TRE".into(),
        description: None,
    })?;
    let position = org.create_position(PositionInput { name: "Risk analyst".into(), description: None })?;
    let analyst = org.create_user(CreateUser {
        name: "Demo Analyst".into(),
        email: "analyst@example.com".into(),
        role: UserRole::Analyst,
        position_id: Some(position.id),
        area_id: Some(area.id.clone()),
    })?;

    let payments = services.processes.create(CreateProcess {
        name: "Payments".into(),
        description: Some("Outgoing supplier and payroll payments".into()),
        objective: Some("Pay on time and only what is owed".into()),
        kind: ProcessKind::Operational,
        area_id: Some(area.id),
        management_id: Some(treasury.id.clone()),
        owner_id: Some(analyst.id.clone()),
    })?;
    services.processes.add_owner(&payments.id, AssignOwner { user_id: analyst.id })?;
    for (kind, description) in [
        (DofaKind::Strength, "Dual approval already enforced for large amounts"),
        (DofaKind::Weakness, "Manual vendor master data changes"),
        (DofaKind::Opportunity, "Bank API supports payee confirmation"),
        (DofaKind::Threat, "Business email compromise campaigns"),
    ] {
        services.processes.add_dofa(&payments.id, NewDofaItem { kind, description: description.into() })?;
    }

    let impacts = ImpactScores::from_pairs(&ImpactDimension::OPERATIONAL, &[5, 2, 1, 5, 3, 4, 2]);
    let fraud = services.risks.create(CreateRisk {
        process_id: payments.id.clone(),
        description: "Payment released to a fraudulent beneficiary".into(),
        classification: RiskClassification::Negative,
        category: Some("Fraud".into()),
        zone: Some("Back office".into()),
        risk_type_id: None,
        risk_subtype_id: None,
        objective_id: None,
        management_id: Some(treasury.id.clone()),
        source: Some("People".into()),
        origin: Some("External".into()),
        evaluation: Some(EvaluateRisk {
            mode: EvaluationMode::AverageImpact,
            probability: 4,
            impacts,
            evaluated_by: Some("seed".into()),
        }),
        causes: vec![NewCause {
            description: "Beneficiary bank details changed by email request".into(),
            source: Some("People".into()),
            frequency: Some("Possible".into()),
            selected: true,
            treatment: Some(CauseTreatment::Both),
            controls: vec![control("Call-back verification of bank detail changes", 3.0, 4.0, 3.0)?],
        }],
        controls: Vec::new(),
    })?;

    let delay = services.risks.create(CreateRisk {
        process_id: payments.id.clone(),
        description: "Payroll run delayed past the legal deadline".into(),
        classification: RiskClassification::Negative,
        category: Some("Operational".into()),
        zone: None,
        risk_type_id: None,
        risk_subtype_id: None,
        objective_id: None,
        management_id: Some(treasury.id),
        source: Some("Process".into()),
        origin: Some("Internal".into()),
        evaluation: None,
        causes: Vec::new(),
        controls: Vec::new(),
    })?;

    let today = Utc::now().date_naive();
    services.plans.create(CreatePlan {
        origin: PlanOrigin::Preventive { risk_id: fraud.risk.id().clone() },
        name: Some("Payee confirmation".into()),
        description: "Enable payee name confirmation on the bank API".into(),
        objective: None,
        responsible: Some("Treasury lead".into()),
        start_date: Some(today),
        end_date: Some(today + Duration::days(60)),
        scheduled_date: Some(today + Duration::days(45)),
        executed_date: None,
        status: Some(PlanStatus::InProgress),
        priority: Some(2),
        budget: None,
        progress: Some(20),
        notes: None,
    })?;

    let incident = services.incidents.create(CreateIncident {
        code: None,
        title: "Supplier invoice paid twice".into(),
        description: None,
        risk_id: Some(delay.risk.id().clone()),
        process_id: Some(payments.id),
        responsible: None,
        status: Some(IncidentStatus::UnderAnalysis),
        occurred_on: Some(today - Duration::days(3)),
        reported_on: Some(today - Duration::days(2)),
        resolved_on: None,
        reported_by: Some("Accounts payable".into()),
        corrective_actions: None,
        impacts: [(ImpactDimension::Economic, 3), (ImpactDimension::Reputational, 1)].into_iter().collect(),
    })?;
    services.plans.create(CreatePlan {
        origin: PlanOrigin::Reactive { incident_id: incident.id },
        name: None,
        description: "Recover the duplicate payment".into(),
        objective: None,
        responsible: None,
        start_date: None,
        end_date: None,
        scheduled_date: Some(today + Duration::days(7)),
        executed_date: None,
        status: None,
        priority: None,
        budget: None,
        progress: None,
        notes: None,
    })?;

    let summary = SeedSummary { processes: 1, risks: 2, controls: 1, plans: 2, incidents: 1 };
    tracing::info!(?summary, "Demo data seeded");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_produces_scored_register() {
        let services = ErmServices::in_memory();
        let summary = seed_demo(&services).unwrap();
        assert_eq!(summary.risks, 2);

        let stats = services.risks.statistics(None);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.residual_scored, 1);
        assert_eq!(stats.unevaluated, 1);
        assert_eq!(services.risks.map_points(None).len(), 1);
    }
}
