//! Incident aggregate: a materialized risk

use chrono::{DateTime, NaiveDate, Utc};
use erm_scoring::ImpactDimension;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::value_objects::EntityId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Reported,
    UnderAnalysis,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [Self::Reported, Self::UnderAnalysis, Self::Resolved, Self::Closed];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: EntityId,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub risk_id: Option<EntityId>,
    pub process_id: Option<EntityId>,
    pub responsible: Option<String>,
    pub status: IncidentStatus,
    pub occurred_on: Option<NaiveDate>,
    pub reported_on: NaiveDate,
    pub resolved_on: Option<NaiveDate>,
    pub reported_by: Option<String>,
    pub corrective_actions: Option<String>,
    /// Magnitude per dimension once the risk materialized, 0..=5
    pub impacts: BTreeMap<ImpactDimension, u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Code assigned when the reporter leaves it blank
    pub fn generated_code(now: DateTime<Utc>) -> String {
        format!("INC-{}", now.timestamp_millis())
    }

    /// Mean of recorded impact magnitudes, `None` when nothing was recorded
    pub fn impact_mean(&self) -> Option<f64> {
        if self.impacts.is_empty() {
            return None;
        }
        let sum: f64 = self.impacts.values().map(|&v| f64::from(v)).sum();
        Some(sum / self.impacts.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_mean() {
        let now = Utc::now();
        let mut incident = Incident {
            id: EntityId::new(),
            code: Incident::generated_code(now),
            title: "Payment run delayed".into(),
            description: None,
            risk_id: None,
            process_id: None,
            responsible: None,
            status: IncidentStatus::Reported,
            occurred_on: None,
            reported_on: now.date_naive(),
            resolved_on: None,
            reported_by: None,
            corrective_actions: None,
            impacts: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(incident.impact_mean(), None);
        assert!(incident.code.starts_with("INC-"));

        incident.impacts.insert(ImpactDimension::Economic, 4);
        incident.impacts.insert(ImpactDimension::Reputational, 1);
        assert_eq!(incident.impact_mean(), Some(2.5));
    }

    #[test]
    fn test_impacts_keyed_by_dimension_name() {
        let impacts: BTreeMap<ImpactDimension, u8> = serde_json::from_str(r#"{"legal":3}"#).unwrap();
        assert_eq!(impacts.get(&ImpactDimension::Legal), Some(&3));
    }
}
