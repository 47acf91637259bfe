//! Reference catalogs
//!
//! Administrator-maintained lists the rest of the domain refers to:
//! impact types and their level descriptions, cause frequencies, sources,
//! origins, consequences, risk typologies, strategic objectives and the
//! heat-map layout.

use chrono::{DateTime, Utc};
use erm_scoring::{ImpactDimension, RiskBand};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImpactLevel {
    /// 1..=5
    pub level: u8,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactType {
    pub id: EntityId,
    /// Scoring dimension this type rates, if any
    pub dimension: Option<ImpactDimension>,
    pub name: String,
    pub description: Option<String>,
    pub levels: Vec<ImpactLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frequency {
    /// 1..=5
    pub level: u8,
    pub name: String,
    pub description: String,
}

/// Plain named entry (sources, origins, consequences)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
}

impl CatalogEntry {
    pub fn named(name: &str) -> Self {
        Self { id: EntityId::new(), name: name.to_string(), description: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSubtype {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskType {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub subtypes: Vec<RiskSubtype>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: EntityId,
    pub code: Option<String>,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Which heat map a layout document configures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    Inherent,
    Residual,
    Tolerance,
}

/// Free-form layout documents owned by the web client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub inherent: serde_json::Value,
    pub residual: serde_json::Value,
    pub tolerance: serde_json::Value,
}

impl MapConfig {
    pub fn get(&self, kind: MapKind) -> &serde_json::Value {
        match kind {
            MapKind::Inherent => &self.inherent,
            MapKind::Residual => &self.residual,
            MapKind::Tolerance => &self.tolerance,
        }
    }

    pub fn set(&mut self, kind: MapKind, value: serde_json::Value) {
        match kind {
            MapKind::Inherent => self.inherent = value,
            MapKind::Residual => self.residual = value,
            MapKind::Tolerance => self.tolerance = value,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            inherent: serde_json::json!({}),
            residual: serde_json::json!({}),
            tolerance: serde_json::json!({}),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevelInfo {
    pub band: RiskBand,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLevel {
    pub value: u8,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapAxes {
    pub probability: Vec<AxisLevel>,
    pub impact: Vec<AxisLevel>,
}

// ============ Defaults ============

pub fn default_frequencies() -> Vec<Frequency> {
    [
        (1, "Rare", "Could occur only in exceptional circumstances"),
        (2, "Unlikely", "Could occur at some time"),
        (3, "Possible", "Might occur at some time"),
        (4, "Likely", "Will probably occur in most circumstances"),
        (5, "Expected", "Is expected to occur in most circumstances"),
    ]
    .into_iter()
    .map(|(level, name, description)| Frequency {
        level,
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn default_sources() -> Vec<CatalogEntry> {
    ["People", "Process", "Legal", "Infrastructure", "External"]
        .into_iter()
        .map(CatalogEntry::named)
        .collect()
}

pub fn default_origins() -> Vec<CatalogEntry> {
    ["Internal", "External"].into_iter().map(CatalogEntry::named).collect()
}

pub fn default_consequences() -> Vec<CatalogEntry> {
    ["Negative", "Positive"].into_iter().map(CatalogEntry::named).collect()
}

pub fn default_impact_types() -> Vec<ImpactType> {
    let levels = |descriptions: [&str; 5]| -> Vec<ImpactLevel> {
        descriptions
            .iter()
            .zip(1u8..)
            .map(|(d, level)| ImpactLevel { level, description: d.to_string() })
            .collect()
    };
    vec![
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Economic),
            name: "Economic".into(),
            description: Some("Financial loss".into()),
            levels: levels([
                "Negligible loss",
                "Minor loss absorbed by the area budget",
                "Loss requiring budget reallocation",
                "Loss affecting annual results",
                "Loss threatening solvency",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Processes),
            name: "Processes".into(),
            description: Some("Disruption of operations".into()),
            levels: levels([
                "No noticeable disruption",
                "Delay within tolerance",
                "Delay affecting internal users",
                "Interruption affecting customers",
                "Prolonged interruption of critical processes",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Legal),
            name: "Legal".into(),
            description: Some("Regulatory or contractual exposure".into()),
            levels: levels([
                "No legal exposure",
                "Observation from a regulator",
                "Formal requirement or warning",
                "Fine or sanction",
                "License revocation or criminal liability",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Confidentiality),
            name: "Confidentiality (ISMS)".into(),
            description: Some("Unauthorized disclosure of information".into()),
            levels: levels([
                "Public information",
                "Internal information disclosed internally",
                "Internal information disclosed externally",
                "Confidential information disclosed",
                "Restricted information disclosed",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Reputational),
            name: "Reputation".into(),
            description: Some("Damage to image".into()),
            levels: levels([
                "Not known outside the area",
                "Known within the organization",
                "Local media coverage",
                "National media coverage",
                "International media coverage",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Availability),
            name: "Availability (ISMS)".into(),
            description: Some("Loss of access to information or services".into()),
            levels: levels([
                "Under one hour",
                "Up to four hours",
                "Up to one day",
                "Up to one week",
                "More than one week",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Personnel),
            name: "Personnel".into(),
            description: Some("Harm to people".into()),
            levels: levels([
                "No injuries",
                "First aid",
                "Medical treatment",
                "Permanent disability",
                "Fatality",
            ]),
        },
        ImpactType {
            id: EntityId::new(),
            dimension: Some(ImpactDimension::Integrity),
            name: "Integrity (ISMS)".into(),
            description: Some("Unauthorized modification of information".into()),
            levels: levels([
                "No effect on records",
                "Errors corrected in the same cycle",
                "Errors affecting internal reports",
                "Errors affecting external reports",
                "Errors affecting regulatory filings",
            ]),
        },
    ]
}

pub fn risk_levels() -> Vec<RiskLevelInfo> {
    [
        (RiskBand::Low, "#4caf50"),
        (RiskBand::Medium, "#ffeb3b"),
        (RiskBand::High, "#ff9800"),
        (RiskBand::Critical, "#f44336"),
    ]
    .into_iter()
    .map(|(band, color)| RiskLevelInfo { band, label: band.as_str().to_string(), color: color.to_string() })
    .collect()
}

pub fn map_axes() -> MapAxes {
    let axis = |labels: [&str; 5]| -> Vec<AxisLevel> {
        labels
            .iter()
            .zip(1u8..)
            .map(|(label, value)| AxisLevel { value, label: label.to_string() })
            .collect()
    };
    MapAxes {
        probability: axis(["Very Low", "Low", "Medium", "High", "Very High"]),
        impact: axis(["Very Minor", "Minor", "Moderate", "Major", "Very Major"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_impact_types_have_five_levels() {
        let types = default_impact_types();
        assert_eq!(types.len(), 8);
        assert!(types.iter().all(|t| t.levels.len() == 5));
        assert_eq!(types[0].levels[4].level, 5);
    }

    #[test]
    fn test_axes_cover_grid() {
        let axes = map_axes();
        assert_eq!(axes.probability.len(), 5);
        assert_eq!(axes.impact[0].value, 1);
        assert_eq!(axes.impact[4].label, "Very Major");
    }

    #[test]
    fn test_map_config_by_kind() {
        let mut config = MapConfig::default();
        config.set(MapKind::Tolerance, serde_json::json!({ "max": 9 }));
        assert_eq!(config.get(MapKind::Tolerance)["max"], 9);
    }
}
