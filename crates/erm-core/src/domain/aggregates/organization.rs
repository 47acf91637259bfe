//! Organization structure: areas, managements, positions and users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub director: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Management unit; its acronym prefixes risk identification codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Management {
    pub id: EntityId,
    pub name: String,
    pub acronym: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Analyst,
    Viewer,
}

/// Directory entry. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub position_id: Option<EntityId>,
    pub area_id: Option<EntityId>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Minimal shape check; anything stricter belongs to the identity provider
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
