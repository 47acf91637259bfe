//! Value objects

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Identifier value object for entities
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trimmed, non-empty text
pub fn required_text(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Inclusive range check for small integer attributes
pub fn in_range(field: &str, value: u8, min: u8, max: u8) -> ServiceResult<u8> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ServiceError::validation(format!("{field} must be between {min} and {max}, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
        assert_eq!(EntityId::from_string("abc").as_str(), "abc");
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Payroll ").unwrap(), "Payroll");
        assert!(matches!(required_text("name", "   "), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_in_range() {
        assert_eq!(in_range("priority", 3, 1, 5).unwrap(), 3);
        assert!(in_range("priority", 0, 1, 5).is_err());
    }
}
