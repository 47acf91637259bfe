//! Service errors

use erm_scoring::ScoringError;
use thiserror::Error;

use crate::domain::value_objects::EntityId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An operation ran before the state it depends on exists
    #[error("precondition not met: {0}")]
    PreconditionNotMet(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: &EntityId) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<ScoringError> for ServiceError {
    fn from(e: ScoringError) -> Self {
        Self::Validation(e.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
