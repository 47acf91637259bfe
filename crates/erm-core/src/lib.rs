//! ERM Core
//!
//! Enterprise risk management domain following Domain-Driven Design.
//!
//! ## Architecture
//!
//! - **Domain Layer**: aggregates (processes, risks, evaluations, controls,
//!   plans, incidents, catalogs) and the identifier value object
//! - **Application Layer**: use-case services and their input commands
//! - **Infrastructure Layer**: transactional in-memory store, demo seed
//!
//! Scoring arithmetic lives in `erm-scoring`; this crate decides when it
//! runs and persists what it derives.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::services::{ErmServices, ScoringSettings};
pub use domain::value_objects::EntityId;
pub use error::{ServiceError, ServiceResult};
pub use infrastructure::persistence::{RiskStore, Tables};
