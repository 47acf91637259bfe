//! Domain module
//!
//! Entities and value objects. Scoring is delegated to `erm-scoring`.

pub mod aggregates;
pub mod value_objects;

pub use aggregates::*;
pub use value_objects::*;
