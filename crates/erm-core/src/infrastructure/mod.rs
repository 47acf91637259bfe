//! Infrastructure layer

pub mod persistence;
pub mod seed;
