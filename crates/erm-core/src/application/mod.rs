//! Application layer
//!
//! Use-case services over the store, plus the commands and read models they
//! exchange with callers.

pub mod dto;
pub mod services;
