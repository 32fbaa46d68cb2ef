// src/error_handling/mod.rs
//! Error handling for the settlement core
//!
//! Component errors stay specific; this module adds the crate-wide wrapper and
//! the classification used when reporting failures.

pub mod error_types;

pub use error_types::{ErrorKind, SettlementError};
