//! declara-core
//!
//! Pure domain types and artifact path conventions for the health-declaration
//! engine. No I/O — this is the shared vocabulary of the declara system.

pub mod artifact_keys;
pub mod error;
pub mod models;
