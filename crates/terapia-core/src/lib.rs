//! terapia-core
//!
//! Pure domain types, per-entity form rules, and REST path conventions.
//! No HTTP dependency; this is the shared vocabulary of the Terapia console.

pub mod api_paths;
pub mod entity;
pub mod error;
pub mod models;
