//! httpdf-core
//!
//! Shared data model: template configuration, page geometry and schema
//! validation results.

pub mod models;
