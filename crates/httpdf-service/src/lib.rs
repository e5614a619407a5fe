//! httpdf-service
//!
//! The generate pipeline: validate the values, serve the rendered page and
//! its assets on a private port, and have the capture engine print it.

pub mod asset_server;
pub mod error;
pub mod generate;
