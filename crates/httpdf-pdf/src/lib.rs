//! httpdf-pdf
//!
//! PDF capture: drives a headless browser to load a URL and print it.

pub mod chrome;
pub mod error;
pub mod renderer;
