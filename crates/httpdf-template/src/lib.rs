//! httpdf-template
//!
//! Template packages: loading, schema validation, the per-render function
//! registry and HTML rendering.

pub mod error;
pub mod funcs;
pub mod i18n;
pub mod loader;
pub mod render;
pub mod schema;
pub mod template;
