use serde::{Deserialize, Serialize};

use crate::models::page::PageOptions;

/// Locale used when a template declares no locale configuration.
pub const DEFAULT_LOCALE: &str = "en";

/// Contents of a template package's `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub page: PageConfig,

    /// Supported locales and their fallback. `None` disables translations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocaleConfig>,

    /// Names of process environment variables readable through `env`.
    #[serde(default)]
    pub exposed_env_vars: Vec<String>,
}

/// Physical page size in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub default: String,
}

impl TemplateConfig {
    pub fn page_options(&self) -> PageOptions {
        PageOptions::from_mm(self.page.width, self.page.height)
    }
}

impl LocaleConfig {
    /// The locale to fall back to when nothing requested is supported.
    pub fn fallback(&self) -> &str {
        if !self.default.is_empty() {
            &self.default
        } else {
            self.locales
                .first()
                .map(String::as_str)
                .unwrap_or(DEFAULT_LOCALE)
        }
    }
}
