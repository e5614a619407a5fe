use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use httpdf_core::models::config::TemplateConfig;
use httpdf_core::models::page::PageOptions;
use httpdf_core::models::validation::ValidationResult;

use crate::error::TemplateError;
use crate::funcs::FunctionRegistry;
use crate::i18n::Translations;
use crate::render;
use crate::schema::Schema;

/// A loaded template package. Immutable once constructed; shared between
/// requests behind an `Arc`.
#[derive(Debug)]
pub struct Template {
    pub name: String,
    pub source: String,
    pub config: TemplateConfig,
    pub schema: Schema,
    /// Directory served under the asset prefix, if the package has one.
    pub assets: Option<PathBuf>,
    pub example: Option<Map<String, Value>>,
    pub translations: Option<Arc<Translations>>,
}

impl Template {
    pub fn new(name: &str, source: &str, config: TemplateConfig, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            config,
            schema,
            assets: None,
            example: None,
            translations: None,
        }
    }

    pub fn with_assets(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets = Some(dir.into());
        self
    }

    pub fn with_example(mut self, example: Map<String, Value>) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_translations(mut self, translations: Translations) -> Self {
        self.translations = Some(Arc::new(translations));
        self
    }

    pub fn page_options(&self) -> PageOptions {
        self.config.page_options()
    }

    pub fn validate(&self, values: &Value) -> ValidationResult {
        self.schema.validate(values)
    }

    /// Build the function set for one render of this template.
    pub fn registry(&self, assets_prefix: &str, locale: &str) -> FunctionRegistry {
        FunctionRegistry::new(
            &self.config,
            self.translations.clone(),
            assets_prefix,
            locale,
        )
    }

    pub fn render(
        &self,
        values: &Value,
        assets_prefix: &str,
        locale: &str,
    ) -> Result<String, TemplateError> {
        let registry = self.registry(assets_prefix, locale);
        render::render(&self.source, &registry, values)
    }
}
