use serde_json::Value;
use tera::{Context, Tera};

use crate::error::{error_chain, TemplateError};
use crate::funcs::FunctionRegistry;

/// Name the source is registered under. The `.html` suffix turns on Tera's
/// autoescaping for interpolated values.
pub const TEMPLATE_NAME: &str = "template.html";
/// Context variable holding the asset URL prefix.
pub const ASSETS_VAR: &str = "__assets__";
/// Context variable holding the resolved locale.
pub const LOCALE_VAR: &str = "__locale__";

/// Parse `source` with the registry's functions and execute it against
/// `values`, which must be a JSON object.
pub fn render(
    source: &str,
    registry: &FunctionRegistry,
    values: &Value,
) -> Result<String, TemplateError> {
    let mut tera = Tera::default();
    registry.install(&mut tera);
    tera.add_raw_template(TEMPLATE_NAME, source)
        .map_err(|e| TemplateError::Parse(error_chain(&e)))?;

    let values = match values {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    let mut context =
        Context::from_value(values).map_err(|e| TemplateError::Execution(error_chain(&e)))?;
    context.insert(ASSETS_VAR, registry.assets_prefix());
    context.insert(LOCALE_VAR, registry.locale());

    tera.render(TEMPLATE_NAME, &context)
        .map_err(|e| TemplateError::Execution(error_chain(&e)))
}
