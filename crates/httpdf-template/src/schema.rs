use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;

use httpdf_core::models::validation::{ValidationResult, Violation};

use crate::error::TemplateError;

/// A compiled JSON Schema (draft 2020-12 unless the document says otherwise).
pub struct Schema {
    validator: jsonschema::Validator,
}

impl Schema {
    pub fn compile(schema: &Value) -> Result<Self, TemplateError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| TemplateError::Schema(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TemplateError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| TemplateError::Schema(e.to_string()))?;
        Self::compile(&value)
    }

    /// Validate `values` and collect every violation, not just the first.
    pub fn validate(&self, values: &Value) -> ValidationResult {
        let violations = self
            .validator
            .iter_errors(values)
            .map(|err| Violation {
                pointer: violation_pointer(&err),
                reason: err.to_string(),
            })
            .collect();
        ValidationResult { violations }
    }
}

/// JSON pointer of the offending value. A missing required property is
/// reported at the property's own path rather than at its parent object.
fn violation_pointer(err: &ValidationError<'_>) -> String {
    let parent = err.instance_path.to_string();
    match &err.kind {
        ValidationErrorKind::Required { property } => {
            let name = match property {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            format!("{parent}/{}", escape_pointer_token(&name))
        }
        _ => parent,
    }
}

/// RFC 6901 token escaping: `~` → `~0`, `/` → `~1`.
fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").finish_non_exhaustive()
    }
}
