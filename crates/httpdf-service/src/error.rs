use thiserror::Error;

use httpdf_core::models::validation::{join_violations, Violation};
use httpdf_pdf::error::CaptureError;
use httpdf_template::error::TemplateError;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid values: {}", join_violations(.0))]
    InvalidValues(Vec<Violation>),

    #[error("{0}")]
    TemplateNotFound(String),

    #[error("parse template: {0}")]
    TemplateParse(String),

    #[error("execute template: {0}")]
    TemplateExecution(String),

    #[error("template error: {0}")]
    Template(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("asset server error: {0}")]
    AssetServer(String),

    #[error("generate cancelled")]
    Cancelled,
}

impl GenerateError {
    /// The caller sent values the template rejects.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerateError::InvalidValues(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GenerateError::TemplateNotFound(_))
    }
}

impl From<TemplateError> for GenerateError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::NotFound { .. } => GenerateError::TemplateNotFound(e.to_string()),
            TemplateError::Parse(msg) => GenerateError::TemplateParse(msg),
            TemplateError::Execution(msg) => GenerateError::TemplateExecution(msg),
            other => GenerateError::Template(other.to_string()),
        }
    }
}
