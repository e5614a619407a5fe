use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {name} (missing {file})")]
    NotFound { name: String, file: String },

    #[error("could not load template: {0}")]
    Load(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode config file: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not compile schema: {0}")]
    Schema(String),

    #[error("parse template: {0}")]
    Parse(String),

    #[error("execute template: {0}")]
    Execution(String),

    #[error("QR code generation failed: {0}")]
    QrCode(String),
}

impl TemplateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. })
    }
}

/// Flattens an error and its `source()` chain into one message.
///
/// Tera reports the interesting part of a syntax error (line, column,
/// expected tokens) in the source, not in the top-level message.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
