use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page did not stabilize: {0}")]
    Stabilization(String),

    #[error("PDF capture failed: {0}")]
    Capture(String),

    #[error("could not write PDF: {0}")]
    Stream(#[from] std::io::Error),

    #[error("capture cancelled")]
    Cancelled,
}
