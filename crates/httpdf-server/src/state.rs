use std::path::Path;
use std::sync::Arc;

use httpdf_pdf::renderer::PdfRenderer;
use httpdf_service::generate::Httpdf;
use httpdf_template::loader::{CachingLoader, FsLoader, Loader};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    /// Loads each template once; used for rendering and assets.
    pub templates: Arc<dyn Loader>,
    /// Reads from disk on every call; used for previews.
    pub fresh: Arc<dyn Loader>,
    pub httpdf: Httpdf,
}

impl AppState {
    pub fn new(root: &Path, renderer: Arc<dyn PdfRenderer>) -> Self {
        let fs = FsLoader::new(root);
        Self {
            templates: Arc::new(CachingLoader::new(fs.clone())),
            fresh: Arc::new(fs),
            httpdf: Httpdf::new(renderer),
        }
    }
}
