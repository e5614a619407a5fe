#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use httpdf_core::models::page::PageOptions;
use httpdf_pdf::error::CaptureError;
use httpdf_pdf::renderer::{BoxFuture, PdfRenderer, PdfSink};
use httpdf_server::state::AppState;

/// Fetches the page like a browser would and wraps the HTML in a minimal
/// PDF envelope.
pub struct FetchingRenderer;

impl PdfRenderer for FetchingRenderer {
    fn render<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        url: &'a str,
        out: &'a mut PdfSink,
        page: PageOptions,
    ) -> BoxFuture<'a, Result<(), CaptureError>> {
        Box::pin(async move {
            let url = url.to_string();
            let fetch = tokio::task::spawn_blocking(move || {
                let agent: ureq::Agent = ureq::Agent::config_builder()
                    .http_status_as_error(false)
                    .build()
                    .into();
                agent
                    .get(&url)
                    .call()
                    .and_then(|mut r| r.body_mut().read_to_string())
                    .map_err(|e| e.to_string())
            });
            let html = tokio::select! {
                _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
                joined = fetch => joined
                    .map_err(|e| CaptureError::Capture(e.to_string()))?
                    .map_err(CaptureError::Navigation)?,
            };
            let pdf = format!(
                "%PDF-1.4\n% page {:.0}x{:.0}mm\n{html}\n%%EOF\n",
                page.width_mm, page.height_mm
            );
            out.write_all(pdf.as_bytes()).await?;
            Ok(())
        })
    }
}

pub const SCHEMA: &str = r#"{"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}"#;

pub fn write_package(root: &Path, name: &str, files: &[(&str, &str)]) {
    for (file, contents) in files {
        let path = root.join(name).join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

/// A template root with `hello` (assets, example, locales) and `bare`
/// (nothing optional).
pub fn fixtures() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    write_package(
        root.path(),
        "hello",
        &[
            (
                "template.html",
                "<link href=\"{{ asset(path=\"style.css\") }}\"><h1>{{ tr(key=\"greeting\", name=name) }}</h1>",
            ),
            (
                "config.yaml",
                "page:\n  width: 210\n  height: 297\nlocale:\n  locales: [en, de]\n  default: en\n",
            ),
            ("schema.json", SCHEMA),
            ("example.json", r#"{"name": "Example"}"#),
            ("assets/style.css", "h1 { color: red; }"),
            ("locales/en.yaml", "greeting: Hello {name}\n"),
            ("locales/de.yaml", "greeting: Hallo {name}\n"),
        ],
    );
    write_package(
        root.path(),
        "bare",
        &[
            ("template.html", "<p>{{ name }}</p>"),
            ("config.yaml", "page:\n  width: 100\n  height: 150\n"),
            ("schema.json", SCHEMA),
        ],
    );
    write_package(
        root.path(),
        "broken",
        &[
            ("template.html", "<p>{{ customer.name }}</p>"),
            ("config.yaml", "page:\n  width: 210\n  height: 297\n"),
            ("schema.json", "{}"),
        ],
    );
    root
}

pub fn app(root: &Path) -> axum::Router {
    httpdf_server::router(AppState::new(root, Arc::new(FetchingRenderer)))
}

pub async fn send(app: axum::Router, request: Request<Body>) -> (Response<Body>, String) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (
        Response::from_parts(parts, Body::empty()),
        String::from_utf8_lossy(&bytes).into_owned(),
    )
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}
