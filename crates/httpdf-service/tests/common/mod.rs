#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use httpdf_core::models::config::{PageConfig, TemplateConfig};
use httpdf_core::models::page::PageOptions;
use httpdf_pdf::error::CaptureError;
use httpdf_pdf::renderer::{BoxFuture, PdfRenderer, PdfSink};
use httpdf_template::schema::Schema;
use httpdf_template::template::Template;

/// Stands in for the browser: fetches the page and wraps the HTML in a
/// minimal PDF envelope that records the requested page size.
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
            let (_, html) = tokio::select! {
                _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
                fetched = get(url) => fetched.map_err(CaptureError::Navigation)?,
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

/// Never finishes on its own; remembers the URL it was given.
#[derive(Default)]
pub struct PendingRenderer {
    pub url: Mutex<Option<String>>,
}

impl PdfRenderer for PendingRenderer {
    fn render<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        url: &'a str,
        _out: &'a mut PdfSink,
        _page: PageOptions,
    ) -> BoxFuture<'a, Result<(), CaptureError>> {
        *self.url.lock().unwrap() = Some(url.to_string());
        Box::pin(async move {
            cancel.cancelled().await;
            Err(CaptureError::Cancelled)
        })
    }
}

/// Always fails the way a crashed browser would.
pub struct FailingRenderer;

impl PdfRenderer for FailingRenderer {
    fn render<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        _url: &'a str,
        _out: &'a mut PdfSink,
        _page: PageOptions,
    ) -> BoxFuture<'a, Result<(), CaptureError>> {
        Box::pin(async { Err(CaptureError::Launch("no browser".into())) })
    }
}

/// GET `url` without treating error statuses as failures.
pub async fn get(url: &str) -> Result<(u16, String), String> {
    let url = url.to_string();
    tokio::task::spawn_blocking(move || {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        let mut response = agent.get(&url).call().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| e.to_string())?;
        Ok((status, body))
    })
    .await
    .map_err(|e| e.to_string())?
}

pub fn a4() -> TemplateConfig {
    TemplateConfig {
        page: PageConfig {
            width: 210.0,
            height: 297.0,
        },
        ..Default::default()
    }
}

pub fn name_schema() -> Schema {
    Schema::compile(&json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"]
    }))
    .unwrap()
}

pub fn hello_template() -> Template {
    Template::new("hello", "<h1>Hello {{ name }}</h1>", a4(), name_schema())
}

pub fn values(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
