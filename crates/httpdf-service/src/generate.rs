use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use httpdf_pdf::error::CaptureError;
use httpdf_pdf::renderer::PdfRenderer;
use httpdf_template::template::Template;

use crate::asset_server::EphemeralServer;
use crate::error::GenerateError;

/// Turns templates plus values into PDFs.
///
/// Holds no per-request state; one instance serves any number of concurrent
/// calls.
#[derive(Clone)]
pub struct Httpdf {
    renderer: Arc<dyn PdfRenderer>,
}

impl Httpdf {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self { renderer }
    }

    /// Validate `values`, serve the rendered page on a private port, capture
    /// it and write the PDF to `out`.
    ///
    /// Nothing is written unless the whole pipeline succeeds. The asset
    /// server is stopped on every path; cancelling `cancel` stops it and the
    /// capture promptly.
    pub async fn generate<W>(
        &self,
        cancel: &CancellationToken,
        template: Arc<Template>,
        locale: &str,
        values: Map<String, Value>,
        out: &mut W,
    ) -> Result<(), GenerateError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let name = template.name.clone();
        let result = self.run(cancel, template, locale, values, out).await;
        match &result {
            Ok(()) => debug!(template = %name, "generate done"),
            Err(e) => debug!(template = %name, error = %e, "generate failed"),
        }
        result
    }

    async fn run<W>(
        &self,
        cancel: &CancellationToken,
        template: Arc<Template>,
        locale: &str,
        values: Map<String, Value>,
        out: &mut W,
    ) -> Result<(), GenerateError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        debug!(template = %template.name, "validating");
        let values = Value::Object(values);
        let validation = template.validate(&values);
        if !validation.is_valid() {
            return Err(GenerateError::InvalidValues(validation.into_violations()));
        }
        if cancel.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }

        let page = template.page_options();
        let server = EphemeralServer::start(cancel, Arc::clone(&template), locale, values).await?;
        let url = server.url();
        debug!(template = %template.name, %url, "capturing");

        let mut pdf = Vec::new();
        let captured = self
            .renderer
            .render(server.token(), &url, &mut pdf, page)
            .await;
        let render_failure = server.take_render_failure();
        server.shutdown().await;

        if cancel.is_cancelled() || matches!(captured, Err(CaptureError::Cancelled)) {
            return Err(GenerateError::Cancelled);
        }
        if let Some(e) = render_failure {
            return Err(e.into());
        }
        captured?;

        debug!(template = %template.name, bytes = pdf.len(), "writing PDF");
        write_all(out, &pdf).await.map_err(CaptureError::Stream)?;
        Ok(())
    }

    /// Render the template's example values as HTML, with no capture.
    ///
    /// The example must satisfy the schema like any request would.
    pub fn preview(
        &self,
        template: &Template,
        assets_prefix: &str,
        locale: &str,
    ) -> Result<String, GenerateError> {
        let values = Value::Object(template.example.clone().unwrap_or_default());
        let validation = template.validate(&values);
        if !validation.is_valid() {
            return Err(GenerateError::InvalidValues(validation.into_violations()));
        }
        Ok(template.render(&values, assets_prefix, locale)?)
    }
}

async fn write_all<W>(out: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    out.write_all(bytes).await?;
    out.flush().await
}
