use std::future::Future;
use std::pin::Pin;

use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use httpdf_core::models::page::PageOptions;

use crate::error::CaptureError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sink the captured document is written to.
pub type PdfSink = dyn AsyncWrite + Send + Unpin;

/// Turns a page reachable at `url` into a PDF.
///
/// Implementations must stop promptly and return
/// [`CaptureError::Cancelled`] once `cancel` fires. Nothing is retried.
pub trait PdfRenderer: Send + Sync {
    fn render<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        url: &'a str,
        out: &'a mut PdfSink,
        page: PageOptions,
    ) -> BoxFuture<'a, Result<(), CaptureError>>;
}
