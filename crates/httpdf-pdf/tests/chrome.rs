use httpdf_core::models::page::PageOptions;
use httpdf_pdf::chrome::{BrowserSource, ChromeRenderer};
use httpdf_pdf::error::CaptureError;
use httpdf_pdf::renderer::PdfRenderer;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn cancelled_token_short_circuits() {
    let renderer = ChromeRenderer::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut out = Vec::new();
    let err = renderer
        .render(&cancel, "about:blank", &mut out, PageOptions::from_mm(210.0, 297.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Cancelled), "{err:?}");
    assert!(out.is_empty());
}

#[tokio::test]
async fn missing_browser_binary_is_a_launch_error() {
    let renderer = ChromeRenderer::new(BrowserSource::Launch {
        path: Some("/nonexistent/httpdf/chrome".into()),
        sandbox: false,
    });
    let cancel = CancellationToken::new();

    let mut out = Vec::new();
    let err = renderer
        .render(&cancel, "about:blank", &mut out, PageOptions::from_mm(210.0, 297.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Launch(_)), "{err:?}");
    assert!(out.is_empty());
}

#[test]
fn default_source_launches_sandboxed() {
    match ChromeRenderer::default().source() {
        BrowserSource::Launch { path, sandbox } => {
            assert!(path.is_none());
            assert!(*sandbox);
        }
        other => panic!("unexpected source {other:?}"),
    }
}

/// Requires a local Chrome/Chromium.
///
/// Run with: `cargo test -p httpdf-pdf --test chrome -- --ignored`
#[tokio::test]
#[ignore]
async fn prints_a4_page_with_local_chrome() {
    let renderer = ChromeRenderer::new(BrowserSource::Launch {
        path: None,
        sandbox: false,
    });
    let cancel = CancellationToken::new();

    let mut out = Vec::new();
    renderer
        .render(
            &cancel,
            "data:text/html,<h1>Hello World</h1>",
            &mut out,
            PageOptions::from_mm(210.0, 297.0),
        )
        .await
        .unwrap();

    assert!(out.starts_with(b"%PDF-"));
    // 210x297mm is 595x842pt.
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("595") && text.contains("842"), "missing A4 MediaBox");
}
