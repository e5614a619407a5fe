use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use httpdf_core::models::page::PageOptions;

use crate::error::CaptureError;
use crate::renderer::{BoxFuture, PdfRenderer, PdfSink};

pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
pub const QUIESCENCE_WINDOW: Duration = Duration::from_secs(1);
pub const STABILIZATION_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Changes whenever the document, its DOM or its resource list changes.
const FINGERPRINT_JS: &str = "JSON.stringify([\
    document.readyState,\
    document.documentElement ? document.documentElement.innerHTML.length : 0,\
    performance.getEntriesByType('resource').length\
])";

/// Where the browser comes from.
#[derive(Debug, Clone)]
pub enum BrowserSource {
    /// Start a fresh headless process per capture. `path: None` lets the
    /// driver find an installed Chrome/Chromium.
    Launch { path: Option<PathBuf>, sandbox: bool },
    /// Attach to a running browser through its DevTools websocket.
    Connect { ws_url: String },
}

impl Default for BrowserSource {
    fn default() -> Self {
        BrowserSource::Launch {
            path: None,
            sandbox: true,
        }
    }
}

/// Headless Chrome capture engine.
///
/// The DevTools driver is synchronous, so every capture runs on the blocking
/// pool. Cancellation is checked between steps; a cancelled capture returns
/// at once and the abandoned worker drops the browser at its next check.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    source: BrowserSource,
    navigation_timeout: Duration,
    quiescence: Duration,
    stabilization_timeout: Duration,
}

impl ChromeRenderer {
    pub fn new(source: BrowserSource) -> Self {
        Self {
            source,
            navigation_timeout: NAVIGATION_TIMEOUT,
            quiescence: QUIESCENCE_WINDOW,
            stabilization_timeout: STABILIZATION_TIMEOUT,
        }
    }

    pub fn with_timeouts(
        mut self,
        navigation: Duration,
        quiescence: Duration,
        stabilization: Duration,
    ) -> Self {
        self.navigation_timeout = navigation;
        self.quiescence = quiescence;
        self.stabilization_timeout = stabilization;
        self
    }

    pub fn source(&self) -> &BrowserSource {
        &self.source
    }

    async fn capture(
        &self,
        cancel: &CancellationToken,
        url: &str,
        out: &mut PdfSink,
        page: PageOptions,
    ) -> Result<(), CaptureError> {
        if cancel.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        let job = CaptureJob {
            renderer: self.clone(),
            url: url.to_string(),
            page,
            cancel: cancel.clone(),
        };
        let task = tokio::task::spawn_blocking(move || job.run());

        let pdf = tokio::select! {
            _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
            joined = task => joined
                .map_err(|e| CaptureError::Capture(format!("capture task failed: {e}")))??,
        };

        debug!(url, bytes = pdf.len(), "writing PDF");
        tokio::select! {
            _ = cancel.cancelled() => Err(CaptureError::Cancelled),
            written = write_pdf(out, &pdf) => written,
        }
    }
}

impl Default for ChromeRenderer {
    fn default() -> Self {
        Self::new(BrowserSource::default())
    }
}

impl PdfRenderer for ChromeRenderer {
    fn render<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        url: &'a str,
        out: &'a mut PdfSink,
        page: PageOptions,
    ) -> BoxFuture<'a, Result<(), CaptureError>> {
        Box::pin(self.capture(cancel, url, out, page))
    }
}

async fn write_pdf(out: &mut PdfSink, pdf: &[u8]) -> Result<(), CaptureError> {
    out.write_all(pdf).await?;
    out.flush().await?;
    Ok(())
}

struct CaptureJob {
    renderer: ChromeRenderer,
    url: String,
    page: PageOptions,
    cancel: CancellationToken,
}

impl CaptureJob {
    fn run(self) -> Result<Vec<u8>, CaptureError> {
        let browser = self.open_browser()?;
        self.checkpoint()?;

        let tab = browser
            .new_tab()
            .map_err(|e| CaptureError::Launch(format!("could not open tab: {e}")))?;
        tab.set_default_timeout(self.renderer.navigation_timeout);

        let result = self.print(&tab);

        if matches!(self.renderer.source, BrowserSource::Connect { .. }) {
            // A shared browser outlives us; launched ones die with `browser`.
            if let Err(e) = tab.close(true) {
                warn!(error = %e, "could not close capture tab");
            }
        }
        result
    }

    fn open_browser(&self) -> Result<Browser, CaptureError> {
        match &self.renderer.source {
            BrowserSource::Launch { path, sandbox } => {
                let options = LaunchOptions::default_builder()
                    .path(path.clone())
                    .headless(true)
                    .sandbox(*sandbox)
                    .build()
                    .map_err(|e| CaptureError::Launch(e.to_string()))?;
                debug!(path = ?path, sandbox, "launching browser");
                Browser::new(options).map_err(|e| CaptureError::Launch(e.to_string()))
            }
            BrowserSource::Connect { ws_url } => {
                debug!(ws_url = %ws_url, "connecting to browser");
                Browser::connect(ws_url.clone()).map_err(|e| CaptureError::Launch(e.to_string()))
            }
        }
    }

    fn print(&self, tab: &Arc<Tab>) -> Result<Vec<u8>, CaptureError> {
        debug!(url = %self.url, "navigating");
        tab.navigate_to(&self.url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| CaptureError::Navigation(e.to_string()))?;
        self.checkpoint()?;

        self.wait_for_quiescence(tab)?;
        self.checkpoint()?;

        let options = PrintToPdfOptions {
            print_background: Some(true),
            paper_width: Some(self.page.width_inches()),
            paper_height: Some(self.page.height_inches()),
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            margin_left: Some(0.0),
            margin_right: Some(0.0),
            prefer_css_page_size: Some(true),
            ..Default::default()
        };
        tab.print_to_pdf(Some(options))
            .map_err(|e| CaptureError::Capture(e.to_string()))
    }

    /// Poll the page fingerprint until it holds still for the quiescence
    /// window with the document fully loaded.
    fn wait_for_quiescence(&self, tab: &Tab) -> Result<(), CaptureError> {
        let started = Instant::now();
        let mut last: Option<String> = None;
        let mut stable_since = Instant::now();

        loop {
            self.checkpoint()?;
            let fingerprint = tab
                .evaluate(FINGERPRINT_JS, false)
                .map_err(|e| CaptureError::Stabilization(e.to_string()))?
                .value
                .and_then(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .unwrap_or_default();

            if last.as_deref() != Some(fingerprint.as_str()) {
                last = Some(fingerprint);
                stable_since = Instant::now();
            } else if is_complete(last.as_deref())
                && stable_since.elapsed() >= self.renderer.quiescence
            {
                debug!(
                    url = %self.url,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "page settled"
                );
                return Ok(());
            }

            if started.elapsed() >= self.renderer.stabilization_timeout {
                return Err(CaptureError::Stabilization(format!(
                    "still changing after {:?}",
                    self.renderer.stabilization_timeout
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn checkpoint(&self) -> Result<(), CaptureError> {
        if self.cancel.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }
        Ok(())
    }
}

fn is_complete(fingerprint: Option<&str>) -> bool {
    fingerprint.is_some_and(|f| f.starts_with("[\"complete\""))
}
