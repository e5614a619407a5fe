//! Per-generate HTTP listener the capture engine loads the page from.
//!
//! Routes:
//! - `/` renders the template with the request's values and locale on every
//!   hit.
//! - `/assets/*` serves the template's asset directory. `ServeDir` refuses
//!   paths that leave the directory.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use httpdf_template::error::TemplateError;
use httpdf_template::template::Template;

use crate::error::GenerateError;

/// URL prefix the asset directory is mounted under.
pub const ASSETS_PREFIX: &str = "/assets";
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct RootPage {
    template: Arc<Template>,
    locale: String,
    values: Value,
    failure: Arc<Mutex<Option<TemplateError>>>,
}

/// A listener bound to an OS-assigned loopback port.
///
/// Stops when the parent cancellation token fires, when [`shutdown`] is
/// awaited, or when the value is dropped.
///
/// [`shutdown`]: EphemeralServer::shutdown
pub struct EphemeralServer {
    addr: SocketAddr,
    token: CancellationToken,
    failure: Arc<Mutex<Option<TemplateError>>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl EphemeralServer {
    /// Bind and start serving. The listener accepts connections before this
    /// returns.
    pub async fn start(
        cancel: &CancellationToken,
        template: Arc<Template>,
        locale: &str,
        values: Value,
    ) -> Result<Self, GenerateError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(|e| GenerateError::AssetServer(format!("bind: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| GenerateError::AssetServer(format!("local address: {e}")))?;

        let failure = Arc::new(Mutex::new(None));
        let assets = template.assets.clone();
        let page = Arc::new(RootPage {
            template,
            locale: locale.to_string(),
            values,
            failure: Arc::clone(&failure),
        });

        let mut router = Router::new().route("/", get(root_page)).with_state(page);
        if let Some(dir) = assets {
            router = router.nest_service(ASSETS_PREFIX, ServeDir::new(dir));
        }

        let token = cancel.child_token();
        let stop = token.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await
        });
        debug!(%addr, "asset server listening");

        Ok(Self {
            addr,
            token,
            failure,
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Root page URL for the capture engine.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Cancelled when the server stops, including when the parent token is
    /// cancelled.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The first template error hit while serving the root page, if any.
    pub fn take_render_failure(&self) -> Option<TemplateError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Stop accepting, let open requests finish, and wait for the listener
    /// to close. Gives up and aborts after [`SHUTDOWN_TIMEOUT`].
    pub async fn shutdown(mut self) {
        self.token.cancel();
        let Some(mut task) = self.task.take() else {
            return;
        };
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await {
            Ok(Ok(Ok(()))) => debug!(addr = %self.addr, "asset server stopped"),
            Ok(Ok(Err(e))) => warn!(addr = %self.addr, error = %e, "asset server failed"),
            Ok(Err(e)) => warn!(addr = %self.addr, error = %e, "asset server task failed"),
            Err(_) => {
                warn!(addr = %self.addr, "asset server shutdown timed out");
                task.abort();
            }
        }
    }
}

impl Drop for EphemeralServer {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn root_page(State(page): State<Arc<RootPage>>) -> Response {
    let rendering = Arc::clone(&page);
    let rendered = tokio::task::spawn_blocking(move || {
        rendering
            .template
            .render(&rendering.values, ASSETS_PREFIX, &rendering.locale)
    })
    .await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Err(e) => {
            warn!(template = %page.template.name, error = %e, "render task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "render task failed").into_response()
        }
        Ok(Err(e)) => {
            let message = e.to_string();
            warn!(template = %page.template.name, error = %message, "render failed");
            page.failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_insert(e);
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}
