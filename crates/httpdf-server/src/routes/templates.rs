use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use axum::http::{self, HeaderMap};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use httpdf_template::loader::Loader;
use httpdf_template::template::Template;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub lang: Option<String>,
}

/// Render a template to PDF.
///
/// The body is the template's values as a JSON object. Dropping the request
/// (client disconnect) cancels the capture.
pub async fn render(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(values) = body?;
    let locale = request_locale(&query, &headers);
    let template = load(&state.templates, &name).await?;

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let mut pdf = Vec::new();
    state
        .httpdf
        .generate(&cancel, template, &locale, values, &mut pdf)
        .await?;

    tracing::info!(template = %name, locale = %locale, bytes = pdf.len(), "pdf rendered");
    Ok(([(CONTENT_TYPE, "application/pdf")], pdf).into_response())
}

/// Render the template's example values as HTML, re-reading the package
/// from disk.
pub async fn preview(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let locale = request_locale(&query, &headers);
    let template = load(&state.fresh, &name).await?;
    let prefix = format!("/templates/{name}/assets");

    let httpdf = state.httpdf.clone();
    let html = tokio::task::spawn_blocking(move || httpdf.preview(&template, &prefix, &locale))
        .await
        .map_err(|e| ApiError::Internal(format!("preview task failed: {e}")))??;
    Ok(Html(html))
}

/// Static files from the template's `assets/` directory.
pub async fn asset(
    State(state): State<AppState>,
    Path((name, _path)): Path<(String, String)>,
    req: Request,
) -> Result<Response, ApiError> {
    let template = load(&state.templates, &name).await?;
    let Some(dir) = template.assets.clone() else {
        return Err(ApiError::NotFound(format!("template {name} has no assets")));
    };

    // Forward the still-encoded remainder of the path; ServeDir decodes it
    // and refuses anything that leaves `dir`.
    let rest = req.uri().path().splitn(5, '/').nth(4).unwrap_or_default();
    let forwarded = http::Request::builder()
        .method(req.method().clone())
        .uri(format!("/{rest}"))
        .body(Body::empty())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let Ok(response) = ServeDir::new(dir).oneshot(forwarded).await;
    Ok(response.into_response())
}

/// Package loading reads the filesystem, so it runs on the blocking pool.
async fn load(loader: &Arc<dyn Loader>, name: &str) -> Result<Arc<Template>, ApiError> {
    let loader = Arc::clone(loader);
    let name = name.to_string();
    tokio::task::spawn_blocking(move || loader.load(&name))
        .await
        .map_err(|e| ApiError::Internal(format!("template load task failed: {e}")))?
        .map_err(ApiError::from)
}

/// `?lang=` wins over `Accept-Language`.
fn request_locale(query: &LocaleQuery, headers: &HeaderMap) -> String {
    query
        .lang
        .clone()
        .filter(|lang| !lang.trim().is_empty())
        .or_else(|| {
            headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default()
}
