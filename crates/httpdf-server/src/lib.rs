//! httpdf-server
//!
//! HTTP front end for the generate pipeline.

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/templates/{template}/render",
            post(routes::templates::render),
        )
        .route(
            "/templates/{template}/preview",
            get(routes::templates::preview),
        )
        .route(
            "/templates/{template}/assets/{*path}",
            get(routes::templates::asset),
        )
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(cors)
        .with_state(state)
}
