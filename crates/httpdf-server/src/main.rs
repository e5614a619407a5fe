use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use httpdf_pdf::chrome::ChromeRenderer;
use httpdf_server::config::ServerConfig;
use httpdf_server::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = ServerConfig::from_env()?;
    let renderer = Arc::new(ChromeRenderer::new(config.browser.clone()));
    let state = AppState::new(&config.templates, renderer);

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!(
        listen = %config.listen,
        templates = %config.templates.display(),
        browser = ?config.browser,
        "httpdf listening"
    );

    axum::serve(listener, httpdf_server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
