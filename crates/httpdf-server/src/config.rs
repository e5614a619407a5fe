use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use httpdf_pdf::chrome::BrowserSource;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_TEMPLATES: &str = "templates";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid HTTPDF_LISTEN {value:?}: {source}")]
    InvalidListen {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Service settings, read from `HTTPDF_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub templates: PathBuf,
    pub browser: BrowserSource,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_value = var("HTTPDF_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidListen {
                value: listen_value.clone(),
                source,
            })?;

        let templates = var("HTTPDF_TEMPLATES")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES));

        let browser = match var("HTTPDF_BROWSER_WS") {
            Some(ws_url) => BrowserSource::Connect { ws_url },
            None => BrowserSource::Launch {
                path: var("HTTPDF_CHROMIUM").map(PathBuf::from),
                sandbox: !var("HTTPDF_NO_SANDBOX").is_some_and(|v| is_truthy(&v)),
            },
        };

        Ok(Self {
            listen,
            templates,
            browser,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
