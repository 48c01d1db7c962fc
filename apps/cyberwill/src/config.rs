use std::path::PathBuf;

use anyhow::{Context, Result};

/// The backend always listens on this port; only the host varies per deployment.
pub const BACKEND_PORT: u16 = 8000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_host: String,
    pub data_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend_host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        if backend_host.trim().is_empty() || backend_host.contains('/') {
            anyhow::bail!("BACKEND_HOST must be a bare host name, got '{backend_host}'");
        }

        let data_dir = std::env::var("CYBERWILL_DATA_DIR").unwrap_or_else(|_| ".cyberwill".to_string());
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory '{data_dir}'"))?;

        Ok(Config {
            backend_host,
            data_dir: PathBuf::from(data_dir),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        })
    }

    /// Base URL of the coaching backend: same host, fixed port.
    pub fn backend_url(&self) -> String {
        backend_url_for(&self.backend_host)
    }
}

fn backend_url_for(host: &str) -> String {
    format!("http://{host}:{BACKEND_PORT}")
}
