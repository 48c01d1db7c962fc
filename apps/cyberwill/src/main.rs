mod backend_client;
mod chat;
mod cli;
mod config;
mod errors;
mod models;
mod questionnaire;
mod state;
mod storage;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so they never interleave with the typed-out reply.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting CyberWill v{}", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::init(config)?;
    info!("Loaded {} profile(s)", state.store.profiles().len());

    cli::run(&mut state).await
}
