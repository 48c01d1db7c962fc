use std::sync::Arc;

use tracing::info;

use crate::backend_client::BackendClient;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::errors::AppError;
use crate::questionnaire::{BackendAnalyzer, ProfileAnalyzer};
use crate::storage::{FileStore, ProfileStore};

/// Everything the front-end works with, owned in one place and passed down explicitly.
pub struct AppState {
    pub config: Config,
    /// Profiles and message logs, mirrored to the data directory on every mutation.
    pub store: ProfileStore,
    /// One chat conversation at a time; reset when the selected profile changes.
    pub session: ChatSession,
    /// Pluggable profile analyzer. Default: the backend's `/analyze-profile`.
    pub analyzer: Arc<dyn ProfileAnalyzer>,
}

impl AppState {
    pub fn init(config: Config) -> Result<Self, AppError> {
        let backend = BackendClient::new(config.backend_url())?;
        info!("Backend: {}", backend.base_url());

        let kv = Arc::new(FileStore::new(config.data_dir.clone()));
        info!("Data directory: {}", kv.dir().display());
        let store = ProfileStore::load(kv)?;

        Ok(Self {
            config,
            store,
            session: ChatSession::new(backend.clone()),
            analyzer: Arc::new(BackendAnalyzer(backend)),
        })
    }
}
