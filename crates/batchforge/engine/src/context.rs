use std::{
    collections::HashMap,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use batchforge_artifact::ArtifactResolver;
use batchforge_session::SessionManager;
use batchforge_store::BatchStore;
use parking_lot::Mutex;

use crate::{config::DeployConfig, settings::GenerateSettings};

/// All mutable state of one generation run.
///
/// Every cache that used to be process-wide lives here instead: the chain
/// sessions, the compile memo, the context stack, and the batch index all
/// start empty per run and die with it, so independent runs cannot leak
/// state into each other.
pub struct RunContext {
    config: DeployConfig,
    settings: GenerateSettings,
    sessions: SessionManager,
    artifacts: ArtifactResolver,
    store: BatchStore,
    /// Stack of nested naming scopes pushed by `start_context`.
    contexts: Mutex<Vec<PathBuf>>,
    context_configs: tokio::sync::Mutex<HashMap<PathBuf, DeployConfig>>,
    batch_index: AtomicU64,
}

impl RunContext {
    pub fn new(config: DeployConfig, settings: GenerateSettings) -> Self {
        let sessions = SessionManager::new(settings.rpc_overrides.clone());
        let store = BatchStore::new(config.deployments_dir());
        Self {
            config,
            settings,
            sessions,
            artifacts: ArtifactResolver::new(),
            store,
            contexts: Mutex::new(Vec::new()),
            context_configs: tokio::sync::Mutex::new(HashMap::new()),
            batch_index: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn settings(&self) -> &GenerateSettings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn artifacts(&self) -> &ArtifactResolver {
        &self.artifacts
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    /// The innermost context directory, or the project root outside any
    /// `start_context` scope.
    pub fn current_context(&self) -> PathBuf {
        self.contexts
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| self.config.project_root.clone())
    }

    pub fn push_context(&self, name: &str) {
        let next = self.current_context().join(name);
        self.contexts.lock().push(next);
    }

    pub fn pop_context(&self) {
        self.contexts.lock().pop();
    }

    /// The config governing the current context, loaded from that directory
    /// on first use and cached for the rest of the run.
    pub async fn context_config(&self) -> DeployConfig {
        let dir = self.current_context();
        let mut configs = self.context_configs.lock().await;
        if let Some(config) = configs.get(&dir) {
            return config.clone();
        }
        let config = DeployConfig::load(&dir).await;
        configs.insert(dir, config.clone());
        config
    }

    /// Display position of the next transaction within the batch.
    pub fn next_batch_index(&self) -> u64 {
        self.batch_index.fetch_add(1, Ordering::Relaxed)
    }
}
