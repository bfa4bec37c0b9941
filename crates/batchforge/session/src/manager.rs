use std::{collections::HashMap, sync::Arc};

use batchforge_chainspec::chain_info;
use tokio::sync::Mutex;
use tracing::info;

use crate::{error::SessionError, session::Session};

/// Lazily creates and owns the chain sessions of one generation run.
pub struct SessionManager {
    sessions: Mutex<HashMap<u64, Arc<Session>>>,
    rpc_overrides: HashMap<u64, String>,
}

impl SessionManager {
    pub fn new(rpc_overrides: HashMap<u64, String>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            rpc_overrides,
        }
    }

    /// The session for `chain_id`, forking the chain on first reference.
    /// Idempotent per chain id within the run.
    pub async fn session_for(&self, chain_id: u64) -> Result<Arc<Session>, SessionError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(&chain_id) {
            return Ok(session.clone());
        }

        let rpc = match self.rpc_overrides.get(&chain_id) {
            Some(rpc) => rpc.clone(),
            None => chain_info(chain_id)?.rpc_url.to_owned(),
        };
        let session = Arc::new(Session::fork(chain_id, &rpc).await?);
        sessions.insert(chain_id, session.clone());
        Ok(session)
    }

    /// Terminates every fork. Runs unconditionally at the end of a run;
    /// leaked anvil processes outlive their usefulness.
    pub async fn shutdown(&self) {
        let sessions = std::mem::take(&mut *self.sessions.lock().await);
        for (chain_id, session) in sessions {
            info!(chain_id, "stopping local fork");
            session.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_chain_without_override_fails() {
        let manager = SessionManager::new(HashMap::new());
        assert!(matches!(
            manager.session_for(424242).await,
            Err(SessionError::ChainSpec(_))
        ));
    }

    #[tokio::test]
    async fn shutdown_with_no_sessions_is_a_no_op() {
        let manager = SessionManager::new(HashMap::new());
        manager.shutdown().await;
    }
}
