use std::time::Duration;

use batchforge_primitives::VerifySettings;
use tracing::{debug, info};

use crate::{
    error::VerifyError,
    provider::{provider_for, VerificationProvider, VerificationService},
};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Where a (contract, chain, backend) triple stands in its verification
/// lifecycle. `Verified` and `NotVerified` are terminal; the state is never
/// persisted, it is recomputed by polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationState {
    NotStarted,
    Pending { token: String },
    Verified,
    NotVerified { message: String },
}

/// Drives one backend's verification state machine.
pub struct VerificationOrchestrator {
    provider: Box<dyn VerificationProvider>,
    poll_interval: Duration,
}

impl VerificationOrchestrator {
    pub fn new(service: VerificationService) -> Self {
        Self::with_provider(provider_for(service))
    }

    pub fn with_provider(provider: Box<dyn VerificationProvider>) -> Self {
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Starts a verification, returning the continuation token to poll with.
    pub async fn verify(&self, settings: &VerifySettings) -> Result<String, VerifyError> {
        self.provider.verify(settings).await
    }

    /// Polls a pending request until the backend stops reporting `busy`,
    /// then maps the outcome to a terminal state. There is no deadline; the
    /// caller abandons the poll by dropping the future.
    pub async fn check_pending(
        &self,
        settings: &VerifySettings,
        token: &str,
    ) -> Result<VerificationState, VerifyError> {
        loop {
            let outcome = self.provider.check_pending(settings, token).await?;
            if outcome.busy {
                debug!(message = outcome.message, "verification busy, re-polling");
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }
            return Ok(if outcome.verified {
                VerificationState::Verified
            } else {
                VerificationState::NotVerified {
                    message: outcome.message,
                }
            });
        }
    }

    pub async fn check_verified(&self, settings: &VerifySettings) -> Result<bool, VerifyError> {
        self.provider.check_verified(settings).await
    }

    /// Drives a contract from `NotStarted` to a terminal state, skipping the
    /// submission when a previous session already verified it.
    pub async fn run_to_completion(
        &self,
        settings: &VerifySettings,
    ) -> Result<VerificationState, VerifyError> {
        if self.check_verified(settings).await? {
            info!(address = %settings.deployment_address, "already verified");
            return Ok(VerificationState::Verified);
        }
        let token = self.verify(settings).await?;
        self.check_pending(settings, &token).await
    }
}
