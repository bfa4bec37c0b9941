//! Deployment orchestration engine.
//!
//! Ties the artifact resolver, chain sessions, batch store, and verification
//! backends together behind the request surface the CLI (or any other
//! frontend) consumes: generate a batch, list and promote its transactions,
//! and drive source verification.

mod builder;
mod config;
mod context;
mod deployer;
mod error;
mod events;
mod export;
mod generate;
mod script;
mod settings;

use std::collections::BTreeMap;

use alloy_primitives::B256;
use batchforge_primitives::{SubmittedTransaction, UnsignedTransaction, VerifySettings};
use batchforge_store::{BatchStore, StoreError};
use batchforge_verify::{VerificationOrchestrator, VerificationService, VerificationState, VerifyError};

pub use builder::{predict_create, predict_create2, AbiSource, DeployRequest, ExecuteRequest};
pub use config::DeployConfig;
pub use context::RunContext;
pub use deployer::{Deployed, Deployer, Executed};
pub use error::GenerateError;
pub use events::{decode_events, DecodedLog};
pub use generate::generate;
pub use script::{DeployScript, ScriptRegistry};
pub use settings::GenerateSettings;

/// All unsigned batches under the config's deployment root.
pub async fn list_unsigned(
    config: &DeployConfig,
) -> BTreeMap<String, Vec<UnsignedTransaction>> {
    BatchStore::new(config.deployments_dir()).list_unsigned().await
}

/// All submitted batches under the config's deployment root.
pub async fn list_submitted(
    config: &DeployConfig,
) -> BTreeMap<String, Vec<SubmittedTransaction>> {
    BatchStore::new(config.deployments_dir()).list_submitted().await
}

/// Records that the external signer broadcast a transaction, moving its
/// record from unsigned to submitted.
pub async fn promote(
    config: &DeployConfig,
    batch: &str,
    id: &str,
    transaction_hash: B256,
) -> Result<SubmittedTransaction, StoreError> {
    BatchStore::new(config.deployments_dir())
        .promote(batch, id, transaction_hash)
        .await
}

/// Starts a verification with the selected backend, returning the
/// continuation token to poll with.
pub async fn verify(
    settings: &VerifySettings,
    service: VerificationService,
) -> Result<String, VerifyError> {
    VerificationOrchestrator::new(service).verify(settings).await
}

/// Polls a pending verification to a terminal state.
pub async fn check_pending(
    settings: &VerifySettings,
    token: &str,
    service: VerificationService,
) -> Result<VerificationState, VerifyError> {
    VerificationOrchestrator::new(service)
        .check_pending(settings, token)
        .await
}

/// Whether the backend already considers the contract verified.
pub async fn check_verified(
    settings: &VerifySettings,
    service: VerificationService,
) -> Result<bool, VerifyError> {
    VerificationOrchestrator::new(service)
        .check_verified(settings)
        .await
}
