use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{artifact::Artifact, transaction::DeploymentTransaction};

/// The projection of a deployment needed to drive source verification.
///
/// Decoupled from the full transaction record so verification can be
/// requested for any already-deployed address, including deployments nested
/// inside another transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySettings {
    pub chain_id: u64,
    pub deployment_address: Address,
    pub artifact: Artifact,
    #[serde(default)]
    pub constructor_args: Vec<serde_json::Value>,
}

impl From<&DeploymentTransaction> for VerifySettings {
    fn from(tx: &DeploymentTransaction) -> Self {
        Self {
            chain_id: tx.transaction_settings.chain_id,
            deployment_address: tx.deployment_address,
            artifact: tx.artifact.clone(),
            constructor_args: tx.constructor_args.clone(),
        }
    }
}
