use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use alloy_rpc_types_eth::{Log, TransactionReceipt};
use batchforge_primitives::{DeploymentTransaction, FunctionTransaction};

use crate::{
    builder::{run_deployment, run_execution, DeployRequest, ExecuteRequest},
    context::RunContext,
    error::GenerateError,
    events::{decode_events, DecodedLog},
    settings::GenerateSettings,
};

/// Result of a deploy call: the predicted address and the receipt of the
/// local fork execution.
#[derive(Clone, Debug)]
pub struct Deployed {
    pub address: Address,
    pub transaction: DeploymentTransaction,
    pub receipt: TransactionReceipt,
}

#[derive(Clone, Debug)]
pub struct Executed {
    pub transaction: FunctionTransaction,
    pub receipt: TransactionReceipt,
}

/// The capability object handed to deploy scripts.
///
/// Everything a script can do goes through here, backed by the run context;
/// scripts never see sessions, stores, or resolvers directly.
pub struct Deployer<'run> {
    ctx: &'run RunContext,
}

impl<'run> Deployer<'run> {
    pub(crate) fn new(ctx: &'run RunContext) -> Self {
        Self { ctx }
    }

    pub fn settings(&self) -> &GenerateSettings {
        self.ctx.settings()
    }

    /// Builds, locally executes, and persists a deployment transaction,
    /// returning the address the chain will assign to it.
    pub async fn deploy(&self, request: DeployRequest) -> Result<Deployed, GenerateError> {
        let (transaction, receipt) = run_deployment(self.ctx, request).await?;
        Ok(Deployed {
            address: transaction.deployment_address,
            transaction,
            receipt,
        })
    }

    /// Builds, locally executes, and persists a function-call transaction.
    pub async fn execute(&self, request: ExecuteRequest) -> Result<Executed, GenerateError> {
        let (transaction, receipt) = run_execution(self.ctx, request).await?;
        Ok(Executed {
            transaction,
            receipt,
        })
    }

    /// Enters a nested naming scope. Contract lookups and config resolution
    /// now happen against `<current>/<name>` until the matching
    /// [`finish_context`](Self::finish_context).
    pub fn start_context(&self, name: &str) {
        self.ctx.push_context(name);
    }

    pub fn finish_context(&self) {
        self.ctx.pop_context();
    }

    /// Persists an opaque blob under `deployments/<name>` for later runs.
    pub async fn save_deployment(
        &self,
        name: &str,
        deployment: &serde_json::Value,
    ) -> Result<(), GenerateError> {
        Ok(self.ctx.store().save_deployment(name, deployment).await?)
    }

    /// Loads a blob saved by an earlier run; `None` if there is none.
    pub async fn load_deployment(&self, name: &str) -> Option<serde_json::Value> {
        self.ctx.store().load_deployment(name).await
    }

    /// The ABI of a contract in the current context, compiling the project
    /// if needed.
    pub async fn get_abi(&self, contract: &str) -> Result<JsonAbi, GenerateError> {
        let local = self.ctx.context_config().await;
        let artifact = self
            .ctx
            .artifacts()
            .resolve(contract, &local.project_root, &local.artifacts_dir())
            .await?;
        Ok(artifact.abi)
    }

    /// Decodes receipt logs against an ABI, optionally filtered by emitter
    /// address and event name.
    pub fn get_events(
        &self,
        abi: &JsonAbi,
        logs: &[Log],
        address: Option<Address>,
        event_name: Option<&str>,
    ) -> Vec<DecodedLog> {
        decode_events(abi, logs, address, event_name)
    }
}
