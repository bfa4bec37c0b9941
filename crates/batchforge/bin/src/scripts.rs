//! Compiled-in deploy scripts.
//!
//! Scripts are precompiled plugins; add an implementation here and register
//! it by name to make it selectable with `generate --script <name>`.

use async_trait::async_trait;
use batchforge_engine::{DeployRequest, DeployScript, Deployer, ScriptRegistry};
use tracing::info;

pub fn registry() -> ScriptRegistry {
    let mut registry = ScriptRegistry::new();
    registry.register("token", TokenScript);
    registry
}

/// Deploys the project's `Token` contract with a fixed initial supply,
/// deterministically via CREATE2.
struct TokenScript;

#[async_trait]
impl DeployScript for TokenScript {
    async fn deploy(&self, deployer: &Deployer<'_>) -> eyre::Result<()> {
        let mut request = DeployRequest::new("Token");
        request.create2 = Some(true);
        request.args = vec![serde_json::json!("1000000000000000000000000")];
        let deployed = deployer.deploy(request).await?;
        info!(address = %deployed.address, "token deployed");
        Ok(())
    }
}
