use tracing::{info, warn};

use crate::{
    config::DeployConfig, context::RunContext, deployer::Deployer, error::GenerateError,
    script::ScriptRegistry, settings::GenerateSettings,
};

/// Runs one generation: executes the selected deploy script against a fresh
/// run context, persisting every transaction it builds.
///
/// A script name with no registry entry is a warning and a no-op, not an
/// error. Chain sessions are torn down whether the script succeeds or not.
pub async fn generate(
    registry: &ScriptRegistry,
    config: DeployConfig,
    settings: GenerateSettings,
) -> Result<(), GenerateError> {
    let ctx = RunContext::new(config, settings);

    if ctx.config().delete_unfinished_deployment_on_generate {
        ctx.store().clear_unfinished().await?;
    }

    let Some(script) = registry.get(&ctx.settings().script) else {
        warn!(
            script = ctx.settings().script,
            "no deploy script registered under this name, deployment skipped"
        );
        return Ok(());
    };

    info!(
        script = ctx.settings().script,
        batch = ctx.settings().batch_id,
        "running deploy script"
    );
    let deployer = Deployer::new(&ctx);
    let result = script.deploy(&deployer).await;

    // Fork teardown runs regardless of the script outcome.
    ctx.sessions().shutdown().await;

    result.map_err(|source| GenerateError::Script {
        name: ctx.settings().script.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use alloy_primitives::Address;
    use async_trait::async_trait;
    use eyre::eyre::{bail, ensure};

    use super::*;
    use crate::script::DeployScript;

    fn settings(script: &str) -> GenerateSettings {
        GenerateSettings {
            batch_id: "test".into(),
            script: script.into(),
            default_chain_id: 31337,
            default_from: Address::repeat_byte(0x11),
            default_base_fee: 10,
            default_priority_fee: 1,
            rpc_overrides: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn unregistered_script_is_skipped_not_failed() {
        let registry = ScriptRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let config = DeployConfig::load(dir.path()).await;
        generate(&registry, config, settings("missing")).await.unwrap();
    }

    /// Exercises the chain-free capabilities: context scoping and blob
    /// persistence.
    struct Bookkeeping;

    #[async_trait]
    impl DeployScript for Bookkeeping {
        async fn deploy(&self, deployer: &Deployer<'_>) -> eyre::Result<()> {
            deployer.start_context("governance");
            deployer.finish_context();

            deployer
                .save_deployment(
                    "token.json",
                    &serde_json::json!({ "address": "0x0000000000000000000000000000000000000001" }),
                )
                .await?;
            let loaded = deployer.load_deployment("token.json").await;
            ensure!(loaded.is_some(), "saved deployment must load back");
            Ok(())
        }
    }

    #[tokio::test]
    async fn script_capabilities_work_end_to_end() {
        let mut registry = ScriptRegistry::new();
        registry.register("bookkeeping", Bookkeeping);

        let dir = tempfile::tempdir().unwrap();
        let config = DeployConfig::load(dir.path()).await;
        generate(&registry, config, settings("bookkeeping"))
            .await
            .unwrap();

        assert!(dir.path().join("deployed/deployments/token.json").exists());
    }

    struct Failing;

    #[async_trait]
    impl DeployScript for Failing {
        async fn deploy(&self, _deployer: &Deployer<'_>) -> eyre::Result<()> {
            bail!("constructor args out of range")
        }
    }

    #[tokio::test]
    async fn script_failures_are_wrapped_with_the_script_name() {
        let mut registry = ScriptRegistry::new();
        registry.register("failing", Failing);

        let dir = tempfile::tempdir().unwrap();
        let config = DeployConfig::load(dir.path()).await;
        let err = generate(&registry, config, settings("failing"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Script { name, .. } if name == "failing"));
    }
}
