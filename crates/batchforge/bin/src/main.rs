//! Deployment batch CLI.
//!
//! Wraps the engine's request surface: generate a batch from a registered
//! deploy script, inspect and promote its transactions, and drive source
//! verification for deployed contracts.

use batchforge_engine::{
    check_pending, check_verified, generate, list_submitted, list_unsigned, promote, verify,
    DeployConfig, GenerateSettings,
};
use batchforge_primitives::VerifySettings;
use clap::Parser;
use eyre::eyre::{eyre, Result};
use tracing::info;

use crate::args::{Cli, Command};

mod args;
mod scripts;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = DeployConfig::load(&cli.project_root).await;

    match cli.command {
        Command::Generate(args) => {
            let registry = scripts::registry();
            let settings = GenerateSettings {
                batch_id: args.batch_id,
                script: args.script,
                default_chain_id: args.chain_id,
                default_from: args.from,
                default_base_fee: args.base_fee,
                default_priority_fee: args.priority_fee,
                rpc_overrides: args.rpc_overrides.into_iter().collect(),
            };
            generate(&registry, config, settings).await?;
        }
        Command::ListUnsigned => {
            let batches = list_unsigned(&config).await;
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
        Command::ListSubmitted => {
            let batches = list_submitted(&config).await;
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
        Command::Promote(args) => {
            let submitted = promote(&config, &args.batch, &args.id, args.transaction_hash).await?;
            info!(
                id = submitted.transaction.id(),
                hash = %submitted.submitted.transaction_hash,
                "transaction promoted to submitted"
            );
        }
        Command::Verify(args) => {
            let settings = deployment_settings(&config, &args.batch, &args.id).await?;
            let token = verify(&settings, args.service).await?;
            println!("{token}");
        }
        Command::CheckPending(args) => {
            let settings = deployment_settings(&config, &args.batch, &args.id).await?;
            let state = check_pending(&settings, &args.token, args.service).await?;
            println!("{state:?}");
        }
        Command::CheckVerified(args) => {
            let settings = deployment_settings(&config, &args.batch, &args.id).await?;
            let verified = check_verified(&settings, args.service).await?;
            println!("{verified}");
        }
    }

    Ok(())
}

/// Looks a deployment transaction up by batch and id, in the unsigned
/// records first and the submitted history second.
async fn deployment_settings(
    config: &DeployConfig,
    batch: &str,
    id: &str,
) -> Result<VerifySettings> {
    let unsigned = list_unsigned(config).await;
    if let Some(tx) = unsigned
        .get(batch)
        .and_then(|txs| txs.iter().find(|tx| tx.id() == id))
    {
        if let Some(deployment) = tx.as_deployment() {
            return Ok(VerifySettings::from(deployment));
        }
    }

    let submitted = list_submitted(config).await;
    if let Some(tx) = submitted
        .get(batch)
        .and_then(|txs| txs.iter().find(|tx| tx.transaction.id() == id))
    {
        if let Some(deployment) = tx.transaction.as_deployment() {
            return Ok(VerifySettings::from(deployment));
        }
    }

    Err(eyre!(
        "no deployment transaction {id} in batch {batch}; only deployments can be verified"
    ))
}
