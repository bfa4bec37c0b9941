use std::path::PathBuf;

use alloy_primitives::{Address, B256};
use batchforge_verify::VerificationService;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "batchforge",
    about = "Generate, track, and verify EVM deployment batches"
)]
pub struct Cli {
    /// Project root holding the deploy config and compiled artifacts.
    #[arg(long, global = true, default_value = ".")]
    pub project_root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a deploy script and persist its unsigned transaction batch.
    Generate(GenerateArgs),
    /// List unsigned batches as JSON.
    ListUnsigned,
    /// List submitted batches as JSON.
    ListSubmitted,
    /// Record that the external signer broadcast a transaction.
    Promote(PromoteArgs),
    /// Start source verification for a deployed contract.
    Verify(VerifyArgs),
    /// Poll a pending verification to a terminal state.
    CheckPending(CheckPendingArgs),
    /// Query whether a contract is already verified.
    CheckVerified(VerifyArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub batch_id: String,
    /// Name of a registered deploy script.
    #[arg(long)]
    pub script: String,
    /// Default chain for transactions that do not pick their own.
    #[arg(long)]
    pub chain_id: u64,
    /// Default sender.
    #[arg(long)]
    pub from: Address,
    #[arg(long, default_value_t = 0)]
    pub base_fee: u128,
    #[arg(long, default_value_t = 0)]
    pub priority_fee: u128,
    /// Fork a chain from a custom RPC, as `<chainId>=<url>`. Repeatable.
    #[arg(long = "rpc-override", value_parser = parse_rpc_override)]
    pub rpc_overrides: Vec<(u64, String)>,
}

#[derive(Args, Debug)]
pub struct PromoteArgs {
    #[arg(long)]
    pub batch: String,
    #[arg(long)]
    pub id: String,
    /// Hash under which the signer broadcast the transaction.
    #[arg(long)]
    pub transaction_hash: B256,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[arg(long)]
    pub batch: String,
    #[arg(long)]
    pub id: String,
    /// Verification backend: etherscan, sourcify, or tenderly.
    #[arg(long)]
    pub service: VerificationService,
}

#[derive(Args, Debug)]
pub struct CheckPendingArgs {
    #[arg(long)]
    pub batch: String,
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub service: VerificationService,
    /// Continuation token returned by `verify`.
    #[arg(long, default_value = "")]
    pub token: String,
}

fn parse_rpc_override(raw: &str) -> Result<(u64, String), String> {
    let (chain, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <chainId>=<url>, got {raw:?}"))?;
    let chain = chain
        .parse()
        .map_err(|err| format!("invalid chain id {chain:?}: {err}"))?;
    Ok((chain, url.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_args_parse() {
        let cli = Cli::try_parse_from([
            "batchforge",
            "generate",
            "--batch-id",
            "2026-08",
            "--script",
            "token",
            "--chain-id",
            "11155111",
            "--from",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "--rpc-override",
            "11155111=http://127.0.0.1:8545",
        ])
        .unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.batch_id, "2026-08");
        assert_eq!(args.chain_id, 11155111);
        assert_eq!(
            args.rpc_overrides,
            vec![(11155111, "http://127.0.0.1:8545".to_owned())]
        );
        assert_eq!(args.base_fee, 0);
    }

    #[test]
    fn verify_args_parse_the_service() {
        let cli = Cli::try_parse_from([
            "batchforge",
            "verify",
            "--batch",
            "2026-08",
            "--id",
            "11155111_4_Token",
            "--service",
            "etherscan",
        ])
        .unwrap();

        let Command::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.service, VerificationService::Etherscan);
    }

    #[test]
    fn unknown_service_is_rejected() {
        assert!(Cli::try_parse_from([
            "batchforge",
            "verify",
            "--batch",
            "b",
            "--id",
            "i",
            "--service",
            "blockscout",
        ])
        .is_err());
    }

    #[test]
    fn malformed_rpc_override_is_rejected() {
        assert!(Cli::try_parse_from([
            "batchforge",
            "generate",
            "--batch-id",
            "b",
            "--script",
            "s",
            "--chain-id",
            "1",
            "--from",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "--rpc-override",
            "not-a-pair",
        ])
        .is_err());
    }
}
