use batchforge_primitives::DeploymentTransaction;
use tracing::debug;

use crate::{config::DeployConfig, error::GenerateError};

/// Writes `{address, abi}` bindings for a deployment to the configured
/// export directories, so consuming projects can pick up fresh addresses
/// without parsing the full transaction records.
pub(crate) async fn export_bindings(
    transaction: &DeploymentTransaction,
    root: &DeployConfig,
    local: &DeployConfig,
) -> Result<(), GenerateError> {
    let mut dirs = Vec::new();
    if root.export_to_original_project {
        dirs.push(local.export_dir());
    }
    if root.export_to_root_project {
        dirs.push(root.export_dir());
    }
    dirs.dedup();

    let bindings = serde_json::json!({
        "address": transaction.deployment_address,
        "abi": transaction.artifact.abi,
    });
    for dir in dirs {
        let batch_dir = dir.join(&transaction.batch);
        tokio::fs::create_dir_all(&batch_dir)
            .await
            .map_err(|source| GenerateError::Export {
                path: batch_dir.clone(),
                source,
            })?;
        let path = batch_dir.join(format!("{}.json", transaction.id));
        debug!(path = %path.display(), "exporting contract bindings");
        tokio::fs::write(&path, format!("{bindings:#}"))
            .await
            .map_err(|source| GenerateError::Export { path, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alloy_primitives::{address, Address, Bytes, U256};
    use batchforge_primitives::{
        Artifact, CompilerInfo, JsonDescription, TransactionSettings,
    };

    use super::*;

    fn sample_transaction() -> DeploymentTransaction {
        DeploymentTransaction {
            id: "31337_0_Token".into(),
            batch: "test-batch".into(),
            batch_index: 0,
            to: None,
            value: U256::ZERO,
            data: Bytes::new(),
            gas: 100_000,
            from: Address::repeat_byte(0x11),
            transaction_settings: TransactionSettings {
                chain_id: 31337,
                nonce: 0,
                base_fee: 10,
                priority_fee: 1,
            },
            deployment_address: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            constructor_args: vec![],
            salt: None,
            artifact: Artifact {
                abi: alloy_json_abi::JsonAbi::new(),
                bytecode: Bytes::new(),
                compiler: CompilerInfo {
                    version: "v0.8.24".into(),
                },
                contract_name: "src/Token.sol:Token".into(),
                json_description: JsonDescription {
                    language: "Solidity".into(),
                    sources: Default::default(),
                    settings: Default::default(),
                    metadata: Default::default(),
                },
                license: None,
            },
            source: PathBuf::from("/project"),
        }
    }

    #[tokio::test]
    async fn bindings_land_under_the_batch_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = DeployConfig {
            project_root: dir.path().to_path_buf(),
            ..Default::default()
        };

        export_bindings(&sample_transaction(), &root, &root)
            .await
            .unwrap();

        let exported = dir.path().join("export/test-batch/31337_0_Token.json");
        let raw = tokio::fs::read_to_string(&exported).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value["address"],
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
        assert!(value["abi"].is_array());
    }

    #[tokio::test]
    async fn export_can_be_disabled_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let root = DeployConfig {
            project_root: dir.path().to_path_buf(),
            export_to_root_project: false,
            ..Default::default()
        };

        export_bindings(&sample_transaction(), &root, &root)
            .await
            .unwrap();
        assert!(!dir.path().join("export").exists());
    }
}
