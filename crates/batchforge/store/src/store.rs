use std::{collections::BTreeMap, path::Path};

use batchforge_primitives::{
    SubmissionReceipt, SubmittedTransaction, TransactionSettings, UnsignedTransaction,
};
use alloy_primitives::B256;
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{error::StoreError, layout::DeploymentLayout};

/// Filesystem-backed store for one deployment root.
#[derive(Clone, Debug)]
pub struct BatchStore {
    layout: DeploymentLayout,
}

impl BatchStore {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            layout: DeploymentLayout::new(root),
        }
    }

    pub fn layout(&self) -> &DeploymentLayout {
        &self.layout
    }

    /// Persists an unsigned record under its batch directory, creating the
    /// directory on first use. An existing record with the same id is
    /// overwritten.
    pub async fn save_unsigned(&self, tx: &UnsignedTransaction) -> Result<(), StoreError> {
        let path = self.layout.unsigned_file(tx.batch(), tx.id());
        let dir = path.parent().expect("batch file has a parent");
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(StoreError::io(dir))?;
        let json = serde_json::to_vec_pretty(tx).map_err(|source| StoreError::InvalidRecord {
            path: path.clone(),
            source,
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(StoreError::io(&path))
    }

    /// All unsigned records, grouped by batch and sorted by nonce within
    /// each batch. Unreadable files are skipped with a warning; a missing or
    /// unreadable root degrades to an empty map.
    pub async fn list_unsigned(&self) -> BTreeMap<String, Vec<UnsignedTransaction>> {
        self.read_batches(&self.layout.unsigned_root(), |tx: &UnsignedTransaction| {
            (*tx.settings(), tx.id().to_owned())
        })
        .await
    }

    /// As [`Self::list_unsigned`], for broadcast records.
    pub async fn list_submitted(&self) -> BTreeMap<String, Vec<SubmittedTransaction>> {
        self.read_batches(&self.layout.submitted_root(), |tx: &SubmittedTransaction| {
            (*tx.transaction.settings(), tx.transaction.id().to_owned())
        })
        .await
    }

    /// Moves an unsigned record to the submitted tree, attaching the hash
    /// under which the signer broadcast it. The unsigned file is deleted and
    /// its batch directory removed once empty, so a second promotion of the
    /// same id fails with [`StoreError::UnsignedTransactionNotFound`].
    pub async fn promote(
        &self,
        batch: &str,
        id: &str,
        transaction_hash: B256,
    ) -> Result<SubmittedTransaction, StoreError> {
        let unsigned_path = self.layout.unsigned_file(batch, id);
        let raw = match tokio::fs::read(&unsigned_path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::UnsignedTransactionNotFound {
                    path: unsigned_path,
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: unsigned_path,
                    source,
                });
            }
        };
        let transaction: UnsignedTransaction =
            serde_json::from_slice(&raw).map_err(|source| StoreError::InvalidRecord {
                path: unsigned_path.clone(),
                source,
            })?;

        let submitted = SubmittedTransaction {
            transaction,
            submitted: SubmissionReceipt {
                transaction_hash,
                date: Utc::now(),
            },
        };

        // Write the submitted copy before deleting the unsigned one; a crash
        // in between leaves a duplicate, never a lost record.
        let submitted_path = self.layout.submitted_file(batch, id);
        let dir = submitted_path.parent().expect("batch file has a parent");
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(StoreError::io(dir))?;
        let json =
            serde_json::to_vec_pretty(&submitted).map_err(|source| StoreError::InvalidRecord {
                path: submitted_path.clone(),
                source,
            })?;
        tokio::fs::write(&submitted_path, json)
            .await
            .map_err(StoreError::io(&submitted_path))?;

        tokio::fs::remove_file(&unsigned_path)
            .await
            .map_err(StoreError::io(&unsigned_path))?;
        let batch_dir = self.layout.unsigned_root().join(batch);
        if dir_is_empty(&batch_dir).await {
            if let Err(err) = tokio::fs::remove_dir(&batch_dir).await {
                debug!(path = %batch_dir.display(), %err, "could not remove empty batch directory");
            }
        }

        Ok(submitted)
    }

    /// Deletes every unsigned and queued record, returning whether anything
    /// was there to delete. Called before generation when the configuration
    /// asks for a clean slate.
    pub async fn clear_unfinished(&self) -> Result<bool, StoreError> {
        let mut found = false;
        for root in [self.layout.unsigned_root(), self.layout.queued_root()] {
            if !dir_is_empty(&root).await {
                found = true;
            }
            match tokio::fs::remove_dir_all(&root).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path: root, source }),
            }
        }
        if found {
            warn!("unfinished deployment found, deleting stale records");
        }
        Ok(found)
    }

    /// Persists a script-defined deployment blob under `deployments/<name>`.
    pub async fn save_deployment(
        &self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let dir = self.layout.deployments_root();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(StoreError::io(&dir))?;
        let path = dir.join(name);
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::InvalidRecord {
            path: path.clone(),
            source,
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(StoreError::io(&path))
    }

    /// Loads a deployment blob saved by an earlier run. A missing or
    /// unreadable blob is reported and yields `None` so scripts can fall
    /// back to a fresh deployment.
    pub async fn load_deployment(&self, name: &str) -> Option<serde_json::Value> {
        let path = self.layout.deployments_root().join(name);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), %err, "could not load deployment");
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), %err, "invalid deployment blob");
                None
            }
        }
    }

    async fn read_batches<T, F>(&self, root: &Path, sort_key: F) -> BTreeMap<String, Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> (TransactionSettings, String),
    {
        let mut batches = BTreeMap::new();
        let mut root_entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %root.display(), %err, "no batch directories");
                return batches;
            }
        };

        loop {
            let entry = match root_entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!(path = %root.display(), %err, "could not list batch directories");
                    return BTreeMap::new();
                }
            };
            let batch = entry.file_name().to_string_lossy().into_owned();
            let mut records = Vec::new();
            let mut files = match tokio::fs::read_dir(entry.path()).await {
                Ok(files) => files,
                Err(err) => {
                    warn!(batch, %err, "could not list batch");
                    continue;
                }
            };
            while let Ok(Some(file)) = files.next_entry().await {
                let path = file.path();
                let raw = match tokio::fs::read(&path).await {
                    Ok(raw) => raw,
                    Err(err) => {
                        warn!(path = %path.display(), %err, "skipping unreadable record");
                        continue;
                    }
                };
                let record: T = match serde_json::from_slice(&raw) {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(path = %path.display(), %err, "skipping invalid record");
                        continue;
                    }
                };
                let (_, id) = sort_key(&record);
                if path.file_stem().map(|stem| stem.to_string_lossy()) != Some(id.as_str().into()) {
                    warn!(path = %path.display(), id, "record id does not match its file name");
                }
                records.push(record);
            }
            records.sort_by_key(|record| sort_key(record).0.nonce);
            batches.insert(batch, records);
        }
        batches
    }
}

async fn dir_is_empty(path: &Path) -> bool {
    match tokio::fs::read_dir(path).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alloy_primitives::{address, Address, Bytes, U256};
    use batchforge_primitives::FunctionTransaction;
    use tempfile::TempDir;

    use super::*;

    fn function_tx(batch: &str, nonce: u64) -> UnsignedTransaction {
        UnsignedTransaction::Function(FunctionTransaction {
            id: format!("31337_{nonce}_mint"),
            batch: batch.into(),
            batch_index: 0,
            to: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            value: U256::ZERO,
            data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
            gas: 50_000,
            from: Address::repeat_byte(0x11),
            transaction_settings: TransactionSettings {
                chain_id: 31337,
                nonce,
                base_fee: 10,
                priority_fee: 1,
            },
            function_name: "mint".into(),
            function_args: vec![],
            source: PathBuf::from("/project"),
        })
    }

    #[tokio::test]
    async fn empty_root_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        assert!(store.list_unsigned().await.is_empty());
        assert!(store.list_submitted().await.is_empty());
    }

    #[tokio::test]
    async fn records_are_sorted_by_nonce_within_a_batch() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        for nonce in [9, 3, 7] {
            store.save_unsigned(&function_tx("batch-a", nonce)).await.unwrap();
        }

        let batches = store.list_unsigned().await;
        assert_eq!(batches.len(), 1);
        let nonces: Vec<u64> = batches["batch-a"]
            .iter()
            .map(|tx| tx.settings().nonce)
            .collect();
        assert_eq!(nonces, vec![3, 7, 9]);
    }

    #[tokio::test]
    async fn invalid_records_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        store.save_unsigned(&function_tx("batch-a", 1)).await.unwrap();
        let bogus = store.layout().unsigned_root().join("batch-a/bogus.json");
        tokio::fs::write(&bogus, b"{not json").await.unwrap();

        let batches = store.list_unsigned().await;
        assert_eq!(batches["batch-a"].len(), 1);
    }

    #[tokio::test]
    async fn promote_moves_the_record_and_attaches_the_hash() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        let tx = function_tx("batch-a", 4);
        store.save_unsigned(&tx).await.unwrap();

        let hash = B256::repeat_byte(0xcd);
        let submitted = store.promote("batch-a", tx.id(), hash).await.unwrap();
        assert_eq!(submitted.submitted.transaction_hash, hash);
        assert_eq!(submitted.transaction, tx);

        assert!(store.list_unsigned().await.is_empty());
        let submitted = store.list_submitted().await;
        assert_eq!(submitted["batch-a"].len(), 1);
        // The emptied batch directory is removed with its last record.
        assert!(!store.layout().unsigned_root().join("batch-a").exists());
    }

    #[tokio::test]
    async fn promoting_twice_fails() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        let tx = function_tx("batch-a", 4);
        store.save_unsigned(&tx).await.unwrap();

        store.promote("batch-a", tx.id(), B256::ZERO).await.unwrap();
        assert!(matches!(
            store.promote("batch-a", tx.id(), B256::ZERO).await,
            Err(StoreError::UnsignedTransactionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn clear_unfinished_reports_and_removes_stale_records() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        assert!(!store.clear_unfinished().await.unwrap());

        store.save_unsigned(&function_tx("batch-a", 1)).await.unwrap();
        assert!(store.clear_unfinished().await.unwrap());
        assert!(store.list_unsigned().await.is_empty());
        assert!(!store.clear_unfinished().await.unwrap());
    }

    #[tokio::test]
    async fn deployment_blobs_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path());
        assert!(store.load_deployment("missing.json").await.is_none());

        let value = serde_json::json!({ "token": "0x5fbdb2315678afecb367f032d93f642f64180aa3" });
        store.save_deployment("token.json", &value).await.unwrap();
        assert_eq!(store.load_deployment("token.json").await, Some(value));
    }
}
