use std::path::PathBuf;

use alloy_primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{artifact::Artifact, serde_utils::decimal};

/// Per-transaction chain parameters, immutable once assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSettings {
    pub chain_id: u64,
    #[serde(with = "decimal")]
    pub nonce: u64,
    #[serde(with = "decimal")]
    pub base_fee: u128,
    #[serde(with = "decimal")]
    pub priority_fee: u128,
}

/// An unsigned transaction record as persisted in a batch directory.
///
/// The `type` tag distinguishes contract deployments from plain function
/// calls; everything else about the record is shared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UnsignedTransaction {
    Deployment(DeploymentTransaction),
    Function(FunctionTransaction),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTransaction {
    /// Unique within the batch; the persisted file is named `<id>.json`.
    pub id: String,
    pub batch: String,
    /// Position within the batch in generation order, for display only.
    pub batch_index: u64,
    /// The CREATE2 deployer proxy for deterministic deployments, absent for
    /// plain CREATE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(with = "decimal")]
    pub value: U256,
    /// Deploy bytecode with constructor args applied, prefixed with the salt
    /// for CREATE2.
    pub data: Bytes,
    /// Estimated gas limit; zero means estimation failed and the record must
    /// not be submitted as-is.
    #[serde(with = "decimal")]
    pub gas: u64,
    pub from: Address,
    pub transaction_settings: TransactionSettings,
    pub deployment_address: Address,
    #[serde(default)]
    pub constructor_args: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    pub artifact: Artifact,
    /// Context directory the transaction was generated from.
    pub source: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionTransaction {
    pub id: String,
    pub batch: String,
    pub batch_index: u64,
    pub to: Address,
    #[serde(with = "decimal")]
    pub value: U256,
    pub data: Bytes,
    #[serde(with = "decimal")]
    pub gas: u64,
    pub from: Address,
    pub transaction_settings: TransactionSettings,
    pub function_name: String,
    #[serde(default)]
    pub function_args: Vec<serde_json::Value>,
    pub source: PathBuf,
}

impl UnsignedTransaction {
    pub fn id(&self) -> &str {
        match self {
            Self::Deployment(tx) => &tx.id,
            Self::Function(tx) => &tx.id,
        }
    }

    pub fn batch(&self) -> &str {
        match self {
            Self::Deployment(tx) => &tx.batch,
            Self::Function(tx) => &tx.batch,
        }
    }

    pub fn settings(&self) -> &TransactionSettings {
        match self {
            Self::Deployment(tx) => &tx.transaction_settings,
            Self::Function(tx) => &tx.transaction_settings,
        }
    }

    pub fn gas(&self) -> u64 {
        match self {
            Self::Deployment(tx) => tx.gas,
            Self::Function(tx) => tx.gas,
        }
    }

    /// Whether gas estimation succeeded for this record. Zero is the
    /// "could not estimate" sentinel and such records must not be handed to
    /// a signer unmodified.
    pub fn gas_estimated(&self) -> bool {
        self.gas() != 0
    }

    pub fn as_deployment(&self) -> Option<&DeploymentTransaction> {
        match self {
            Self::Deployment(tx) => Some(tx),
            Self::Function(_) => None,
        }
    }
}

/// An unsigned record plus the hash and timestamp attached when the external
/// signer broadcast it. Created only by the unsigned-to-submitted promotion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmittedTransaction {
    #[serde(flatten)]
    pub transaction: UnsignedTransaction,
    pub submitted: SubmissionReceipt,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub transaction_hash: B256,
    pub date: DateTime<Utc>,
}
