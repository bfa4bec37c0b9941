//! Core data model for the batchforge deployment pipeline.
//!
//! Transaction records produced by a generation run are persisted as JSON and
//! later consumed by the signing frontend and the verification orchestrator,
//! so every chain-sized integer field round-trips through decimal strings.

pub mod abi;
pub mod artifact;
pub mod salt;
pub mod serde_utils;
pub mod transaction;
pub mod verify;

pub use abi::{
    coerce_params, encode_constructor_args, encode_deploy_data, encode_function_data, AbiArgError,
};
pub use artifact::{
    Artifact, CompilerInfo, CompilerSettings, DescriptionMetadata, JsonDescription,
    OptimizerSettings, SourceContent,
};
pub use salt::{Salt, SaltError};
pub use transaction::{
    DeploymentTransaction, FunctionTransaction, SubmissionReceipt, SubmittedTransaction,
    TransactionSettings, UnsignedTransaction,
};
pub use verify::VerifySettings;
