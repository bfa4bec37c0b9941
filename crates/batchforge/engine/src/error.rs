use std::path::PathBuf;

use batchforge_artifact::ArtifactError;
use batchforge_primitives::{AbiArgError, SaltError};
use batchforge_session::SessionError;
use batchforge_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Abi(#[from] AbiArgError),
    #[error(transparent)]
    Salt(#[from] SaltError),
    /// Estimation failing means the transaction would revert on chain, so
    /// the offending id is part of the message.
    #[error("gas estimation failed for transaction {id}: {source}")]
    GasEstimation {
        id: String,
        source: alloy_transport::TransportError,
    },
    #[error("could not write export bindings at {path}: {source}")]
    Export {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("deploy script {name} failed: {source}")]
    Script { name: String, source: eyre::Report },
}
