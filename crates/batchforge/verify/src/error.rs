use batchforge_chainspec::ChainSpecError;
use batchforge_primitives::AbiArgError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    ChainSpec(#[from] ChainSpecError),
    #[error("chain {0} has no verification API")]
    NoVerificationApi(u64),
    #[error("missing credential {variable}")]
    MissingCredential { variable: &'static str },
    #[error("could not encode constructor arguments: {0}")]
    ConstructorArgs(#[from] AbiArgError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("verification rejected: {message}")]
    Rejected { message: String },
}
