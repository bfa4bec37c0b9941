use async_trait::async_trait;
use batchforge_primitives::VerifySettings;
use serde::{Deserialize, Serialize};

use crate::{
    error::VerifyError, etherscan::EtherscanVerifier, sourcify::SourcifyVerifier,
    tenderly::TenderlyVerifier,
};

/// The supported verification backends.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationService {
    Etherscan,
    Sourcify,
    Tenderly,
}

/// Normalized poll result shared by every backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub verified: bool,
    /// The backend has not finished processing; re-poll with the same token.
    pub busy: bool,
    pub message: String,
}

/// Uniform contract over the interchangeable verification backends.
///
/// `verify` returns an opaque continuation token that `check_pending` needs
/// to poll the same request; backends without server-side request ids return
/// an empty token. Rate limiting is each backend's own business and is
/// retried internally, never surfaced to the caller.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    async fn verify(&self, settings: &VerifySettings) -> Result<String, VerifyError>;

    async fn check_pending(
        &self,
        settings: &VerifySettings,
        token: &str,
    ) -> Result<VerificationOutcome, VerifyError>;

    async fn check_verified(&self, settings: &VerifySettings) -> Result<bool, VerifyError>;
}

/// Instantiates the backend for a service selection.
pub fn provider_for(service: VerificationService) -> Box<dyn VerificationProvider> {
    match service {
        VerificationService::Etherscan => Box::new(EtherscanVerifier::new()),
        VerificationService::Sourcify => Box::new(SourcifyVerifier::new()),
        VerificationService::Tenderly => Box::new(TenderlyVerifier::new()),
    }
}
