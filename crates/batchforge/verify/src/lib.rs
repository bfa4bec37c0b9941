//! Source-code verification against pluggable explorer backends.
//!
//! Each backend implements the same three-call contract: start a
//! verification, poll it with an opaque continuation token, or query the
//! terminal verified state directly. The orchestrator drives the resulting
//! state machine to completion, absorbing `busy` responses by re-polling.

mod error;
mod etherscan;
mod orchestrator;
mod provider;
mod sourcify;
mod tenderly;

pub use error::VerifyError;
pub use etherscan::EtherscanVerifier;
pub use orchestrator::{VerificationOrchestrator, VerificationState};
pub use provider::{
    provider_for, VerificationOutcome, VerificationProvider, VerificationService,
};
pub use sourcify::SourcifyVerifier;
pub use tenderly::TenderlyVerifier;
