use async_trait::async_trait;
use batchforge_primitives::VerifySettings;
use tracing::warn;

use crate::{
    error::VerifyError,
    provider::{VerificationOutcome, VerificationProvider},
};

const SOURCIFY_URL: &str = "https://sourcify.dev/server";

/// Sourcify backend.
///
/// Sourcify imports already-verified sources from the chain's explorer
/// rather than taking a standard-JSON upload, so `verify` here asks it to
/// pull from the explorer and the interesting call is the match check, which
/// distinguishes full ("perfect") from partial metadata matches.
#[derive(Debug, Default)]
pub struct SourcifyVerifier {
    client: reqwest::Client,
}

impl SourcifyVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    async fn match_status(&self, settings: &VerifySettings) -> Result<String, VerifyError> {
        let response: serde_json::Value = self
            .client
            .get(format!("{SOURCIFY_URL}/check-by-addresses"))
            .query(&[
                ("addresses", settings.deployment_address.to_string()),
                ("chainIds", settings.chain_id.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(response
            .get(0)
            .and_then(|entry| entry.get("status"))
            .and_then(|status| status.as_str())
            .unwrap_or("false")
            .to_owned())
    }
}

#[async_trait]
impl VerificationProvider for SourcifyVerifier {
    async fn verify(&self, settings: &VerifySettings) -> Result<String, VerifyError> {
        let response: serde_json::Value = self
            .client
            .post(format!("{SOURCIFY_URL}/verify/etherscan"))
            .json(&serde_json::json!({
                "address": settings.deployment_address,
                "chainId": settings.chain_id.to_string(),
            }))
            .send()
            .await?
            .json()
            .await?;
        let status = response
            .get("result")
            .and_then(|result| result.get(0))
            .and_then(|entry| entry.get("status"))
            .and_then(|status| status.as_str());
        if status != Some("perfect") {
            warn!(response = %response, "sourcify match was not perfect");
        }
        // Sourcify keys pending checks by address, no token needed.
        Ok(String::new())
    }

    async fn check_pending(
        &self,
        settings: &VerifySettings,
        _token: &str,
    ) -> Result<VerificationOutcome, VerifyError> {
        let status = self.match_status(settings).await?;
        Ok(VerificationOutcome {
            verified: status == "perfect",
            busy: false,
            message: status,
        })
    }

    async fn check_verified(&self, settings: &VerifySettings) -> Result<bool, VerifyError> {
        Ok(self.match_status(settings).await? == "perfect")
    }
}
