use std::time::Duration;

use async_trait::async_trait;
use batchforge_chainspec::verification_api_url;
use batchforge_primitives::{encode_constructor_args, VerifySettings};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::VerifyError,
    provider::{VerificationOutcome, VerificationProvider},
};

const RATE_LIMIT_MARKER: &str = "Max rate limit reached";
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

/// Etherscan-style explorer API backend.
///
/// Uses the chain's explorer endpoint from the chain registry, so the same
/// backend covers every *scan deployment. The API key comes from the
/// `ETHERSCAN_API_KEY` environment variable; a missing key is a warning
/// because the explorer still accepts anonymous requests at a lower quota.
#[derive(Debug, Default)]
pub struct EtherscanVerifier {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    result: serde_json::Value,
}

impl ApiResponse {
    fn result_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    fn rate_limited(&self) -> bool {
        self.result_text().contains(RATE_LIMIT_MARKER)
    }
}

impl EtherscanVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn api_key() -> String {
        std::env::var("ETHERSCAN_API_KEY").unwrap_or_else(|_| {
            warn!("ETHERSCAN_API_KEY is not set, the explorer may reject the request");
            String::new()
        })
    }

    /// Explorer license-type codes, see
    /// <https://sepolia.etherscan.io/contract-license-types>.
    fn license_type(license: Option<&str>) -> u8 {
        match license {
            Some("MIT") => 3,
            _ => 0,
        }
    }

    fn api_url(chain_id: u64) -> Result<String, VerifyError> {
        verification_api_url(chain_id)?.ok_or(VerifyError::NoVerificationApi(chain_id))
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> Result<ApiResponse, VerifyError> {
        loop {
            let response: ApiResponse =
                self.client.post(url).form(form).send().await?.json().await?;
            if response.rate_limited() {
                debug!("explorer rate limit reached, backing off");
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                continue;
            }
            return Ok(response);
        }
    }

    async fn get_query(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, VerifyError> {
        loop {
            let response: ApiResponse =
                self.client.get(url).query(query).send().await?.json().await?;
            if response.rate_limited() {
                debug!("explorer rate limit reached, backing off");
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                continue;
            }
            return Ok(response);
        }
    }
}

#[async_trait]
impl VerificationProvider for EtherscanVerifier {
    async fn verify(&self, settings: &VerifySettings) -> Result<String, VerifyError> {
        let url = Self::api_url(settings.chain_id)?;
        let constructor_args =
            encode_constructor_args(&settings.artifact, &settings.constructor_args)?;
        let form = [
            ("apikey", Self::api_key()),
            ("module", "contract".to_owned()),
            ("action", "verifysourcecode".to_owned()),
            (
                "contractaddress",
                settings.deployment_address.to_string(),
            ),
            (
                "sourceCode",
                settings
                    .artifact
                    .json_description
                    .standard_json_input()
                    .to_string(),
            ),
            ("codeformat", "solidity-standard-json-input".to_owned()),
            ("contractname", settings.artifact.contract_name.clone()),
            ("compilerversion", settings.artifact.compiler.version.clone()),
            // The misspelling is the explorer API's, not ours.
            ("constructorArguements", hex::encode(&constructor_args)),
            (
                "licenseType",
                Self::license_type(settings.artifact.license.as_deref()).to_string(),
            ),
        ];
        let response = self.post_form(&url, &form).await?;
        if response.status != "1" {
            return Err(VerifyError::Rejected {
                message: response.result_text(),
            });
        }
        // The guid to poll with.
        Ok(response.result_text())
    }

    async fn check_pending(
        &self,
        settings: &VerifySettings,
        token: &str,
    ) -> Result<VerificationOutcome, VerifyError> {
        let url = Self::api_url(settings.chain_id)?;
        let query = [
            ("apikey", Self::api_key()),
            ("guid", token.to_owned()),
            ("module", "contract".to_owned()),
            ("action", "checkverifystatus".to_owned()),
        ];
        let response = self.get_query(&url, &query).await?;
        let message = response.result_text();
        Ok(VerificationOutcome {
            verified: response.status == "1",
            busy: message.contains("Pending in queue"),
            message,
        })
    }

    async fn check_verified(&self, settings: &VerifySettings) -> Result<bool, VerifyError> {
        let url = Self::api_url(settings.chain_id)?;
        let query = [
            ("apikey", Self::api_key()),
            ("module", "contract".to_owned()),
            ("action", "getsourcecode".to_owned()),
            (
                "address",
                settings.deployment_address.to_string(),
            ),
        ];
        let response = self.get_query(&url, &query).await?;
        // An unverified contract still answers with status 1 and an empty
        // SourceCode field.
        let verified = response
            .result
            .get(0)
            .and_then(|entry| entry.get("SourceCode"))
            .and_then(|source| source.as_str())
            .is_some_and(|source| !source.is_empty());
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mit_maps_to_license_type_3() {
        assert_eq!(EtherscanVerifier::license_type(Some("MIT")), 3);
        assert_eq!(EtherscanVerifier::license_type(Some("GPL-3.0")), 0);
        assert_eq!(EtherscanVerifier::license_type(None), 0);
    }

    #[test]
    fn rate_limit_marker_is_detected() {
        let response = ApiResponse {
            status: "0".into(),
            result: serde_json::json!("Max rate limit reached, please use API Key"),
        };
        assert!(response.rate_limited());

        let response = ApiResponse {
            status: "1".into(),
            result: serde_json::json!("guid-1234"),
        };
        assert!(!response.rate_limited());
    }

    #[test]
    fn chains_without_explorer_are_rejected() {
        assert!(matches!(
            EtherscanVerifier::api_url(31337),
            Err(VerifyError::NoVerificationApi(31337))
        ));
    }
}
