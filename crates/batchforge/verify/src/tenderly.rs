use async_trait::async_trait;
use batchforge_primitives::VerifySettings;
use serde::Deserialize;

use crate::{
    error::VerifyError,
    provider::{VerificationOutcome, VerificationProvider},
};

const TENDERLY_API: &str = "https://api.tenderly.co/api/v1";

/// Tenderly backend.
///
/// Tenderly scopes contracts to an account/project pair, so all three
/// credentials are required; unlike the explorer backends there is no
/// anonymous quota to fall back to.
#[derive(Debug, Default)]
pub struct TenderlyVerifier {
    client: reqwest::Client,
}

struct Credentials {
    access_key: String,
    account: String,
    project: String,
}

impl Credentials {
    fn from_env() -> Result<Self, VerifyError> {
        let var = |variable: &'static str| {
            std::env::var(variable).map_err(|_| VerifyError::MissingCredential { variable })
        };
        Ok(Self {
            access_key: var("TENDERLY_ACCESS_KEY")?,
            account: var("TENDERLY_ACCOUNT_NAME")?,
            project: var("TENDERLY_PROJECT_NAME")?,
        })
    }

    fn project_url(&self) -> String {
        format!(
            "{TENDERLY_API}/account/{}/project/{}",
            self.account, self.project
        )
    }
}

#[derive(Debug, Deserialize)]
struct ContractEntry {
    #[serde(default)]
    verification_type: Option<String>,
}

impl TenderlyVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tenderly wants the bare compiler version, `v0.8.24+commit.x` becomes
    /// `0.8.24`.
    fn solc_version(full: &str) -> &str {
        let full = full.strip_prefix('v').unwrap_or(full);
        full.split('+').next().unwrap_or(full)
    }

    async fn fetch_contract(
        &self,
        settings: &VerifySettings,
    ) -> Result<Option<ContractEntry>, VerifyError> {
        let credentials = Credentials::from_env()?;
        let response = self
            .client
            .get(format!(
                "{}/contract/{}/{}",
                credentials.project_url(),
                settings.chain_id,
                settings.deployment_address.to_string().to_lowercase(),
            ))
            .header("X-Access-Key", &credentials.access_key)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json().await?))
    }
}

#[async_trait]
impl VerificationProvider for TenderlyVerifier {
    async fn verify(&self, settings: &VerifySettings) -> Result<String, VerifyError> {
        let credentials = Credentials::from_env()?;
        let address = settings.deployment_address.to_string().to_lowercase();

        // Register the address with the project, then submit the source.
        self.client
            .post(format!("{}/address", credentials.project_url()))
            .header("X-Access-Key", &credentials.access_key)
            .json(&serde_json::json!({
                "address": address,
                "network_id": settings.chain_id.to_string(),
                "display_name": settings.artifact.short_name(),
            }))
            .send()
            .await?
            .error_for_status()?;

        let description = &settings.artifact.json_description;
        self.client
            .post(format!("{}/contracts/verify", credentials.project_url()))
            .header("X-Access-Key", &credentials.access_key)
            .json(&serde_json::json!({
                "config": { "mode": "public" },
                "contract_to_verify": settings.artifact.contract_name,
                "solc": {
                    "version": Self::solc_version(&settings.artifact.compiler.version),
                    "sources": description.sources,
                    "settings": {
                        "optimizer": description.settings.optimizer,
                        "remappings": description.settings.remappings,
                        "evmVersion": description.settings.evm_version,
                        "viaIR": description.settings.via_ir,
                    },
                },
            }))
            .send()
            .await?
            .error_for_status()?;

        // Pending checks look the contract up by address, no token needed.
        Ok(String::new())
    }

    async fn check_pending(
        &self,
        settings: &VerifySettings,
        _token: &str,
    ) -> Result<VerificationOutcome, VerifyError> {
        match self.fetch_contract(settings).await? {
            Some(entry) => Ok(VerificationOutcome {
                verified: true,
                busy: false,
                message: entry
                    .verification_type
                    .unwrap_or_else(|| "verified".to_owned()),
            }),
            None => Ok(VerificationOutcome {
                verified: false,
                busy: false,
                message: "contract not found in project".to_owned(),
            }),
        }
    }

    async fn check_verified(&self, settings: &VerifySettings) -> Result<bool, VerifyError> {
        Ok(self.fetch_contract(settings).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solc_version_is_stripped_for_tenderly() {
        assert_eq!(
            TenderlyVerifier::solc_version("v0.8.24+commit.e11b9ed9"),
            "0.8.24"
        );
        assert_eq!(TenderlyVerifier::solc_version("0.8.19"), "0.8.19");
    }
}
