use std::collections::BTreeMap;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Normalized compiled-contract descriptor.
///
/// Produced once per contract per compile and embedded into deployment
/// transactions so that verification can reconstruct the exact standard-JSON
/// compiler input without access to the original project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub abi: JsonAbi,
    /// Raw deployment bytecode, without constructor arguments applied.
    pub bytecode: Bytes,
    pub compiler: CompilerInfo,
    /// Fully qualified name, `src/Token.sol:Token`.
    pub contract_name: String,
    pub json_description: JsonDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompilerInfo {
    /// Compiler version with the `v` prefix expected by explorers,
    /// e.g. `v0.8.24+commit.e11b9ed9`.
    pub version: String,
}

/// Standard-JSON compiler input, with literal source content inlined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDescription {
    pub language: String,
    pub sources: BTreeMap<String, SourceContent>,
    pub settings: CompilerSettings,
    pub metadata: DescriptionMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceContent {
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    #[serde(default)]
    pub remappings: Vec<String>,
    pub optimizer: OptimizerSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_ir: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub runs: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionMetadata {
    pub use_literal_content: bool,
}

impl Default for DescriptionMetadata {
    fn default() -> Self {
        Self {
            use_literal_content: true,
        }
    }
}

impl JsonDescription {
    /// Rebuilds the standard-JSON compiler input explorers expect when
    /// resubmitting source for verification.
    pub fn standard_json_input(&self) -> serde_json::Value {
        serde_json::json!({
            "language": self.language,
            "sources": self.sources,
            "settings": {
                "optimizer": self.settings.optimizer,
                "remappings": self.settings.remappings,
                "evmVersion": self.settings.evm_version,
                "viaIR": self.settings.via_ir,
            },
        })
    }
}

impl Artifact {
    /// Contract name without the source-path qualifier.
    pub fn short_name(&self) -> &str {
        self.contract_name
            .rsplit_once(':')
            .map(|(_, name)| name)
            .unwrap_or(&self.contract_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Artifact {
        Artifact {
            abi: JsonAbi::new(),
            bytecode: Bytes::from(vec![0x60, 0x80]),
            compiler: CompilerInfo {
                version: "v0.8.24+commit.e11b9ed9".into(),
            },
            contract_name: "src/Token.sol:Token".into(),
            json_description: JsonDescription {
                language: "Solidity".into(),
                sources: BTreeMap::from([(
                    "src/Token.sol".into(),
                    SourceContent {
                        content: "contract Token {}".into(),
                    },
                )]),
                settings: CompilerSettings {
                    remappings: vec!["@oz/=lib/openzeppelin/".into()],
                    optimizer: OptimizerSettings {
                        enabled: true,
                        runs: 200,
                    },
                    evm_version: Some("paris".into()),
                    via_ir: None,
                },
                metadata: DescriptionMetadata::default(),
            },
            license: Some("MIT".into()),
        }
    }

    #[test]
    fn short_name_strips_path() {
        assert_eq!(sample().short_name(), "Token");
    }

    #[test]
    fn standard_json_input_shape() {
        let input = sample().json_description.standard_json_input();
        assert_eq!(input["language"], "Solidity");
        assert_eq!(
            input["sources"]["src/Token.sol"]["content"],
            "contract Token {}"
        );
        assert_eq!(input["settings"]["optimizer"]["runs"], 200);
        assert_eq!(input["settings"]["remappings"][0], "@oz/=lib/openzeppelin/");
    }

    #[test]
    fn serde_round_trip() {
        let artifact = sample();
        let json = serde_json::to_string(&artifact).unwrap();
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }
}
