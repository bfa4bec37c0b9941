//! Raw shape of the JSON files `forge compile` writes to the out directory.

use std::collections::BTreeMap;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use batchforge_primitives::{
    CompilerInfo, CompilerSettings, DescriptionMetadata, JsonDescription, OptimizerSettings,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ForgeArtifact {
    pub abi: JsonAbi,
    pub bytecode: ForgeBytecode,
    pub metadata: ForgeMetadata,
}

#[derive(Debug, Deserialize)]
pub struct ForgeBytecode {
    pub object: Bytes,
}

#[derive(Debug, Deserialize)]
pub struct ForgeMetadata {
    pub compiler: ForgeCompiler,
    pub language: String,
    pub settings: ForgeCompilerSettings,
    pub sources: BTreeMap<String, ForgeSource>,
}

#[derive(Debug, Deserialize)]
pub struct ForgeCompiler {
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeCompilerSettings {
    #[serde(default)]
    pub remappings: Vec<String>,
    pub optimizer: OptimizerSettings,
    #[serde(default)]
    pub evm_version: Option<String>,
    #[serde(default)]
    pub via_ir: Option<bool>,
    /// Single-entry map of source path to contract name.
    pub compilation_target: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgeSource {
    #[serde(default)]
    pub license: Option<String>,
}

impl ForgeArtifact {
    /// Fully qualified `path:Name` of the compilation target.
    pub fn qualified_name(&self) -> Option<String> {
        self.metadata
            .settings
            .compilation_target
            .iter()
            .next()
            .map(|(path, name)| format!("{path}:{name}"))
    }

    /// License of the compilation target's source file.
    pub fn license(&self) -> Option<String> {
        let (target, _) = self.metadata.settings.compilation_target.iter().next()?;
        self.metadata.sources.get(target)?.license.clone()
    }

    /// Explorers expect compiler versions with a `v` prefix.
    pub fn compiler_version(&self) -> String {
        format!("v{}", self.metadata.compiler.version)
    }

    /// Builds the standard-JSON description given the literal content of
    /// every referenced source file.
    pub fn json_description(&self, sources: BTreeMap<String, String>) -> JsonDescription {
        JsonDescription {
            language: self.metadata.language.clone(),
            sources: sources
                .into_iter()
                .map(|(path, content)| {
                    (path, batchforge_primitives::SourceContent { content })
                })
                .collect(),
            settings: CompilerSettings {
                remappings: self.metadata.settings.remappings.clone(),
                optimizer: self.metadata.settings.optimizer.clone(),
                evm_version: self.metadata.settings.evm_version.clone(),
                via_ir: self.metadata.settings.via_ir,
            },
            metadata: DescriptionMetadata {
                use_literal_content: true,
            },
        }
    }

    pub fn compiler_info(&self) -> CompilerInfo {
        CompilerInfo {
            version: self.compiler_version(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TOKEN_ARTIFACT: &str = r#"{
        "abi": [
            {
                "type": "constructor",
                "inputs": [
                    {"name": "supply", "type": "uint256", "internalType": "uint256"}
                ],
                "stateMutability": "nonpayable"
            }
        ],
        "bytecode": {"object": "0x6080604052"},
        "metadata": {
            "compiler": {"version": "0.8.24+commit.e11b9ed9"},
            "language": "Solidity",
            "settings": {
                "remappings": ["forge-std/=lib/forge-std/src/"],
                "optimizer": {"enabled": true, "runs": 200},
                "evmVersion": "paris",
                "compilationTarget": {"src/Token.sol": "Token"}
            },
            "sources": {
                "src/Token.sol": {"license": "MIT", "keccak256": "0x00"},
                "lib/forge-std/src/Base.sol": {"license": "Apache-2.0"}
            }
        }
    }"#;

    #[test]
    fn parses_forge_output() {
        let artifact: ForgeArtifact = serde_json::from_str(TOKEN_ARTIFACT).unwrap();
        assert_eq!(artifact.qualified_name().as_deref(), Some("src/Token.sol:Token"));
        assert_eq!(artifact.license().as_deref(), Some("MIT"));
        assert_eq!(artifact.compiler_version(), "v0.8.24+commit.e11b9ed9");
        assert_eq!(artifact.bytecode.object.len(), 5);
        assert!(artifact.abi.constructor.is_some());
    }

    #[test]
    fn description_inlines_sources() {
        let artifact: ForgeArtifact = serde_json::from_str(TOKEN_ARTIFACT).unwrap();
        let description = artifact.json_description(BTreeMap::from([
            ("src/Token.sol".to_owned(), "contract Token {}".to_owned()),
            ("lib/forge-std/src/Base.sol".to_owned(), "contract Base {}".to_owned()),
        ]));
        assert_eq!(description.sources.len(), 2);
        assert_eq!(
            description.sources["src/Token.sol"].content,
            "contract Token {}"
        );
        assert!(description.metadata.use_literal_content);
        assert_eq!(description.settings.evm_version.as_deref(), Some("paris"));
    }
}
