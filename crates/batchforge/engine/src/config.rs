use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256};
use batchforge_chainspec::CREATE2_DEPLOYER;
use batchforge_primitives::{Salt, SaltError};
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_FILE: &str = "batchforge.config.json";

/// Per-project deployment configuration.
///
/// Loaded from `batchforge.config.json` in a project directory; every field
/// is optional in the file and falls back to its default. Nested contexts
/// resolve their own config against their own directory, so a sub-project
/// can carry different salt, export, and artifact settings than the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeployConfig {
    pub delete_unfinished_deployment_on_generate: bool,
    pub default_create2: bool,
    /// Text salt, padded to 32 bytes when used.
    pub default_salt: String,
    pub create2_deployer: Address,
    pub default_export: bool,
    pub export_to_root_project: bool,
    pub export_to_original_project: bool,
    /// Set from the directory the config was loaded from, never from the
    /// file itself.
    #[serde(skip)]
    pub project_root: PathBuf,
    pub(crate) deployments_dir: Option<PathBuf>,
    pub(crate) artifacts_dir: Option<PathBuf>,
    pub(crate) export_dir: Option<PathBuf>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            delete_unfinished_deployment_on_generate: false,
            default_create2: false,
            default_salt: "batchforge".to_owned(),
            create2_deployer: CREATE2_DEPLOYER,
            default_export: false,
            export_to_root_project: true,
            export_to_original_project: false,
            project_root: PathBuf::from("."),
            deployments_dir: None,
            artifacts_dir: None,
            export_dir: None,
        }
    }
}

impl DeployConfig {
    /// Reads the config file in `project_root`, falling back to defaults
    /// when the file is absent. An unparsable file is a warning, not a
    /// failure; the run proceeds with defaults.
    pub async fn load(project_root: &Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        let mut config = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "invalid config file, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.project_root = project_root.to_path_buf();
        config
    }

    pub fn deployments_dir(&self) -> PathBuf {
        self.deployments_dir
            .clone()
            .unwrap_or_else(|| self.project_root.join("deployed"))
    }

    /// Where `forge` writes compiled artifacts for this project.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(|| self.project_root.join("out"))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.project_root.join("export"))
    }

    pub fn default_salt_word(&self) -> Result<B256, SaltError> {
        Salt::Text(self.default_salt.clone()).to_word()
    }
}
