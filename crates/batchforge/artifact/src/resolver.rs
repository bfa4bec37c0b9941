use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    process::Stdio,
};

use batchforge_primitives::Artifact;
use tokio::{process::Command, sync::Mutex};
use tracing::{debug, info};

use crate::{error::ArtifactError, forge::ForgeArtifact};

/// Resolves contract artifacts, compiling each project at most once per
/// generation run.
///
/// The compile memo is scoped to this resolver, and a resolver is scoped to
/// a single run, so independent runs never see each other's state.
pub struct ArtifactResolver {
    compiled: Mutex<HashSet<PathBuf>>,
}

impl ArtifactResolver {
    pub fn new() -> Self {
        Self {
            compiled: Mutex::new(HashSet::new()),
        }
    }

    /// Loads `contract`'s artifact from `artifacts_dir`, compiling the
    /// project first if this run has not done so yet.
    pub async fn resolve(
        &self,
        contract: &str,
        project_root: &Path,
        artifacts_dir: &Path,
    ) -> Result<Artifact, ArtifactError> {
        self.compile(project_root).await?;
        self.load(contract, project_root, artifacts_dir).await
    }

    async fn compile(&self, project_root: &Path) -> Result<(), ArtifactError> {
        let key = project_root
            .canonicalize()
            .unwrap_or_else(|_| project_root.to_path_buf());

        // Held across the compile so a project is never compiled twice.
        let mut compiled = self.compiled.lock().await;
        if compiled.contains(&key) {
            debug!(project = %key.display(), "project already compiled this run");
            return Ok(());
        }

        info!(project = %key.display(), "compiling project");
        let output = Command::new("forge")
            .arg("compile")
            .current_dir(&key)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ArtifactError::CompilerSpawn {
                project: key.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ArtifactError::CompileFailed {
                project: key,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        compiled.insert(key);
        Ok(())
    }

    async fn load(
        &self,
        contract: &str,
        project_root: &Path,
        artifacts_dir: &Path,
    ) -> Result<Artifact, ArtifactError> {
        let path = artifacts_dir
            .join(format!("{contract}.sol"))
            .join(format!("{contract}.json"));
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ArtifactError::NotFound {
                contract: contract.to_owned(),
                path: path.clone(),
                source,
            })?;
        let forge: ForgeArtifact =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::InvalidArtifact {
                path: path.clone(),
                source,
            })?;

        // Embed literal source content so verification can rebuild the exact
        // standard-JSON compiler input later, without the project on disk.
        let mut sources = BTreeMap::new();
        for file in forge.metadata.sources.keys() {
            let source_path = project_root.join(file);
            let content = tokio::fs::read_to_string(&source_path).await.map_err(
                |source| ArtifactError::SourceFile {
                    path: source_path.clone(),
                    source,
                },
            )?;
            sources.insert(file.clone(), content);
        }

        let contract_name = forge
            .qualified_name()
            .unwrap_or_else(|| contract.to_owned());
        Ok(Artifact {
            contract_name,
            license: forge.license(),
            compiler: forge.compiler_info(),
            json_description: forge.json_description(sources),
            bytecode: forge.bytecode.object.clone(),
            abi: forge.abi.clone(),
        })
    }
}

impl Default for ArtifactResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::tests::TOKEN_ARTIFACT;

    async fn write_project(dir: &Path) {
        let out = dir.join("out/Token.sol");
        tokio::fs::create_dir_all(&out).await.unwrap();
        tokio::fs::write(out.join("Token.json"), TOKEN_ARTIFACT)
            .await
            .unwrap();
        tokio::fs::create_dir_all(dir.join("src")).await.unwrap();
        tokio::fs::create_dir_all(dir.join("lib/forge-std/src"))
            .await
            .unwrap();
        tokio::fs::write(dir.join("src/Token.sol"), "contract Token {}")
            .await
            .unwrap();
        tokio::fs::write(dir.join("lib/forge-std/src/Base.sol"), "contract Base {}")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn loads_and_normalizes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path()).await;

        let resolver = ArtifactResolver::new();
        let artifact = resolver
            .load("Token", dir.path(), &dir.path().join("out"))
            .await
            .unwrap();
        assert_eq!(artifact.contract_name, "src/Token.sol:Token");
        assert_eq!(artifact.license.as_deref(), Some("MIT"));
        assert_eq!(
            artifact.json_description.sources["src/Token.sol"].content,
            "contract Token {}"
        );
    }

    #[tokio::test]
    async fn missing_artifact_names_contract_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ArtifactResolver::new();
        let err = resolver
            .load("Missing", dir.path(), &dir.path().join("out"))
            .await
            .unwrap_err();
        match err {
            ArtifactError::NotFound { contract, path, .. } => {
                assert_eq!(contract, "Missing");
                assert!(path.ends_with("Missing.sol/Missing.json"));
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn missing_source_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path()).await;
        tokio::fs::remove_file(dir.path().join("lib/forge-std/src/Base.sol"))
            .await
            .unwrap();

        let resolver = ArtifactResolver::new();
        let err = resolver
            .load("Token", dir.path(), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::SourceFile { .. }));
    }
}
