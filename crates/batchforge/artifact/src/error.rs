use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("could not get artifact for {contract} at {path}: {source}")]
    NotFound {
        contract: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not launch forge in {project}: {source}")]
    CompilerSpawn {
        project: PathBuf,
        source: std::io::Error,
    },
    #[error("forge compile failed in {project}: {stderr}")]
    CompileFailed { project: PathBuf, stderr: String },
    #[error("invalid artifact JSON at {path}: {source}")]
    InvalidArtifact {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not read source file {path}: {source}")]
    SourceFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
