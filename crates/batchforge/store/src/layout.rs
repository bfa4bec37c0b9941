use std::path::{Path, PathBuf};

/// Directory layout of a deployment root.
#[derive(Clone, Debug)]
pub struct DeploymentLayout {
    root: PathBuf,
}

impl DeploymentLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn unsigned_root(&self) -> PathBuf {
        self.root.join("unsigned")
    }

    pub fn submitted_root(&self) -> PathBuf {
        self.root.join("submitted")
    }

    /// Reserved for records between signing and broadcast; checked by the
    /// unfinished-deployment guard alongside the unsigned root.
    pub fn queued_root(&self) -> PathBuf {
        self.root.join("queued")
    }

    pub fn deployments_root(&self) -> PathBuf {
        self.root.join("deployments")
    }

    pub fn unsigned_file(&self, batch: &str, id: &str) -> PathBuf {
        self.unsigned_root().join(batch).join(format!("{id}.json"))
    }

    pub fn submitted_file(&self, batch: &str, id: &str) -> PathBuf {
        self.submitted_root().join(batch).join(format!("{id}.json"))
    }
}
