use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::deployer::Deployer;

/// A deploy script: externally authored deployment logic run against the
/// [`Deployer`] capability object.
///
/// Scripts are precompiled plugins registered by name; the generate settings
/// select which one a run executes.
#[async_trait]
pub trait DeployScript: Send + Sync {
    async fn deploy(&self, deployer: &Deployer<'_>) -> eyre::Result<()>;
}

/// Name-keyed registry of the deploy scripts available to this process.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn DeployScript>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, script: impl DeployScript + 'static) {
        self.scripts.insert(name.into(), Arc::new(script));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DeployScript>> {
        self.scripts.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl DeployScript for Noop {
        async fn deploy(&self, _deployer: &Deployer<'_>) -> eyre::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn registry_resolves_by_name() {
        let mut registry = ScriptRegistry::new();
        registry.register("token", Noop);
        assert!(registry.get("token").is_some());
        assert!(registry.get("missing").is_none());
    }
}
