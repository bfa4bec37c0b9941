//! Artifact resolution: compile a foundry project on demand and load a
//! contract's output into the normalized [`Artifact`] representation.

mod error;
mod forge;
mod resolver;

pub use error::ArtifactError;
pub use forge::ForgeArtifact;
pub use resolver::ArtifactResolver;

pub use batchforge_primitives::Artifact;
