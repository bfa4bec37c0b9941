//! Durable storage for transaction batches.
//!
//! Records live under `<root>/unsigned/<batchId>/<id>.json` until the
//! external signer broadcasts them, at which point they are promoted to
//! `<root>/submitted/<batchId>/<id>.json` with the transaction hash
//! attached. Script-defined deployment blobs live under
//! `<root>/deployments/<name>`.

mod error;
mod layout;
mod store;

pub use error::StoreError;
pub use layout::DeploymentLayout;
pub use store::BatchStore;
