//! Per-chain forked sandboxes for a single generation run.
//!
//! Each chain id referenced during a run gets a lazily spawned anvil fork of
//! the remote chain, a provider pointed at it, and an in-memory nonce ledger
//! for impersonated senders. Sessions live for exactly one run and every
//! fork process is torn down when the run ends, however it ends.

mod error;
mod manager;
mod nonce;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use nonce::NonceLedger;
pub use session::Session;
