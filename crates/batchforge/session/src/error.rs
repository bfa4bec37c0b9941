use alloy_primitives::B256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    ChainSpec(#[from] batchforge_chainspec::ChainSpecError),
    #[error("local fork of {rpc} (chain {chain_id}) failed to initialize (exit code {code:?})")]
    ForkStartup {
        chain_id: u64,
        rpc: String,
        code: Option<i32>,
    },
    #[error("local fork of {rpc} (chain {chain_id}) did not become ready in time")]
    ForkTimeout { chain_id: u64, rpc: String },
    #[error("could not spawn anvil: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("no transaction receipt for {0} on the local fork")]
    ReceiptTimeout(B256),
    #[error(transparent)]
    Rpc(#[from] alloy_transport::TransportError),
}
