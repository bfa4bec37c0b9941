//! Static registry of the chains a deployment run can target.

use alloy_primitives::{address, Address};
use thiserror::Error;

/// The deterministic deployment proxy used for CREATE2 deployments.
///
/// Deployed at the same address on every supported chain, see
/// <https://github.com/Arachnid/deterministic-deployment-proxy>.
pub const CREATE2_DEPLOYER: Address = address!("4e59b44847b379578588920ca78fbf26c0b4956c");

#[derive(Debug, Error)]
pub enum ChainSpecError {
    #[error("chain with id {0} not found")]
    UnknownChain(u64),
}

/// A chain the registry knows how to fork and verify against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: &'static str,
    /// Default public RPC endpoint used to fork when no override is given.
    pub rpc_url: &'static str,
    pub explorer_url: Option<&'static str>,
}

// The default Sepolia RPC most tooling ships is heavily rate limited, so the
// registry points at a more permissive public endpoint.
const CHAINS: &[ChainInfo] = &[
    ChainInfo {
        chain_id: 1,
        name: "mainnet",
        rpc_url: "https://eth.merkle.io",
        explorer_url: Some("https://etherscan.io"),
    },
    ChainInfo {
        chain_id: 10,
        name: "optimism",
        rpc_url: "https://mainnet.optimism.io",
        explorer_url: Some("https://optimistic.etherscan.io"),
    },
    ChainInfo {
        chain_id: 137,
        name: "polygon",
        rpc_url: "https://polygon-rpc.com",
        explorer_url: Some("https://polygonscan.com"),
    },
    ChainInfo {
        chain_id: 8453,
        name: "base",
        rpc_url: "https://mainnet.base.org",
        explorer_url: Some("https://basescan.org"),
    },
    ChainInfo {
        chain_id: 42161,
        name: "arbitrum",
        rpc_url: "https://arb1.arbitrum.io/rpc",
        explorer_url: Some("https://arbiscan.io"),
    },
    ChainInfo {
        chain_id: 11155111,
        name: "sepolia",
        rpc_url: "https://rpc.ankr.com/eth_sepolia",
        explorer_url: Some("https://sepolia.etherscan.io"),
    },
    ChainInfo {
        chain_id: 31337,
        name: "anvil",
        rpc_url: "http://127.0.0.1:8545",
        explorer_url: None,
    },
];

pub fn chain_info(chain_id: u64) -> Result<&'static ChainInfo, ChainSpecError> {
    CHAINS
        .iter()
        .find(|chain| chain.chain_id == chain_id)
        .ok_or(ChainSpecError::UnknownChain(chain_id))
}

/// The Etherscan-style verification API endpoint for a chain, when its
/// explorer exposes one.
pub fn verification_api_url(chain_id: u64) -> Result<Option<String>, ChainSpecError> {
    let chain = chain_info(chain_id)?;
    let Some(explorer) = chain.explorer_url else {
        return Ok(None);
    };
    // A few explorers deviate from the `api.<host>` convention.
    let url = match explorer {
        "https://sepolia.etherscan.io" => "https://api-sepolia.etherscan.io/api".to_owned(),
        "https://optimistic.etherscan.io" => {
            "https://api-optimistic.etherscan.io/api".to_owned()
        }
        other => format!("https://api.{}/api", other.trim_start_matches("https://")),
    };
    Ok(Some(url))
}
