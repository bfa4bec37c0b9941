use std::{
    borrow::Cow,
    net::TcpListener,
    process::Stdio,
    time::{Duration, Instant},
};

use alloy_primitives::{Address, B256};
use alloy_provider::{network::Ethereum, Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use parking_lot::Mutex;
use tokio::{process::Command, time::sleep};
use tracing::{debug, info};

use crate::{error::SessionError, nonce::NonceLedger};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A live anvil fork of one chain, alive for the duration of a single
/// generation run.
pub struct Session {
    chain_id: u64,
    port: u16,
    child: tokio::sync::Mutex<tokio::process::Child>,
    provider: RootProvider<Ethereum>,
    nonces: Mutex<NonceLedger>,
}

impl Session {
    /// Spawns `anvil --fork-url <rpc>` on a free local port and waits until
    /// the fork answers `eth_blockNumber`. An exiting child or a readiness
    /// timeout fails the whole run; a half-started fork would invalidate
    /// every transaction built against it.
    pub async fn fork(chain_id: u64, rpc: &str) -> Result<Self, SessionError> {
        let port = free_port()?;
        info!(chain_id, rpc, port, "starting local fork");

        let mut child = Command::new("anvil")
            .args(["--port", &port.to_string(), "--fork-url", rpc])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let endpoint = format!("http://127.0.0.1:{port}");
        let provider: RootProvider<Ethereum> = ProviderBuilder::default()
            .connect_http(endpoint.parse().expect("local endpoint is a valid url"));

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(SessionError::ForkStartup {
                    chain_id,
                    rpc: rpc.to_owned(),
                    code: status.code(),
                });
            }
            if provider.get_block_number().await.is_ok() {
                break;
            }
            if started.elapsed() > STARTUP_TIMEOUT {
                child.kill().await.ok();
                return Err(SessionError::ForkTimeout {
                    chain_id,
                    rpc: rpc.to_owned(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }

        debug!(chain_id, port, "local fork ready");
        Ok(Self {
            chain_id,
            port,
            child: tokio::sync::Mutex::new(child),
            provider,
            nonces: Mutex::new(NonceLedger::default()),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Query client against the fork.
    pub fn provider(&self) -> &RootProvider<Ethereum> {
        &self.provider
    }

    /// Next nonce for `address`. The first call impersonates the address and
    /// seeds the counter from the fork's transaction count; afterwards the
    /// in-memory ledger is authoritative (see [`NonceLedger`]).
    pub async fn nonce_for(&self, address: Address) -> Result<u64, SessionError> {
        if let Some(nonce) = self.nonces.lock().get(address) {
            return Ok(nonce);
        }
        self.impersonate(address).await?;
        let chain_nonce = self.provider.get_transaction_count(address).await?;
        Ok(self.nonces.lock().seed(address, chain_nonce))
    }

    /// Advances the counter after a transaction was executed locally.
    pub fn increment_nonce(&self, address: Address) {
        self.nonces.lock().bump(address);
    }

    async fn impersonate(&self, address: Address) -> Result<(), SessionError> {
        debug!(chain_id = self.chain_id, %address, "impersonating account");
        self.provider
            .raw_request::<_, ()>(Cow::Borrowed("anvil_impersonateAccount"), (address,))
            .await?;
        Ok(())
    }

    /// Executes a transaction on the fork without a signature, under
    /// impersonation of its sender.
    pub async fn send_unsigned(&self, request: TransactionRequest) -> Result<B256, SessionError> {
        let hash = self
            .provider
            .raw_request(Cow::Borrowed("eth_sendUnsignedTransaction"), (request,))
            .await?;
        Ok(hash)
    }

    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, SessionError> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            if started.elapsed() > RECEIPT_TIMEOUT {
                return Err(SessionError::ReceiptTimeout(hash));
            }
            sleep(Duration::from_millis(100)).await;
        }
    }

    /// Kills the fork process. Safe to call more than once.
    pub async fn shutdown(&self) {
        let mut child = self.child.lock().await;
        if let Err(error) = child.kill().await {
            debug!(chain_id = self.chain_id, %error, "fork already terminated");
        }
    }
}

fn free_port() -> Result<u16, std::io::Error> {
    // Bind to an ephemeral port and release it; anvil rebinds it right away.
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_ports_are_distinct_while_held() {
        let a = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let b = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        assert_ne!(
            a.local_addr().unwrap().port(),
            b.local_addr().unwrap().port()
        );
    }

    #[test]
    fn free_port_is_nonzero() {
        assert_ne!(free_port().unwrap(), 0);
    }
}
