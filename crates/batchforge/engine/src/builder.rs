use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{network::TransactionBuilder, Provider};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use batchforge_primitives::{
    encode_deploy_data, encode_function_data, DeploymentTransaction, FunctionTransaction, Salt,
    TransactionSettings, UnsignedTransaction,
};
use batchforge_session::Session;
use tracing::info;

use crate::{context::RunContext, error::GenerateError, export};

/// A contract deployment as requested by a deploy script. Unset fields fall
/// back to the run settings and the current context's config.
#[derive(Clone, Debug)]
pub struct DeployRequest {
    pub contract: String,
    pub id: Option<String>,
    /// Constructor arguments, coerced against the ABI at encode time.
    pub args: Vec<serde_json::Value>,
    pub create2: Option<bool>,
    pub salt: Option<Salt>,
    pub value: U256,
    pub chain_id: Option<u64>,
    pub from: Option<Address>,
    pub base_fee: Option<u128>,
    pub priority_fee: Option<u128>,
    pub export: Option<bool>,
}

impl DeployRequest {
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            id: None,
            args: Vec::new(),
            create2: None,
            salt: None,
            value: U256::ZERO,
            chain_id: None,
            from: None,
            base_fee: None,
            priority_fee: None,
            export: None,
        }
    }
}

/// Where an execution request's ABI comes from.
#[derive(Clone, Debug)]
pub enum AbiSource {
    /// Resolve the named contract in the current context.
    Contract(String),
    Abi(JsonAbi),
}

/// A function call against an already-deployed contract.
#[derive(Clone, Debug)]
pub struct ExecuteRequest {
    pub to: Address,
    pub function: String,
    pub abi: AbiSource,
    pub id: Option<String>,
    pub args: Vec<serde_json::Value>,
    pub value: U256,
    pub chain_id: Option<u64>,
    pub from: Option<Address>,
    pub base_fee: Option<u128>,
    pub priority_fee: Option<u128>,
}

impl ExecuteRequest {
    pub fn new(to: Address, function: impl Into<String>, abi: AbiSource) -> Self {
        Self {
            to,
            function: function.into(),
            abi,
            id: None,
            args: Vec::new(),
            value: U256::ZERO,
            chain_id: None,
            from: None,
            base_fee: None,
            priority_fee: None,
        }
    }
}

/// Standard CREATE address derivation, a pure function of sender and nonce.
pub fn predict_create(from: Address, nonce: u64) -> Address {
    from.create(nonce)
}

/// Standard CREATE2 derivation through the deterministic deployment proxy,
/// a pure function of proxy address, salt, and init code. Independent of the
/// sender and its nonce.
pub fn predict_create2(deployer: Address, salt: B256, init_code: &[u8]) -> Address {
    deployer.create2_from_code(salt, init_code)
}

fn default_transaction_id(chain_id: u64, nonce: u64, name: &str) -> String {
    format!("{chain_id}_{nonce}_{name}")
}

/// Effective per-transaction parameters after defaults resolution, plus the
/// session they were resolved against.
struct TxEnv {
    session: Arc<Session>,
    chain_id: u64,
    from: Address,
    nonce: u64,
    base_fee: u128,
    priority_fee: u128,
}

impl TxEnv {
    fn settings(&self) -> TransactionSettings {
        TransactionSettings {
            chain_id: self.chain_id,
            nonce: self.nonce,
            base_fee: self.base_fee,
            priority_fee: self.priority_fee,
        }
    }
}

async fn resolve_env(
    ctx: &RunContext,
    chain_id: Option<u64>,
    from: Option<Address>,
    base_fee: Option<u128>,
    priority_fee: Option<u128>,
) -> Result<TxEnv, GenerateError> {
    let settings = ctx.settings();
    let chain_id = chain_id.unwrap_or(settings.default_chain_id);
    let from = from.unwrap_or(settings.default_from);
    let session = ctx.sessions().session_for(chain_id).await?;
    let nonce = session.nonce_for(from).await?;
    Ok(TxEnv {
        session,
        chain_id,
        from,
        nonce,
        base_fee: base_fee.unwrap_or(settings.default_base_fee),
        priority_fee: priority_fee.unwrap_or(settings.default_priority_fee),
    })
}

async fn estimate_gas(
    env: &TxEnv,
    to: Option<Address>,
    value: U256,
    data: Bytes,
    id: &str,
) -> Result<u64, GenerateError> {
    let mut request = TransactionRequest::default().from(env.from).value(value);
    request.input = data.into();
    request = match to {
        Some(to) => request.to(to),
        None => request.into_create(),
    };
    env.session
        .provider()
        .estimate_gas(request)
        .await
        .map_err(|source| GenerateError::GasEstimation {
            id: id.to_owned(),
            source,
        })
}

/// Mines the transaction on the fork under impersonation, so later script
/// statements can observe its on-chain effects before anything is signed.
async fn execute_locally(
    env: &TxEnv,
    to: Option<Address>,
    value: U256,
    data: Bytes,
    gas: u64,
) -> Result<TransactionReceipt, GenerateError> {
    let mut request = TransactionRequest::default()
        .from(env.from)
        .value(value)
        .nonce(env.nonce)
        .gas_limit(gas);
    request.input = data.into();
    request = match to {
        Some(to) => request.to(to),
        None => request.into_create(),
    };
    let hash = env.session.send_unsigned(request).await?;
    Ok(env.session.wait_for_receipt(hash).await?)
}

pub(crate) async fn run_deployment(
    ctx: &RunContext,
    request: DeployRequest,
) -> Result<(DeploymentTransaction, TransactionReceipt), GenerateError> {
    let local = ctx.context_config().await;
    let env = resolve_env(
        ctx,
        request.chain_id,
        request.from,
        request.base_fee,
        request.priority_fee,
    )
    .await?;
    let id = request
        .id
        .clone()
        .unwrap_or_else(|| default_transaction_id(env.chain_id, env.nonce, &request.contract));

    let create2 = request.create2.unwrap_or(local.default_create2);
    let salt = create2.then(|| {
        request
            .salt
            .clone()
            .unwrap_or_else(|| Salt::Text(local.default_salt.clone()))
    });
    let salt_word = salt.as_ref().map(Salt::to_word).transpose()?;

    let artifact = ctx
        .artifacts()
        .resolve(&request.contract, &local.project_root, &local.artifacts_dir())
        .await?;
    let init_code = encode_deploy_data(&artifact, &request.args)?;

    // The prediction must match what the chain will assign, before anything
    // is mined.
    let deployment_address = match salt_word {
        Some(word) => predict_create2(local.create2_deployer, word, &init_code),
        None => predict_create(env.from, env.nonce),
    };
    let to = create2.then_some(local.create2_deployer);
    let data: Bytes = match salt_word {
        Some(word) => [word.as_slice(), &init_code].concat().into(),
        None => init_code,
    };

    let gas = estimate_gas(&env, to, request.value, data.clone(), &id).await?;
    let transaction = DeploymentTransaction {
        id,
        batch: ctx.settings().batch_id.clone(),
        batch_index: ctx.next_batch_index(),
        to,
        value: request.value,
        data,
        gas,
        from: env.from,
        transaction_settings: env.settings(),
        deployment_address,
        constructor_args: request.args,
        salt: salt.map(|salt| salt.to_string()),
        artifact,
        source: ctx.current_context(),
    };

    let receipt = execute_locally(
        &env,
        transaction.to,
        transaction.value,
        transaction.data.clone(),
        gas,
    )
    .await?;
    ctx.store()
        .save_unsigned(&UnsignedTransaction::Deployment(transaction.clone()))
        .await?;
    if request.export.unwrap_or(local.default_export) {
        export::export_bindings(&transaction, ctx.config(), &local).await?;
    }
    env.session.increment_nonce(env.from);

    info!(
        id = transaction.id,
        address = %transaction.deployment_address,
        "deployment transaction prepared"
    );
    Ok((transaction, receipt))
}

pub(crate) async fn run_execution(
    ctx: &RunContext,
    request: ExecuteRequest,
) -> Result<(FunctionTransaction, TransactionReceipt), GenerateError> {
    let env = resolve_env(
        ctx,
        request.chain_id,
        request.from,
        request.base_fee,
        request.priority_fee,
    )
    .await?;
    let id = request
        .id
        .clone()
        .unwrap_or_else(|| default_transaction_id(env.chain_id, env.nonce, &request.function));

    let abi = match &request.abi {
        AbiSource::Abi(abi) => abi.clone(),
        AbiSource::Contract(contract) => {
            let local = ctx.context_config().await;
            ctx.artifacts()
                .resolve(contract, &local.project_root, &local.artifacts_dir())
                .await?
                .abi
        }
    };
    let data = encode_function_data(&abi, &request.function, &request.args)?;

    let gas = estimate_gas(&env, Some(request.to), request.value, data.clone(), &id).await?;
    let transaction = FunctionTransaction {
        id,
        batch: ctx.settings().batch_id.clone(),
        batch_index: ctx.next_batch_index(),
        to: request.to,
        value: request.value,
        data,
        gas,
        from: env.from,
        transaction_settings: env.settings(),
        function_name: request.function,
        function_args: request.args,
        source: ctx.current_context(),
    };

    ctx.store()
        .save_unsigned(&UnsignedTransaction::Function(transaction.clone()))
        .await?;
    let receipt = execute_locally(
        &env,
        Some(transaction.to),
        transaction.value,
        transaction.data.clone(),
        gas,
    )
    .await?;
    env.session.increment_nonce(env.from);

    info!(id = transaction.id, "function transaction prepared");
    Ok((transaction, receipt))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use batchforge_chainspec::CREATE2_DEPLOYER;

    use super::*;

    fn token_abi() -> JsonAbi {
        serde_json::from_value(serde_json::json!([
            {
                "type": "constructor",
                "inputs": [{ "name": "supply", "type": "uint256", "internalType": "uint256" }],
                "stateMutability": "nonpayable"
            }
        ]))
        .unwrap()
    }

    fn token_init_code() -> Bytes {
        let artifact = batchforge_primitives::Artifact {
            abi: token_abi(),
            bytecode: Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]),
            compiler: batchforge_primitives::CompilerInfo {
                version: "v0.8.24+commit.e11b9ed9".into(),
            },
            contract_name: "src/Token.sol:Token".into(),
            json_description: batchforge_primitives::JsonDescription {
                language: "Solidity".into(),
                sources: Default::default(),
                settings: Default::default(),
                metadata: Default::default(),
            },
            license: Some("MIT".into()),
        };
        encode_deploy_data(&artifact, &[serde_json::json!(1000)]).unwrap()
    }

    #[test]
    fn create_prediction_depends_only_on_sender_and_nonce() {
        let from = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(predict_create(from, 4), predict_create(from, 4));
        assert_ne!(predict_create(from, 4), predict_create(from, 5));
        assert_ne!(
            predict_create(from, 4),
            predict_create(Address::repeat_byte(0x01), 4)
        );
    }

    #[test]
    fn create2_prediction_ignores_sender_and_nonce() {
        let init_code = token_init_code();
        let salt = Salt::from("abc").to_word().unwrap();

        let predicted = predict_create2(CREATE2_DEPLOYER, salt, &init_code);
        // A second run with identical inputs predicts the identical address,
        // regardless of which account would send the transaction.
        assert_eq!(predicted, predict_create2(CREATE2_DEPLOYER, salt, &init_code));

        // Changing salt or code changes the address.
        let other_salt = Salt::from("def").to_word().unwrap();
        assert_ne!(predicted, predict_create2(CREATE2_DEPLOYER, other_salt, &init_code));
        assert_ne!(
            predicted,
            predict_create2(CREATE2_DEPLOYER, salt, &[0x60, 0x80])
        );
    }

    #[test]
    fn init_code_embeds_constructor_args() {
        let init_code = token_init_code();
        // bytecode ++ abi.encode(uint256(1000))
        assert_eq!(init_code.len(), 5 + 32);
        assert_eq!(&init_code[init_code.len() - 2..], &[0x03, 0xe8]);
    }

    #[test]
    fn default_id_names_chain_nonce_and_contract() {
        assert_eq!(
            default_transaction_id(11155111, 4, "Token"),
            "11155111_4_Token"
        );
    }
}
