//! Runtime ABI encoding for script-supplied JSON argument values.
//!
//! Deploy scripts hand constructor and function arguments over as plain JSON
//! so the values can be persisted verbatim in the transaction record; this
//! module coerces them against the contract ABI when calldata is built.

use alloy_dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy_json_abi::{JsonAbi, Param};
use alloy_primitives::{Address, Bytes, B256, I256, U256};
use serde_json::Value;
use thiserror::Error;

use crate::artifact::Artifact;

#[derive(Debug, Error)]
pub enum AbiArgError {
    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },
    #[error("cannot represent {value} as {ty}")]
    Mismatch { ty: String, value: String },
    #[error("{0} has no constructor but constructor arguments were supplied")]
    NoConstructor(String),
    #[error("function {0} with a matching argument count not found in ABI")]
    UnknownFunction(String),
    #[error(transparent)]
    Abi(#[from] alloy_dyn_abi::Error),
}

/// Coerces JSON values against ABI parameter declarations, in order.
pub fn coerce_params(params: &[Param], args: &[Value]) -> Result<Vec<DynSolValue>, AbiArgError> {
    if params.len() != args.len() {
        return Err(AbiArgError::Arity {
            expected: params.len(),
            got: args.len(),
        });
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| coerce_value(&param.resolve()?, arg))
        .collect()
}

/// Deploy bytecode with ABI-encoded constructor arguments appended.
pub fn encode_deploy_data(artifact: &Artifact, args: &[Value]) -> Result<Bytes, AbiArgError> {
    match &artifact.abi.constructor {
        Some(constructor) => {
            let values = coerce_params(&constructor.inputs, args)?;
            let mut data = artifact.bytecode.to_vec();
            data.extend(constructor.abi_encode_input(&values)?);
            Ok(data.into())
        }
        None if args.is_empty() => Ok(artifact.bytecode.clone()),
        None => Err(AbiArgError::NoConstructor(artifact.contract_name.clone())),
    }
}

/// ABI-encoded constructor arguments alone, as explorers expect them.
pub fn encode_constructor_args(artifact: &Artifact, args: &[Value]) -> Result<Bytes, AbiArgError> {
    match &artifact.abi.constructor {
        Some(constructor) => {
            let values = coerce_params(&constructor.inputs, args)?;
            Ok(constructor.abi_encode_input(&values)?.into())
        }
        None if args.is_empty() => Ok(Bytes::new()),
        None => Err(AbiArgError::NoConstructor(artifact.contract_name.clone())),
    }
}

/// Selector-prefixed calldata for a function call. Overloads are
/// disambiguated by argument count.
pub fn encode_function_data(
    abi: &JsonAbi,
    function: &str,
    args: &[Value],
) -> Result<Bytes, AbiArgError> {
    let candidates = abi
        .function(function)
        .ok_or_else(|| AbiArgError::UnknownFunction(function.to_owned()))?;
    let function = candidates
        .iter()
        .find(|f| f.inputs.len() == args.len())
        .ok_or_else(|| AbiArgError::UnknownFunction(function.to_owned()))?;
    let values = coerce_params(&function.inputs, args)?;
    Ok(function.abi_encode_input(&values)?.into())
}

fn mismatch(ty: &DynSolType, value: &Value) -> AbiArgError {
    AbiArgError::Mismatch {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

fn coerce_value(ty: &DynSolType, value: &Value) -> Result<DynSolValue, AbiArgError> {
    match ty {
        DynSolType::Address => value
            .as_str()
            .and_then(|s| s.parse::<Address>().ok())
            .map(DynSolValue::Address)
            .ok_or_else(|| mismatch(ty, value)),
        DynSolType::Bool => match value {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            Value::String(s) => s
                .parse()
                .map(DynSolValue::Bool)
                .map_err(|_| mismatch(ty, value)),
            _ => Err(mismatch(ty, value)),
        },
        DynSolType::Uint(bits) => {
            let parsed = match value {
                // Reject floats; only integral JSON numbers are accepted.
                Value::Number(n) => n.as_u64().map(U256::from),
                Value::String(s) => s.parse::<U256>().ok(),
                _ => None,
            };
            parsed
                .map(|v| DynSolValue::Uint(v, *bits))
                .ok_or_else(|| mismatch(ty, value))
        }
        DynSolType::Int(bits) => {
            let parsed = match value {
                Value::Number(n) => n.as_i64().map(I256::try_from).and_then(Result::ok),
                Value::String(s) => s.parse::<I256>().ok(),
                _ => None,
            };
            parsed
                .map(|v| DynSolValue::Int(v, *bits))
                .ok_or_else(|| mismatch(ty, value))
        }
        DynSolType::String => value
            .as_str()
            .map(|s| DynSolValue::String(s.to_owned()))
            .ok_or_else(|| mismatch(ty, value)),
        DynSolType::Bytes => value
            .as_str()
            .and_then(|s| s.parse::<Bytes>().ok())
            .map(|b| DynSolValue::Bytes(b.to_vec()))
            .ok_or_else(|| mismatch(ty, value)),
        DynSolType::FixedBytes(size) => {
            let bytes = value
                .as_str()
                .and_then(|s| s.parse::<Bytes>().ok())
                .filter(|b| b.len() == *size)
                .ok_or_else(|| mismatch(ty, value))?;
            Ok(DynSolValue::FixedBytes(
                B256::right_padding_from(&bytes),
                *size,
            ))
        }
        DynSolType::Array(inner) => {
            let items = value.as_array().ok_or_else(|| mismatch(ty, value))?;
            Ok(DynSolValue::Array(
                items
                    .iter()
                    .map(|item| coerce_value(inner, item))
                    .collect::<Result<_, _>>()?,
            ))
        }
        DynSolType::FixedArray(inner, size) => {
            let items = value
                .as_array()
                .filter(|items| items.len() == *size)
                .ok_or_else(|| mismatch(ty, value))?;
            Ok(DynSolValue::FixedArray(
                items
                    .iter()
                    .map(|item| coerce_value(inner, item))
                    .collect::<Result<_, _>>()?,
            ))
        }
        DynSolType::Tuple(types) => {
            let items = value
                .as_array()
                .filter(|items| items.len() == types.len())
                .ok_or_else(|| mismatch(ty, value))?;
            Ok(DynSolValue::Tuple(
                types
                    .iter()
                    .zip(items)
                    .map(|(inner, item)| coerce_value(inner, item))
                    .collect::<Result<_, _>>()?,
            ))
        }
        _ => Err(mismatch(ty, value)),
    }
}
