use std::collections::HashMap;

use alloy_primitives::Address;
use batchforge_primitives::serde_utils::decimal;
use serde::{Deserialize, Serialize};

/// Run-level parameters for one generation run.
///
/// Per-call values in a deploy or execute request override these defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSettings {
    pub batch_id: String,
    /// Registry name of the deploy script to run.
    pub script: String,
    pub default_chain_id: u64,
    pub default_from: Address,
    #[serde(with = "decimal")]
    pub default_base_fee: u128,
    #[serde(with = "decimal")]
    pub default_priority_fee: u128,
    /// Fork these chains from a custom RPC instead of the registry default.
    #[serde(default)]
    pub rpc_overrides: HashMap<u64, String>,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn fees_serialize_as_decimal_strings() {
        let settings = GenerateSettings {
            batch_id: "2026-08".into(),
            script: "token".into(),
            default_chain_id: 11155111,
            default_from: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            default_base_fee: 30_000_000_000,
            default_priority_fee: 2_000_000_000,
            rpc_overrides: HashMap::new(),
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["defaultBaseFee"], "30000000000");

        let back: GenerateSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
