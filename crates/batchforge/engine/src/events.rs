use alloy_dyn_abi::{DecodedEvent, EventExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use alloy_rpc_types_eth::Log;

/// One log successfully decoded against an ABI event.
#[derive(Clone, Debug)]
pub struct DecodedLog {
    pub event: String,
    pub address: Address,
    pub decoded: DecodedEvent,
}

/// Decodes `logs` against the events in `abi`.
///
/// Logs emitted by other contracts (when `address` is given), logs for other
/// events (when `event_name` is given), and logs that do not decode against
/// any candidate event are dropped silently; a receipt routinely contains
/// logs that have nothing to do with the event a script is after.
pub fn decode_events(
    abi: &JsonAbi,
    logs: &[Log],
    address: Option<Address>,
    event_name: Option<&str>,
) -> Vec<DecodedLog> {
    let mut decoded = Vec::new();
    for log in logs {
        if let Some(address) = address {
            if log.address() != address {
                continue;
            }
        }
        let candidates = abi
            .events()
            .filter(|event| event_name.is_none_or(|name| event.name == name));
        for event in candidates {
            let topics = log.topics().iter().copied();
            if let Ok(value) = event.decode_log_parts(topics, log.data().data.as_ref()) {
                decoded.push(DecodedLog {
                    event: event.name.clone(),
                    address: log.address(),
                    decoded: value,
                });
                break;
            }
        }
    }
    decoded
}
