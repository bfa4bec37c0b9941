use std::collections::HashMap;

use alloy_primitives::Address;

/// In-memory next-nonce counters for impersonated senders.
///
/// The chain is queried once per address to seed the counter; afterwards the
/// ledger is the source of truth, so repeated deployments from one address
/// within a run receive strictly increasing nonces without a round trip per
/// transaction. This assumes no other actor submits competing transactions
/// for the same address while the run is active.
#[derive(Debug, Default)]
pub struct NonceLedger {
    counters: HashMap<Address, u64>,
}

impl NonceLedger {
    pub fn get(&self, address: Address) -> Option<u64> {
        self.counters.get(&address).copied()
    }

    /// Seeds the counter for `address` if unseeded and returns the current
    /// value either way.
    pub fn seed(&mut self, address: Address, chain_nonce: u64) -> u64 {
        *self.counters.entry(address).or_insert(chain_nonce)
    }

    pub fn bump(&mut self, address: Address) {
        if let Some(counter) = self.counters.get_mut(&address) {
            *counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_nonces_for_one_sender() {
        let sender = Address::repeat_byte(0x11);
        let mut ledger = NonceLedger::default();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let nonce = match ledger.get(sender) {
                Some(nonce) => nonce,
                None => ledger.seed(sender, 7),
            };
            seen.push(nonce);
            ledger.bump(sender);
        }
        assert_eq!(seen, vec![7, 8, 9, 10]);
    }

    #[test]
    fn seed_does_not_reset_an_existing_counter() {
        let sender = Address::repeat_byte(0x22);
        let mut ledger = NonceLedger::default();
        assert_eq!(ledger.seed(sender, 3), 3);
        ledger.bump(sender);
        assert_eq!(ledger.seed(sender, 3), 4);
    }

    #[test]
    fn senders_are_independent() {
        let a = Address::repeat_byte(0x33);
        let b = Address::repeat_byte(0x44);
        let mut ledger = NonceLedger::default();
        ledger.seed(a, 0);
        ledger.seed(b, 100);
        ledger.bump(a);
        assert_eq!(ledger.get(a), Some(1));
        assert_eq!(ledger.get(b), Some(100));
    }
}
