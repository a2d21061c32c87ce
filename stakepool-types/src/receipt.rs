use crate::account::AccountId;
use serde::{Deserialize, Serialize};

/// An external side-effect requested from the host by a committed call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Payment {
        receiver: AccountId,
        amount: u64,
    },
    AssetOptIn {
        asset_id: u64,
    },
    KeyRegistration {
        vote_pk: Vec<u8>,
        selection_pk: Vec<u8>,
        state_proof_pk: Vec<u8>,
        vote_first: u64,
        vote_last: u64,
        key_dilution: u64,
        fee: u64,
    },
    KeyDeregistration,
    AppCall {
        app_id: u64,
        args: Vec<Vec<u8>>,
        foreign_apps: Vec<u64>,
    },
    Teardown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub call_id: [u8; 32],
    pub sender: AccountId,
    pub instruction: String,
    pub effects: Vec<Effect>,
    /// Pool state root after the call committed.
    pub state_root: [u8; 32],
}

impl Receipt {
    /// Sum of all payments this call sent out of the pool.
    pub fn paid_out(&self) -> u64 {
        self.effects
            .iter()
            .map(|effect| match effect {
                Effect::Payment { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(amount: u64) -> Receipt {
        Receipt {
            call_id: [amount as u8; 32],
            sender: AccountId([1; 32]),
            instruction: "unstake".to_string(),
            effects: vec![
                Effect::Payment {
                    receiver: AccountId([1; 32]),
                    amount,
                },
                Effect::KeyDeregistration,
            ],
            state_root: [0; 32],
        }
    }

    #[test]
    fn paid_out_sums_payments_only() {
        assert_eq!(receipt(700).paid_out(), 700);
    }
}
