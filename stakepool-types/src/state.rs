use crate::account::AccountId;
use crate::constants::MAX_STAKERS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StakeRecord {
    pub account: AccountId,
    pub stake: u64,
    /// Reserved for payout weighting; always zero.
    pub share_percentage: u64,
}

impl StakeRecord {
    pub const EMPTY: StakeRecord = StakeRecord {
        account: AccountId::ZERO,
        stake: 0,
        share_percentage: 0,
    };

    pub fn new(account: AccountId, stake: u64) -> Self {
        Self {
            account,
            stake,
            share_percentage: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.account.is_zero()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolStatus {
    /// Identities assigned, parameters not yet set.
    #[default]
    Created,
    Initialized,
    /// Torn down; every further call is rejected.
    Deleted,
}

/// Aggregate accounting counters and the pool's configuration scalars.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger {
    pub admin: AccountId,
    pub treasury: AccountId,
    pub status: PoolStatus,

    // === Init parameters ===
    pub staked_asset_id: u64,
    pub reward_asset_id: u64,
    pub min_stake_period: u64,
    pub reward_token_id: u64,

    // === Counters ===
    pub total_staked: u64,
    pub active_count: u64,
    pub injected_rewards: u64,
    pub accrued_commission: u64,
    /// Operating funds the host requires the pool to keep; never counted as rewards.
    pub minimum_balance: u64,
    /// Whole percent of each 100-unit block of arrived rewards kept as commission.
    pub commission_rate_bps: u64,
}

/// A single pool instance: its host account, ledger and staker registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub address: AccountId,
    /// Native balance held by the pool account on the host.
    pub balance: u64,
    pub ledger: Ledger,
    /// Empty until the registry is allocated, then exactly `MAX_STAKERS` slots.
    pub stakers: Vec<StakeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("registry has {0} slots, expected 0 or {}", MAX_STAKERS)]
    SlotCount(usize),
    #[error("active count {active} exceeds registry capacity")]
    ActiveCountOutOfRange { active: u64 },
    #[error("slot {0} inside the active prefix is empty")]
    GapInPrefix(usize),
    #[error("slot {0} beyond the active prefix is occupied")]
    OccupiedBeyondPrefix(usize),
    #[error("account {0} occupies more than one slot")]
    DuplicateAccount(AccountId),
    #[error("occupied stakes sum to {sum}, ledger says {total_staked}")]
    TotalMismatch { sum: u128, total_staked: u64 },
    #[error("reserved share field is set on slot {0}")]
    ReservedFieldSet(usize),
}

impl PoolState {
    pub fn new(address: AccountId, admin: AccountId, treasury: AccountId) -> Self {
        Self {
            address,
            balance: 0,
            ledger: Ledger {
                admin,
                treasury,
                ..Ledger::default()
            },
            stakers: Vec::new(),
        }
    }

    pub fn registry_allocated(&self) -> bool {
        !self.stakers.is_empty()
    }

    /// The occupied prefix `[0, active_count)`.
    pub fn occupied(&self) -> &[StakeRecord] {
        let active = (self.ledger.active_count as usize).min(self.stakers.len());
        &self.stakers[..active]
    }

    /// Value arriving on the host outside of any pool call, e.g. consensus rewards.
    pub fn receive_external(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn root_hash(&self) -> [u8; 32] {
        let encoded = bincode::serialize(self).expect("pool state serialization");
        *blake3::hash(&encoded).as_bytes()
    }

    /// Checks registry contiguity, uniqueness and the staked total against the ledger.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let active = self.ledger.active_count;
        if !self.registry_allocated() {
            if active != 0 || self.ledger.total_staked != 0 {
                return Err(InvariantViolation::ActiveCountOutOfRange { active });
            }
            return Ok(());
        }
        if self.stakers.len() != MAX_STAKERS {
            return Err(InvariantViolation::SlotCount(self.stakers.len()));
        }
        if active > MAX_STAKERS as u64 {
            return Err(InvariantViolation::ActiveCountOutOfRange { active });
        }

        let active = active as usize;
        let mut seen = std::collections::HashSet::with_capacity(active);
        let mut sum: u128 = 0;
        for (index, record) in self.stakers.iter().enumerate() {
            if index < active {
                if record.is_empty() {
                    return Err(InvariantViolation::GapInPrefix(index));
                }
                if !seen.insert(record.account) {
                    return Err(InvariantViolation::DuplicateAccount(record.account));
                }
                if record.share_percentage != 0 {
                    return Err(InvariantViolation::ReservedFieldSet(index));
                }
                sum += record.stake as u128;
            } else if !record.is_empty() {
                return Err(InvariantViolation::OccupiedBeyondPrefix(index));
            }
        }

        if sum != self.ledger.total_staked as u128 {
            return Err(InvariantViolation::TotalMismatch {
                sum,
                total_staked: self.ledger.total_staked,
            });
        }
        Ok(())
    }
}
