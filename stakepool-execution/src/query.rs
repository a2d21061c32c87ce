//! Read-only views. These run outside any call and are not metered.

use serde::{Deserialize, Serialize};
use stakepool_types::constants::registry_allocation_cost;
use stakepool_types::{AccountId, PoolState, PoolStatus, StakeRecord};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolSummary {
    pub status: PoolStatus,
    pub balance: u64,
    pub total_staked: u64,
    pub active_count: u64,
    pub injected_rewards: u64,
    pub accrued_commission: u64,
    pub minimum_balance: u64,
    pub commission_rate_bps: u64,
    pub registry_allocated: bool,
    /// Deposit `AllocateRegistry` requires.
    pub allocation_cost: u64,
}

/// The caller's record and slot, if it has one.
pub fn staker(pool: &PoolState, id: &AccountId) -> Option<(StakeRecord, usize)> {
    pool.occupied()
        .iter()
        .enumerate()
        .find(|(_, record)| record.account == *id)
        .map(|(index, record)| (*record, index))
}

pub fn summary(pool: &PoolState) -> PoolSummary {
    let ledger = &pool.ledger;
    PoolSummary {
        status: ledger.status,
        balance: pool.balance,
        total_staked: ledger.total_staked,
        active_count: ledger.active_count,
        injected_rewards: ledger.injected_rewards,
        accrued_commission: ledger.accrued_commission,
        minimum_balance: ledger.minimum_balance,
        commission_rate_bps: ledger.commission_rate_bps,
        registry_allocated: pool.registry_allocated(),
        allocation_cost: registry_allocation_cost(),
    }
}
