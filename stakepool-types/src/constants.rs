//! Pool-wide constants and the registry storage cost formula.

/// Number of slots in the staker registry.
pub const MAX_STAKERS: usize = 500;

/// Encoded size of one stake record: 32-byte account, stake, share percentage.
pub const RECORD_SIZE: usize = 32 + 8 + 8;

/// Storage key of the registry block. Its length is charged as overhead.
pub const REGISTRY_KEY: &[u8] = b"stakers";

/// Number of 8-byte slots reserved for the auxiliary index block.
pub const AUX_INDEX_SLOTS: u64 = 15;

/// Minimum balance the host requires of any account.
pub const ACCOUNT_MIN_BALANCE: u64 = 100_000;

/// Minimum balance increase for holding one asset.
pub const ASSET_HOLDING_FEE: u64 = 100_000;

/// Flat charge per storage block.
pub const STORAGE_FIXED_OVERHEAD: u64 = 2_500;

/// Charge per stored byte.
pub const STORAGE_PER_BYTE: u64 = 400;

/// Net rewards must exceed this to be credited to the reward pot.
pub const MINIMUM_REWARD_THRESHOLD: u64 = 1_000_000;

/// Exact payment required to opt the pool into an asset.
pub const ASSET_OPT_IN_FEE: u64 = 110_000;

/// Exact payment required to register consensus participation keys.
pub const CONSENSUS_FEE: u64 = 2_000_000;

/// Divisor for withdrawal percentages and the commission rate.
pub const PERCENT_DENOMINATOR: u64 = 100;

pub const fn cost_for_bytes(num_bytes: u64) -> u64 {
    STORAGE_FIXED_OVERHEAD + num_bytes * STORAGE_PER_BYTE
}

/// Deposit that `AllocateRegistry` must carry, to the unit.
pub const fn registry_allocation_cost() -> u64 {
    let key_len = REGISTRY_KEY.len() as u64;
    ACCOUNT_MIN_BALANCE
        + cost_for_bytes(key_len + (RECORD_SIZE * MAX_STAKERS) as u64)
        + cost_for_bytes(key_len + 8 * AUX_INDEX_SLOTS)
}
