use crate::account::AccountId;
use serde::{Deserialize, Serialize};

/// A value transfer grouped with a call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: u64,
}

/// Every call a pool accepts after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PoolInstruction {
    // ══════════════════════════════════════════════════════════════
    // Lifecycle
    // ══════════════════════════════════════════════════════════════
    InitPool {
        staked_asset_id: u64,
        reward_asset_id: u64,
        min_stake_period: u64,
        reward_token_id: u64,
        commission_rate_bps: u64,
        deposit: Payment,
    },
    AllocateRegistry { deposit: Payment },
    TeardownPool,

    // ══════════════════════════════════════════════════════════════
    // Administration
    // ══════════════════════════════════════════════════════════════
    UpdateAdmin { admin: AccountId },
    UpdateTreasury { treasury: AccountId },
    UpdateCommissionRate { commission_rate_bps: u64 },
    OptInToAsset { payment: Payment, asset_id: u64 },
    RegisterForConsensus {
        fee: Payment,
        vote_pk: Vec<u8>,
        selection_pk: Vec<u8>,
        state_proof_pk: Vec<u8>,
        vote_first: u64,
        vote_last: u64,
        key_dilution: u64,
    },
    DeregisterFromConsensus,
    LinkExternalName {
        name_app_id: u64,
        name: String,
        registry_app_id: u64,
    },

    // ══════════════════════════════════════════════════════════════
    // Staking
    // ══════════════════════════════════════════════════════════════
    Stake { payment: Payment, quantity: u64 },
    Unstake { percentage: u64 },
    PickupRewards,
    PayCommission,
}

impl PoolInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            PoolInstruction::InitPool { .. } => "init_pool",
            PoolInstruction::AllocateRegistry { .. } => "allocate_registry",
            PoolInstruction::TeardownPool => "teardown_pool",
            PoolInstruction::UpdateAdmin { .. } => "update_admin",
            PoolInstruction::UpdateTreasury { .. } => "update_treasury",
            PoolInstruction::UpdateCommissionRate { .. } => "update_commission_rate",
            PoolInstruction::OptInToAsset { .. } => "opt_in_to_asset",
            PoolInstruction::RegisterForConsensus { .. } => "register_for_consensus",
            PoolInstruction::DeregisterFromConsensus => "deregister_from_consensus",
            PoolInstruction::LinkExternalName { .. } => "link_external_name",
            PoolInstruction::Stake { .. } => "stake",
            PoolInstruction::Unstake { .. } => "unstake",
            PoolInstruction::PickupRewards => "pickup_rewards",
            PoolInstruction::PayCommission => "pay_commission",
        }
    }

    pub fn is_admin_only(&self) -> bool {
        !matches!(
            self,
            PoolInstruction::Stake { .. } | PoolInstruction::Unstake { .. }
        )
    }
}
