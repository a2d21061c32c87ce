pub mod budget;
pub mod config;
pub mod error;
pub mod frame;
pub mod instructions;
pub mod math;
pub mod query;
pub mod registry;
pub mod rewards;
pub mod shared;

pub use config::{BudgetConfig, PoolConfig};
pub use error::PoolError;
pub use frame::CallFrame;
pub use query::{staker, summary, PoolSummary};
pub use shared::SharedPool;

use instructions::admin::{self, ConsensusKeys};
use instructions::lifecycle::{self, InitParams};
use instructions::staking;
use stakepool_types::{AccountId, PoolCall, PoolInstruction, PoolState, Receipt};
use tracing::{info, warn};

pub struct ExecutionContext<'a> {
    pub pool: &'a mut PoolState,
    pub config: &'a PoolConfig,
}

/// Runs one call as an all-or-nothing step.
///
/// The instruction executes against a staged copy of the pool. On success the
/// copy replaces the live pool and a receipt listing the host effects is
/// returned; on any error the live pool is left exactly as it was.
pub fn execute_call(call: &PoolCall, ctx: &mut ExecutionContext) -> Result<Receipt, PoolError> {
    let call_id = call.id();
    let mut staged = ctx.pool.clone();

    let outcome = {
        let mut frame = CallFrame::new(&mut staged, ctx.config, call.sender);
        execute_instruction(&call.instruction, &mut frame).map(|()| {
            let steps = frame.budget.steps();
            (frame.into_effects(), steps)
        })
    };

    match outcome {
        Ok((effects, steps)) => {
            *ctx.pool = staged;
            let receipt = Receipt {
                call_id,
                sender: call.sender,
                instruction: call.instruction.name().to_string(),
                effects,
                state_root: ctx.pool.root_hash(),
            };
            info!(
                call = %hex::encode(&call_id[..8]),
                instruction = call.instruction.name(),
                sender = %call.sender,
                admin_only = call.instruction.is_admin_only(),
                steps,
                effects = receipt.effects.len(),
                "call committed"
            );
            Ok(receipt)
        }
        Err(err) => {
            warn!(
                call = %hex::encode(&call_id[..8]),
                instruction = call.instruction.name(),
                sender = %call.sender,
                kind = err.kind(),
                error = %err,
                "call aborted"
            );
            Err(err)
        }
    }
}

pub fn execute_instruction(ix: &PoolInstruction, frame: &mut CallFrame) -> Result<(), PoolError> {
    match ix {
        PoolInstruction::InitPool {
            staked_asset_id,
            reward_asset_id,
            min_stake_period,
            reward_token_id,
            commission_rate_bps,
            deposit,
        } => {
            let params = InitParams {
                staked_asset_id: *staked_asset_id,
                reward_asset_id: *reward_asset_id,
                min_stake_period: *min_stake_period,
                reward_token_id: *reward_token_id,
                commission_rate_bps: *commission_rate_bps,
            };
            lifecycle::init_pool(frame, params, deposit)
        }
        PoolInstruction::AllocateRegistry { deposit } => lifecycle::allocate_registry(frame, deposit),
        PoolInstruction::TeardownPool => lifecycle::teardown_pool(frame),

        PoolInstruction::UpdateAdmin { admin } => admin::update_admin(frame, admin),
        PoolInstruction::UpdateTreasury { treasury } => admin::update_treasury(frame, treasury),
        PoolInstruction::UpdateCommissionRate { commission_rate_bps } => {
            admin::update_commission_rate(frame, *commission_rate_bps)
        }
        PoolInstruction::OptInToAsset { payment, asset_id } => {
            admin::opt_in_to_asset(frame, payment, *asset_id)
        }
        PoolInstruction::RegisterForConsensus {
            fee,
            vote_pk,
            selection_pk,
            state_proof_pk,
            vote_first,
            vote_last,
            key_dilution,
        } => {
            let keys = ConsensusKeys {
                vote_pk: vote_pk.clone(),
                selection_pk: selection_pk.clone(),
                state_proof_pk: state_proof_pk.clone(),
                vote_first: *vote_first,
                vote_last: *vote_last,
                key_dilution: *key_dilution,
            };
            admin::register_for_consensus(frame, fee, keys)
        }
        PoolInstruction::DeregisterFromConsensus => admin::deregister_from_consensus(frame),
        PoolInstruction::LinkExternalName {
            name_app_id,
            name,
            registry_app_id,
        } => admin::link_external_name(frame, *name_app_id, name, *registry_app_id),

        PoolInstruction::Stake { payment, quantity } => staking::stake(frame, payment, *quantity),
        PoolInstruction::Unstake { percentage } => staking::unstake(frame, *percentage),
        PoolInstruction::PickupRewards => staking::pickup_rewards(frame),
        PoolInstruction::PayCommission => staking::pay_commission(frame),
    }
}

/// Creates a pool with its identities set; every other lifecycle step is a call.
pub fn create_pool(address: AccountId, admin: AccountId, treasury: AccountId) -> Result<PoolState, PoolError> {
    if address.is_zero() || admin.is_zero() || treasury.is_zero() {
        return Err(PoolError::InvalidInput(
            "pool, admin and treasury accounts must be non-zero".into(),
        ));
    }
    info!(pool = %address, admin = %admin, treasury = %treasury, "pool created");
    Ok(PoolState::new(address, admin, treasury))
}
