use crate::error::{PoolError, Result};
use crate::frame::CallFrame;
use stakepool_types::constants::{
    registry_allocation_cost, ASSET_HOLDING_FEE, MAX_STAKERS, PERCENT_DENOMINATOR,
};
use stakepool_types::{Effect, Payment, PoolStatus, StakeRecord};
use tracing::info;

pub struct InitParams {
    pub staked_asset_id: u64,
    pub reward_asset_id: u64,
    pub min_stake_period: u64,
    pub reward_token_id: u64,
    pub commission_rate_bps: u64,
}

pub fn init_pool(frame: &mut CallFrame, params: InitParams, deposit: &Payment) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("initialize the pool")?;
    if frame.pool.ledger.status == PoolStatus::Initialized {
        return Err(PoolError::AlreadyInitialized("pool"));
    }
    ensure_rate(params.commission_rate_bps)?;
    let sender = frame.sender;
    frame.verify_payment(deposit, Some(&sender), deposit.amount)?;
    // a staked asset is booked as if the deposit were a plain init followed by opt_in_to_asset
    let minimum_balance = if params.staked_asset_id != 0 {
        let fee = frame.config.asset_opt_in_fee;
        deposit
            .amount
            .checked_sub(fee)
            .ok_or_else(|| {
                PoolError::PaymentMismatch(format!(
                    "deposit {} does not cover the asset opt-in fee {}",
                    deposit.amount, fee
                ))
            })?
            .checked_add(ASSET_HOLDING_FEE)
            .ok_or(PoolError::ArithmeticOverflow("minimum_balance"))?
    } else {
        deposit.amount
    };

    let ledger = &mut frame.pool.ledger;
    ledger.staked_asset_id = params.staked_asset_id;
    ledger.reward_asset_id = params.reward_asset_id;
    ledger.min_stake_period = params.min_stake_period;
    ledger.reward_token_id = params.reward_token_id;
    ledger.commission_rate_bps = params.commission_rate_bps;
    ledger.total_staked = 0;
    ledger.active_count = 0;
    ledger.injected_rewards = 0;
    ledger.accrued_commission = 0;
    ledger.minimum_balance = minimum_balance;
    ledger.status = PoolStatus::Initialized;
    frame.receive(deposit)?;

    if params.staked_asset_id != 0 {
        frame.emit(Effect::AssetOptIn {
            asset_id: params.staked_asset_id,
        });
    }
    info!(
        commission_rate = params.commission_rate_bps,
        minimum_balance,
        "pool initialized"
    );
    Ok(())
}

pub fn allocate_registry(frame: &mut CallFrame, deposit: &Payment) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("allocate the staker registry")?;
    if frame.pool.registry_allocated() {
        return Err(PoolError::AlreadyInitialized("staker registry"));
    }
    frame.ensure_initialized()?;
    let cost = registry_allocation_cost();
    let sender = frame.sender;
    frame.verify_payment(deposit, Some(&sender), cost)?;

    frame.pool.stakers = vec![StakeRecord::EMPTY; MAX_STAKERS];
    frame.pool.ledger.minimum_balance = frame
        .pool
        .ledger
        .minimum_balance
        .checked_add(cost)
        .ok_or(PoolError::ArithmeticOverflow("minimum_balance"))?;
    frame.receive(deposit)?;
    info!(cost, slots = MAX_STAKERS, "staker registry allocated");
    Ok(())
}

pub fn teardown_pool(frame: &mut CallFrame) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("tear down the pool")?;
    let ledger = &frame.pool.ledger;
    if frame.config.teardown_requires_empty && (ledger.total_staked != 0 || ledger.active_count != 0) {
        return Err(PoolError::StakeOutstanding {
            total_staked: ledger.total_staked,
            stakers: ledger.active_count,
        });
    }

    frame.pool.ledger.status = PoolStatus::Deleted;
    frame.emit(Effect::Teardown);
    info!(balance = frame.pool.balance, "pool torn down");
    Ok(())
}

/// The rate is applied per 100-unit block, so anything above 100 would take
/// more commission than arrived.
pub(crate) fn ensure_rate(commission_rate_bps: u64) -> Result<()> {
    if commission_rate_bps > PERCENT_DENOMINATOR {
        return Err(PoolError::InvalidInput(format!(
            "commission rate {} exceeds {}",
            commission_rate_bps, PERCENT_DENOMINATOR
        )));
    }
    Ok(())
}
