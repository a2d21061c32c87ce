use crate::error::{PoolError, Result};
use crate::frame::CallFrame;
use crate::registry::{Placement, StakerRegistry};
use crate::rewards::RewardInjectionEngine;
use stakepool_types::constants::PERCENT_DENOMINATOR;
use stakepool_types::Payment;
use tracing::{debug, info};

pub fn stake(frame: &mut CallFrame, payment: &Payment, quantity: u64) -> Result<()> {
    frame.ensure_initialized()?;
    if quantity == 0 {
        return Err(PoolError::InvalidInput("stake quantity must be positive".into()));
    }
    let sender = frame.sender;
    frame.verify_payment(payment, Some(&sender), quantity)?;

    let placement = {
        let mut registry = StakerRegistry::new(frame.pool, &mut frame.budget)?;
        registry.insert_or_top_up(&sender, quantity)?
    };
    frame.receive(payment)?;

    match placement {
        Placement::Inserted { index } => info!(staker = %sender, index, quantity, "staker added"),
        Placement::TopUp { index, stake } => {
            info!(staker = %sender, index, quantity, stake, "stake topped up")
        }
    }
    debug!(steps = frame.budget.steps(), top_ups = frame.budget.top_ups(), "stake scan");
    Ok(())
}

pub fn unstake(frame: &mut CallFrame, percentage: u64) -> Result<()> {
    frame.ensure_initialized()?;
    if !(1..=PERCENT_DENOMINATOR).contains(&percentage) {
        return Err(PoolError::InvalidInput(format!(
            "percentage {} outside [1, 100]",
            percentage
        )));
    }
    let sender = frame.sender;

    let withdrawal = {
        let mut registry = StakerRegistry::new(frame.pool, &mut frame.budget)?;
        registry.withdraw_partial(&sender, percentage)?
    };
    frame.pay(sender, withdrawal.paid)?;

    if withdrawal.removed {
        info!(
            staker = %sender,
            paid = withdrawal.paid,
            index = withdrawal.index,
            moved_from = ?withdrawal.moved_from,
            "staker removed"
        );
    } else {
        info!(
            staker = %sender,
            paid = withdrawal.paid,
            remaining = withdrawal.remaining,
            "partial unstake"
        );
    }
    Ok(())
}

pub fn pickup_rewards(frame: &mut CallFrame) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("pick up rewards")?;
    frame.ensure_initialized()?;

    let balance = frame.pool.balance;
    let threshold = frame.config.minimum_reward_threshold;
    let split = RewardInjectionEngine::new(&mut frame.pool.ledger, threshold).pickup(balance)?;
    info!(
        arrived = split.arrived,
        commission = split.commission,
        net = split.net,
        injected = split.injected,
        "rewards picked up"
    );
    Ok(())
}

pub fn pay_commission(frame: &mut CallFrame) -> Result<()> {
    frame.ensure_live()?;
    frame.ensure_admin("pay commission")?;
    frame.ensure_initialized()?;

    let amount = frame.pool.ledger.accrued_commission;
    if amount == 0 {
        return Err(PoolError::ZeroResult);
    }
    let treasury = frame.pool.ledger.treasury;
    let threshold = frame.config.minimum_reward_threshold;
    RewardInjectionEngine::new(&mut frame.pool.ledger, threshold).settle_commission(amount)?;
    frame.pay(treasury, amount)?;
    info!(treasury = %treasury, amount, "commission paid");
    Ok(())
}
