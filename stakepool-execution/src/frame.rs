use crate::budget::StepBudget;
use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use stakepool_types::{AccountId, Effect, Payment, PoolState, PoolStatus};

/// Working state of one call. `pool` is a staged copy; it only replaces the
/// live pool once the whole call has succeeded.
pub struct CallFrame<'a> {
    pub pool: &'a mut PoolState,
    pub config: &'a PoolConfig,
    pub budget: StepBudget,
    pub sender: AccountId,
    effects: Vec<Effect>,
}

impl<'a> CallFrame<'a> {
    pub fn new(pool: &'a mut PoolState, config: &'a PoolConfig, sender: AccountId) -> Self {
        Self {
            pool,
            config,
            budget: StepBudget::new(config.budget),
            sender,
            effects: Vec::new(),
        }
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }

    pub fn ensure_live(&self) -> Result<()> {
        if self.pool.ledger.status == PoolStatus::Deleted {
            return Err(PoolError::PoolDeleted);
        }
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        self.ensure_live()?;
        if self.pool.ledger.status != PoolStatus::Initialized {
            return Err(PoolError::NotInitialized("pool"));
        }
        Ok(())
    }

    pub fn ensure_admin(&self, action: &'static str) -> Result<()> {
        if self.sender != self.pool.ledger.admin {
            return Err(PoolError::Unauthorized { action });
        }
        Ok(())
    }

    /// A grouped payment must go to the pool, carry exactly `amount`, and when
    /// `from` is given, come from that account.
    pub fn verify_payment(&self, payment: &Payment, from: Option<&AccountId>, amount: u64) -> Result<()> {
        if payment.receiver != self.pool.address {
            return Err(PoolError::PaymentMismatch(format!(
                "receiver {} is not the pool account",
                payment.receiver
            )));
        }
        if let Some(expected) = from {
            if payment.sender != *expected {
                return Err(PoolError::PaymentMismatch(format!(
                    "sender {} does not match caller {}",
                    payment.sender, expected
                )));
            }
        }
        if payment.amount != amount {
            return Err(PoolError::PaymentMismatch(format!(
                "amount {} does not equal required {}",
                payment.amount, amount
            )));
        }
        Ok(())
    }

    /// Books a verified incoming payment onto the pool account.
    pub fn receive(&mut self, payment: &Payment) -> Result<()> {
        self.pool.balance = self
            .pool
            .balance
            .checked_add(payment.amount)
            .ok_or(PoolError::ArithmeticOverflow("pool balance"))?;
        Ok(())
    }

    /// Sends value out of the pool account.
    pub fn pay(&mut self, receiver: AccountId, amount: u64) -> Result<()> {
        self.spend(amount)?;
        self.effects.push(Effect::Payment { receiver, amount });
        Ok(())
    }

    /// Debits the pool account for a host fee that is not a payment to an account.
    pub fn spend(&mut self, amount: u64) -> Result<()> {
        self.pool.balance = self
            .pool
            .balance
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientBalance {
                needed: amount,
                available: self.pool.balance,
            })?;
        Ok(())
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}
