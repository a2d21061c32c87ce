//! Reward injection: splitting newly arrived value into commission and net reward.
//!
//! Commission is `floor(arrived / 100) * rate`. The division happens before the
//! multiply, so `arrived = 150` at rate 10 yields 10, not 15.

use crate::error::{PoolError, Result};
use stakepool_types::constants::PERCENT_DENOMINATOR;
use stakepool_types::Ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardSplit {
    pub arrived: u64,
    pub commission: u64,
    pub net: u64,
    /// Whether `net` cleared the threshold and went into the reward pot.
    pub injected: bool,
}

/// Value on the pool account not yet claimed by the baseline, the reward pot or stakers.
///
/// Accrued commission is not subtracted. Until `PayCommission` sends it out it
/// sits on the account and is counted as arrived again, and commissioned again,
/// on every pickup. Paying it out therefore leaves the account short of the
/// committed total by the commission and injected reward that were booked
/// against the recounted amount, and pickup fails with
/// [`PoolError::InsufficientBalance`] until that much new value has arrived.
pub fn arrived_rewards(balance: u64, ledger: &Ledger) -> Result<u64> {
    let committed = (ledger.minimum_balance as u128)
        + (ledger.injected_rewards as u128)
        + (ledger.total_staked as u128);
    if (balance as u128) < committed {
        return Err(PoolError::InsufficientBalance {
            needed: u64::try_from(committed).unwrap_or(u64::MAX),
            available: balance,
        });
    }
    Ok(balance - committed as u64)
}

pub fn split_rewards(arrived: u64, commission_rate_bps: u64, threshold: u64) -> Result<RewardSplit> {
    let commission = (arrived / PERCENT_DENOMINATOR)
        .checked_mul(commission_rate_bps)
        .ok_or(PoolError::ArithmeticOverflow("commission"))?;
    let net = arrived
        .checked_sub(commission)
        .ok_or(PoolError::ArithmeticOverflow("net reward"))?;
    Ok(RewardSplit {
        arrived,
        commission,
        net,
        injected: net > threshold,
    })
}

pub struct RewardInjectionEngine<'a> {
    ledger: &'a mut Ledger,
    threshold: u64,
}

impl<'a> RewardInjectionEngine<'a> {
    pub fn new(ledger: &'a mut Ledger, threshold: u64) -> Self {
        Self { ledger, threshold }
    }

    /// Credits commission and, above the threshold, the net reward.
    pub fn pickup(&mut self, balance: u64) -> Result<RewardSplit> {
        let arrived = arrived_rewards(balance, &*self.ledger)?;
        let split = split_rewards(arrived, self.ledger.commission_rate_bps, self.threshold)?;

        let accrued = self
            .ledger
            .accrued_commission
            .checked_add(split.commission)
            .ok_or(PoolError::ArithmeticOverflow("accrued_commission"))?;
        let injected = if split.injected {
            self.ledger
                .injected_rewards
                .checked_add(split.net)
                .ok_or(PoolError::ArithmeticOverflow("injected_rewards"))?
        } else {
            self.ledger.injected_rewards
        };

        self.ledger.accrued_commission = accrued;
        self.ledger.injected_rewards = injected;
        Ok(split)
    }

    /// Marks `paid` of the accrued commission as sent to the treasury.
    pub fn settle_commission(&mut self, paid: u64) -> Result<()> {
        self.ledger.accrued_commission = self
            .ledger
            .accrued_commission
            .checked_sub(paid)
            .ok_or(PoolError::ArithmeticOverflow("accrued_commission"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepool_types::constants::MINIMUM_REWARD_THRESHOLD;

    #[test]
    fn truncates_before_multiplying() {
        let split = split_rewards(150, 10, MINIMUM_REWARD_THRESHOLD).unwrap();
        assert_eq!(split.commission, 10);
        assert_eq!(split.net, 140);
        assert!(!split.injected);
    }

    #[test]
    fn rate_above_hundred_underflows() {
        assert_eq!(
            split_rewards(1_000, 101, 0),
            Err(PoolError::ArithmeticOverflow("net reward"))
        );
    }

    #[test]
    fn dust_below_threshold_is_not_injected() {
        let mut ledger = Ledger {
            minimum_balance: 1_000,
            total_staked: 5_000,
            ..Ledger::default()
        };
        let mut engine = RewardInjectionEngine::new(&mut ledger, MINIMUM_REWARD_THRESHOLD);
        let split = engine.pickup(1_000 + 5_000 + 900_000).unwrap();
        assert_eq!(split.net, 900_000);
        assert!(!split.injected);
        assert_eq!(ledger.injected_rewards, 0);
        assert_eq!(ledger.accrued_commission, 0);
    }

    #[test]
    fn injects_net_above_threshold() {
        let mut ledger = Ledger {
            minimum_balance: 100,
            injected_rewards: 7,
            commission_rate_bps: 5,
            ..Ledger::default()
        };
        let mut engine = RewardInjectionEngine::new(&mut ledger, MINIMUM_REWARD_THRESHOLD);
        let split = engine.pickup(100 + 7 + 2_000_050).unwrap();
        assert_eq!(split.arrived, 2_000_050);
        assert_eq!(split.commission, 20_000 * 5);
        assert_eq!(split.net, 1_900_050);
        assert_eq!(ledger.injected_rewards, 7 + 1_900_050);
        assert_eq!(ledger.accrued_commission, 100_000);
    }

    #[test]
    fn balance_below_commitments_aborts() {
        let ledger = Ledger {
            minimum_balance: 10,
            total_staked: 10,
            ..Ledger::default()
        };
        assert_eq!(
            arrived_rewards(15, &ledger),
            Err(PoolError::InsufficientBalance { needed: 20, available: 15 })
        );
    }

    #[test]
    fn settle_reduces_accrued() {
        let mut ledger = Ledger {
            accrued_commission: 40,
            ..Ledger::default()
        };
        let mut engine = RewardInjectionEngine::new(&mut ledger, 0);
        engine.settle_commission(40).unwrap();
        assert!(engine.settle_commission(1).is_err());
        assert_eq!(ledger.accrued_commission, 0);
    }
}
