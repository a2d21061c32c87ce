//! Fixed-capacity staker registry.
//!
//! Occupied slots always form the prefix `[0, active_count)`. Insertion
//! therefore lands on slot `active_count`, and removal fills the hole with the
//! last occupied record so no gap ever opens inside the prefix. The ledger's
//! `total_staked` and `active_count` move in the same step as the slots.

use crate::budget::StepBudget;
use crate::error::{PoolError, Result};
use crate::math::wide_ratio;
use stakepool_types::constants::PERCENT_DENOMINATOR;
use stakepool_types::{AccountId, Ledger, PoolState, StakeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Added to an existing record; `stake` is the new balance.
    TopUp { index: usize, stake: u64 },
    Inserted { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub paid: u64,
    pub index: usize,
    /// Stake left on the record; zero once removed.
    pub remaining: u64,
    pub removed: bool,
    /// Slot whose record was moved into `index` to close the gap.
    pub moved_from: Option<usize>,
}

pub struct StakerRegistry<'a> {
    stakers: &'a mut [StakeRecord],
    ledger: &'a mut Ledger,
    budget: &'a mut StepBudget,
}

impl<'a> StakerRegistry<'a> {
    pub fn new(pool: &'a mut PoolState, budget: &'a mut StepBudget) -> Result<Self> {
        if !pool.registry_allocated() {
            return Err(PoolError::NotInitialized("staker registry"));
        }
        Ok(Self {
            stakers: &mut pool.stakers,
            ledger: &mut pool.ledger,
            budget,
        })
    }

    fn active(&self) -> usize {
        self.ledger.active_count as usize
    }

    /// Linear scan over the occupied prefix.
    pub fn find_by_account(&mut self, id: &AccountId) -> Result<(StakeRecord, usize)> {
        for index in 0..self.active() {
            self.budget.checkpoint()?;
            if self.stakers[index].account == *id {
                return Ok((self.stakers[index], index));
            }
        }
        Err(PoolError::NotFound(*id))
    }

    pub fn insert_or_top_up(&mut self, id: &AccountId, amount: u64) -> Result<Placement> {
        if id.is_zero() {
            return Err(PoolError::InvalidInput(
                "the zero account cannot hold stake".into(),
            ));
        }
        let total_staked = self
            .ledger
            .total_staked
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow("total_staked"))?;

        for index in 0..self.stakers.len() {
            self.budget.checkpoint()?;
            let slot = &mut self.stakers[index];

            if slot.account == *id {
                slot.stake = slot
                    .stake
                    .checked_add(amount)
                    .ok_or(PoolError::ArithmeticOverflow("stake"))?;
                self.ledger.total_staked = total_staked;
                return Ok(Placement::TopUp {
                    index,
                    stake: slot.stake,
                });
            }

            if slot.is_empty() {
                // contiguity: the first empty slot is always `active_count`
                debug_assert_eq!(index, self.ledger.active_count as usize);
                *slot = StakeRecord::new(*id, amount);
                self.ledger.total_staked = total_staked;
                self.ledger.active_count += 1;
                return Ok(Placement::Inserted { index });
            }
        }

        Err(PoolError::RegistryFull)
    }

    /// Pays out `floor(stake * percent / 100)`; `percent == 100` removes the record.
    pub fn withdraw_partial(&mut self, id: &AccountId, percent: u64) -> Result<Withdrawal> {
        if !(1..=PERCENT_DENOMINATOR).contains(&percent) {
            return Err(PoolError::InvalidInput(format!(
                "percentage {} outside [1, 100]",
                percent
            )));
        }

        let (record, index) = self.find_by_account(id)?;
        if record.stake == 0 {
            return Err(PoolError::NoStake(*id));
        }
        let paid = wide_ratio(record.stake, percent, PERCENT_DENOMINATOR)?;
        if paid == 0 {
            return Err(PoolError::ZeroResult);
        }
        self.ledger.total_staked = self
            .ledger
            .total_staked
            .checked_sub(paid)
            .ok_or(PoolError::ArithmeticOverflow("total_staked"))?;

        if percent == PERCENT_DENOMINATOR {
            self.budget.checkpoint()?;
            let last = self.active() - 1;
            let moved_from = if index != last {
                self.stakers[index] = self.stakers[last];
                Some(last)
            } else {
                None
            };
            self.stakers[last] = StakeRecord::EMPTY;
            self.ledger.active_count -= 1;
            return Ok(Withdrawal {
                paid,
                index,
                remaining: 0,
                removed: true,
                moved_from,
            });
        }

        let remaining = record.stake - paid;
        self.stakers[index].stake = remaining;
        Ok(Withdrawal {
            paid,
            index,
            remaining,
            removed: false,
            moved_from: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepool_types::constants::MAX_STAKERS;

    fn pool() -> PoolState {
        let mut pool = PoolState::new(AccountId([0xA0; 32]), AccountId([0xA1; 32]), AccountId([0xA2; 32]));
        pool.stakers = vec![StakeRecord::EMPTY; MAX_STAKERS];
        pool
    }

    fn id(n: u16) -> AccountId {
        let mut bytes = [0u8; 32];
        bytes[..2].copy_from_slice(&n.to_be_bytes());
        bytes[31] = 1;
        AccountId(bytes)
    }

    #[test]
    fn rejects_unallocated_registry() {
        let mut pool = PoolState::new(AccountId([1; 32]), AccountId([2; 32]), AccountId([3; 32]));
        let mut budget = StepBudget::unmetered();
        assert!(matches!(
            StakerRegistry::new(&mut pool, &mut budget),
            Err(PoolError::NotInitialized(_))
        ));
    }

    #[test]
    fn insert_then_top_up() {
        let mut pool = pool();
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();

        assert_eq!(registry.insert_or_top_up(&id(1), 100).unwrap(), Placement::Inserted { index: 0 });
        assert_eq!(registry.insert_or_top_up(&id(2), 50).unwrap(), Placement::Inserted { index: 1 });
        assert_eq!(
            registry.insert_or_top_up(&id(1), 25).unwrap(),
            Placement::TopUp { index: 0, stake: 125 }
        );
        assert_eq!(registry.find_by_account(&id(2)).unwrap(), (StakeRecord::new(id(2), 50), 1));
        assert_eq!(registry.find_by_account(&id(3)), Err(PoolError::NotFound(id(3))));

        assert_eq!(pool.ledger.active_count, 2);
        assert_eq!(pool.ledger.total_staked, 175);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn zero_account_is_refused() {
        let mut pool = pool();
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();
        assert!(matches!(
            registry.insert_or_top_up(&AccountId::ZERO, 10),
            Err(PoolError::InvalidInput(_))
        ));
    }

    #[test]
    fn full_registry_rejects_new_accounts_but_tops_up() {
        let mut pool = pool();
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();
        for n in 0..MAX_STAKERS as u16 {
            registry.insert_or_top_up(&id(n), 1).unwrap();
        }
        assert_eq!(registry.insert_or_top_up(&id(9_999), 1), Err(PoolError::RegistryFull));
        assert!(matches!(
            registry.insert_or_top_up(&id(499), 1).unwrap(),
            Placement::TopUp { index: 499, stake: 2 }
        ));
    }

    #[test]
    fn removal_swaps_last_record_into_hole() {
        let mut pool = pool();
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();
        for n in 0..5 {
            registry.insert_or_top_up(&id(n), 100 + n as u64).unwrap();
        }

        let withdrawal = registry.withdraw_partial(&id(1), 100).unwrap();
        assert_eq!(
            withdrawal,
            Withdrawal { paid: 101, index: 1, remaining: 0, removed: true, moved_from: Some(4) }
        );

        assert_eq!(pool.stakers[1], StakeRecord::new(id(4), 104));
        assert_eq!(pool.stakers[4], StakeRecord::EMPTY);
        assert_eq!(pool.stakers[0], StakeRecord::new(id(0), 100));
        assert_eq!(pool.stakers[2], StakeRecord::new(id(2), 102));
        assert_eq!(pool.stakers[3], StakeRecord::new(id(3), 103));
        assert_eq!(pool.ledger.active_count, 4);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn removing_last_record_just_clears_it() {
        let mut pool = pool();
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();
        registry.insert_or_top_up(&id(0), 10).unwrap();
        registry.insert_or_top_up(&id(1), 20).unwrap();

        let withdrawal = registry.withdraw_partial(&id(1), 100).unwrap();
        assert_eq!(withdrawal.moved_from, None);
        assert_eq!(pool.stakers[1], StakeRecord::EMPTY);
        assert_eq!(pool.ledger.active_count, 1);
        assert_eq!(pool.ledger.total_staked, 10);
    }

    #[test]
    fn partial_withdrawal_floors_and_keeps_record() {
        let mut pool = pool();
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();
        registry.insert_or_top_up(&id(0), 999).unwrap();

        let withdrawal = registry.withdraw_partial(&id(0), 33).unwrap();
        assert_eq!(withdrawal.paid, 329);
        assert_eq!(withdrawal.remaining, 670);
        assert!(!withdrawal.removed);
        assert_eq!(pool.ledger.total_staked, 670);
        assert_eq!(pool.ledger.active_count, 1);
    }

    #[test]
    fn withdrawal_errors() {
        let mut pool = pool();
        pool.stakers[0] = StakeRecord::new(id(0), 0);
        pool.stakers[1] = StakeRecord::new(id(1), 1);
        pool.ledger.active_count = 2;
        pool.ledger.total_staked = 1;
        let mut budget = StepBudget::unmetered();
        let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();

        assert!(matches!(registry.withdraw_partial(&id(1), 0), Err(PoolError::InvalidInput(_))));
        assert!(matches!(registry.withdraw_partial(&id(1), 101), Err(PoolError::InvalidInput(_))));
        assert_eq!(registry.withdraw_partial(&id(7), 50), Err(PoolError::NotFound(id(7))));
        assert_eq!(registry.withdraw_partial(&id(0), 50), Err(PoolError::NoStake(id(0))));
        assert_eq!(registry.withdraw_partial(&id(1), 99), Err(PoolError::ZeroResult));
    }

    #[test]
    fn metered_scan_checkpoints_every_step() {
        let mut pool = pool();
        let mut budget = StepBudget::new(crate::config::BudgetConfig::default());
        {
            let mut registry = StakerRegistry::new(&mut pool, &mut budget).unwrap();
            for n in 0..20 {
                registry.insert_or_top_up(&id(n), 1).unwrap();
            }
        }
        // inserting the n-th staker scans n + 1 slots
        assert_eq!(budget.steps(), (1..=20).sum::<u64>());
        assert!(budget.top_ups() > 0);
    }
}
