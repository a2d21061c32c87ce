//! Per-call computation allowance for registry scans.
//!
//! Every loop step over the registry calls [`StepBudget::checkpoint`]. When the
//! remaining allowance has dropped below the configured threshold the guard
//! asks the host for a top-up first; once the host's top-ups are used up the
//! call aborts with `BudgetExhausted` instead of running dry mid-mutation.

use crate::config::BudgetConfig;
use crate::error::{PoolError, Result};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StepBudget {
    config: BudgetConfig,
    remaining: u64,
    top_ups: u64,
    steps: u64,
}

impl StepBudget {
    pub fn new(config: BudgetConfig) -> Self {
        let remaining = match config {
            BudgetConfig::Unmetered => u64::MAX,
            BudgetConfig::Metered {
                initial_allowance, ..
            } => initial_allowance,
        };
        Self {
            config,
            remaining,
            top_ups: 0,
            steps: 0,
        }
    }

    pub fn unmetered() -> Self {
        Self::new(BudgetConfig::Unmetered)
    }

    pub fn checkpoint(&mut self) -> Result<()> {
        self.steps += 1;
        let BudgetConfig::Metered {
            checkpoint_threshold,
            top_up,
            max_top_ups,
            step_cost,
            ..
        } = self.config
        else {
            return Ok(());
        };

        if self.remaining < checkpoint_threshold {
            if self.top_ups >= max_top_ups {
                return Err(PoolError::BudgetExhausted { steps: self.steps });
            }
            self.top_ups += 1;
            self.remaining = self.remaining.saturating_add(top_up);
            debug!(top_ups = self.top_ups, remaining = self.remaining, "step budget topped up");
        }

        self.remaining = self
            .remaining
            .checked_sub(step_cost)
            .ok_or(PoolError::BudgetExhausted { steps: self.steps })?;
        Ok(())
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn top_ups(&self) -> u64 {
        self.top_ups
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metered(max_top_ups: u64) -> StepBudget {
        StepBudget::new(BudgetConfig::Metered {
            initial_allowance: 100,
            checkpoint_threshold: 30,
            top_up: 100,
            max_top_ups,
            step_cost: 30,
        })
    }

    #[test]
    fn tops_up_below_threshold() {
        let mut budget = metered(1);
        budget.checkpoint().unwrap(); // 70
        budget.checkpoint().unwrap(); // 40
        budget.checkpoint().unwrap(); // 10
        assert_eq!(budget.top_ups(), 0);
        budget.checkpoint().unwrap(); // 110 -> 80
        assert_eq!(budget.top_ups(), 1);
        assert_eq!(budget.remaining(), 80);
        assert_eq!(budget.steps(), 4);
    }

    #[test]
    fn exhausts_once_top_ups_run_out() {
        let mut budget = metered(0);
        for _ in 0..3 {
            budget.checkpoint().unwrap();
        }
        assert_eq!(
            budget.checkpoint(),
            Err(PoolError::BudgetExhausted { steps: 4 })
        );
    }

    #[test]
    fn unmetered_never_fails() {
        let mut budget = StepBudget::unmetered();
        for _ in 0..10_000 {
            budget.checkpoint().unwrap();
        }
        assert_eq!(budget.steps(), 10_000);
        assert_eq!(budget.top_ups(), 0);
    }
}
