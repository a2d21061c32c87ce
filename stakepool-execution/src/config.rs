use crate::error::{PoolError, Result};
use serde::{Deserialize, Serialize};
use stakepool_types::constants::{ASSET_OPT_IN_FEE, CONSENSUS_FEE, MINIMUM_REWARD_THRESHOLD};

/// How registry scans are metered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BudgetConfig {
    /// No allowance tracking; scans are bounded by `MAX_STAKERS` alone.
    Unmetered,
    Metered {
        /// Allowance a call starts with.
        initial_allowance: u64,
        /// Below this the next checkpoint requests a top-up.
        checkpoint_threshold: u64,
        /// Allowance granted per top-up.
        top_up: u64,
        /// Top-ups the host grants per call.
        max_top_ups: u64,
        /// Allowance consumed by one loop step.
        step_cost: u64,
    },
}

impl Default for BudgetConfig {
    fn default() -> Self {
        BudgetConfig::Metered {
            initial_allowance: 700,
            checkpoint_threshold: 300,
            top_up: 700,
            max_top_ups: 255,
            step_cost: 40,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    pub budget: BudgetConfig,
    pub minimum_reward_threshold: u64,
    pub asset_opt_in_fee: u64,
    pub consensus_fee: u64,
    /// Refuse teardown while any stake is outstanding.
    pub teardown_requires_empty: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            budget: BudgetConfig::default(),
            minimum_reward_threshold: MINIMUM_REWARD_THRESHOLD,
            asset_opt_in_fee: ASSET_OPT_IN_FEE,
            consensus_fee: CONSENSUS_FEE,
            teardown_requires_empty: true,
        }
    }
}

impl PoolConfig {
    pub fn unmetered() -> Self {
        Self {
            budget: BudgetConfig::Unmetered,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let BudgetConfig::Metered {
            checkpoint_threshold,
            top_up,
            step_cost,
            ..
        } = self.budget
        {
            if step_cost == 0 {
                return Err(PoolError::InvalidConfig("step_cost must be positive".into()));
            }
            if checkpoint_threshold < step_cost {
                return Err(PoolError::InvalidConfig(format!(
                    "checkpoint_threshold {} is below step_cost {}",
                    checkpoint_threshold, step_cost
                )));
            }
            if top_up < step_cost {
                return Err(PoolError::InvalidConfig(format!(
                    "top_up {} is below step_cost {}",
                    top_up, step_cost
                )));
            }
        }
        Ok(())
    }
}
