use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stakepool_execution::{create_pool, execute_call, ExecutionContext, PoolConfig};
use stakepool_types::constants::registry_allocation_cost;
use stakepool_types::{AccountId, Payment, PoolCall, PoolInstruction, PoolState};
use tracing::info;

/// A well-known account derived from a label, so every run of a devnet or
/// simulation agrees on identities without shipping key material.
pub fn derive_account(label: &str) -> AccountId {
    AccountId(*blake3::hash(format!("stakepool/{}", label).as_bytes()).as_bytes())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GenesisConfig {
    pub pool: AccountId,
    pub admin: AccountId,
    pub treasury: AccountId,
    pub staked_asset_id: u64,
    pub reward_asset_id: u64,
    pub min_stake_period: u64,
    pub reward_token_id: u64,
    pub commission_rate_bps: u64,
    /// Operating funds the admin deposits at initialization.
    pub init_deposit: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            pool: derive_account("pool"),
            admin: derive_account("admin"),
            treasury: derive_account("treasury"),
            staked_asset_id: 0,
            reward_asset_id: 0,
            min_stake_period: 0,
            reward_token_id: 0,
            commission_rate_bps: 10,
            init_deposit: 1_000_000,
        }
    }
}

/// Creates the pool, initializes it and allocates the staker registry, each
/// step going through the executor like any later call.
pub fn bootstrap_pool(genesis: &GenesisConfig, config: &PoolConfig) -> Result<PoolState> {
    let mut pool = create_pool(genesis.pool, genesis.admin, genesis.treasury).context("creating pool")?;
    let deposit = |amount: u64| Payment {
        sender: genesis.admin,
        receiver: genesis.pool,
        amount,
    };

    let steps = [
        (
            "initializing pool",
            PoolInstruction::InitPool {
                staked_asset_id: genesis.staked_asset_id,
                reward_asset_id: genesis.reward_asset_id,
                min_stake_period: genesis.min_stake_period,
                reward_token_id: genesis.reward_token_id,
                commission_rate_bps: genesis.commission_rate_bps,
                deposit: deposit(genesis.init_deposit),
            },
        ),
        (
            "allocating staker registry",
            PoolInstruction::AllocateRegistry {
                deposit: deposit(registry_allocation_cost()),
            },
        ),
    ];
    for (what, instruction) in steps {
        let mut ctx = ExecutionContext {
            pool: &mut pool,
            config,
        };
        execute_call(&PoolCall::new(genesis.admin, instruction), &mut ctx).context(what)?;
    }

    info!(
        pool = %genesis.pool,
        minimum_balance = pool.ledger.minimum_balance,
        commission_rate = genesis.commission_rate_bps,
        "genesis pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepool_types::PoolStatus;

    #[test]
    fn default_genesis_is_deterministic() {
        assert_eq!(GenesisConfig::default(), GenesisConfig::default());
        let genesis = GenesisConfig::default();
        assert_ne!(genesis.pool, genesis.admin);
        assert_ne!(genesis.admin, genesis.treasury);
    }

    #[test]
    fn bootstrap_produces_ready_pool() {
        let pool = bootstrap_pool(&GenesisConfig::default(), &PoolConfig::default()).unwrap();
        assert_eq!(pool.ledger.status, PoolStatus::Initialized);
        assert!(pool.registry_allocated());
        assert_eq!(pool.ledger.minimum_balance, 1_000_000 + registry_allocation_cost());
        assert_eq!(pool.balance, pool.ledger.minimum_balance);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn bootstrap_surfaces_bad_rate() {
        let genesis = GenesisConfig {
            commission_rate_bps: 150,
            ..GenesisConfig::default()
        };
        let err = bootstrap_pool(&genesis, &PoolConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "initializing pool");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let genesis: GenesisConfig = serde_json::from_str(r#"{ "commission_rate_bps": 7 }"#).unwrap();
        assert_eq!(genesis.commission_rate_bps, 7);
        assert_eq!(genesis.admin, derive_account("admin"));
    }
}
