use proptest::prelude::*;
use stakepool_execution::{create_pool, execute_call, ExecutionContext, PoolConfig, PoolError};
use stakepool_types::constants::registry_allocation_cost;
use stakepool_types::{AccountId, Payment, PoolCall, PoolInstruction, PoolState};

const POOL: AccountId = AccountId([0xE0; 32]);
const ADMIN: AccountId = AccountId([0xE1; 32]);

#[derive(Debug, Clone)]
enum Op {
    Stake { who: u8, amount: u64 },
    Unstake { who: u8, percentage: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..=24, 1u64..=1_000_000).prop_map(|(who, amount)| Op::Stake { who, amount }),
        (1u8..=24, 1u64..=100).prop_map(|(who, percentage)| Op::Unstake { who, percentage }),
    ]
}

fn bootstrap(config: &PoolConfig) -> PoolState {
    let mut pool = create_pool(POOL, ADMIN, AccountId([0xE2; 32])).unwrap();
    let deposit = |amount| Payment {
        sender: ADMIN,
        receiver: POOL,
        amount,
    };
    for ix in [
        PoolInstruction::InitPool {
            staked_asset_id: 0,
            reward_asset_id: 0,
            min_stake_period: 0,
            reward_token_id: 0,
            commission_rate_bps: 5,
            deposit: deposit(1_000_000),
        },
        PoolInstruction::AllocateRegistry {
            deposit: deposit(registry_allocation_cost()),
        },
    ] {
        let mut ctx = ExecutionContext {
            pool: &mut pool,
            config,
        };
        execute_call(&PoolCall::new(ADMIN, ix), &mut ctx).unwrap();
    }
    pool
}

fn to_call(op: &Op) -> PoolCall {
    match *op {
        Op::Stake { who, amount } => {
            let sender = AccountId([who; 32]);
            PoolCall::new(
                sender,
                PoolInstruction::Stake {
                    payment: Payment {
                        sender,
                        receiver: POOL,
                        amount,
                    },
                    quantity: amount,
                },
            )
        }
        Op::Unstake { who, percentage } => {
            PoolCall::new(AccountId([who; 32]), PoolInstruction::Unstake { percentage })
        }
    }
}

proptest! {
    /// Any interleaving of stakes and unstakes keeps the registry packed and
    /// the ledger equal to the sum of the records; rejected calls change nothing.
    #[test]
    fn prop_registry_stays_consistent(ops in prop::collection::vec(op(), 1..120)) {
        let config = PoolConfig::default();
        let mut pool = bootstrap(&config);
        let baseline = pool.ledger.minimum_balance;

        for op in &ops {
            let before = pool.clone();
            let result = {
                let mut ctx = ExecutionContext { pool: &mut pool, config: &config };
                execute_call(&to_call(op), &mut ctx)
            };
            match result {
                Ok(receipt) => prop_assert_eq!(receipt.state_root, pool.root_hash()),
                Err(err) => {
                    prop_assert!(matches!(
                        err,
                        PoolError::NotFound(_) | PoolError::ZeroResult
                    ), "unexpected error {:?}", err);
                    prop_assert_eq!(&pool, &before);
                }
            }

            prop_assert!(pool.check_invariants().is_ok());
            let sum: u64 = pool.occupied().iter().map(|r| r.stake).sum();
            prop_assert_eq!(sum, pool.ledger.total_staked);
            prop_assert_eq!(pool.balance, baseline + pool.ledger.total_staked);
        }
    }

    #[test]
    fn prop_partial_unstake_pays_floor(stake in 1u64..=u64::MAX / 2, percentage in 1u64..=99) {
        let config = PoolConfig::unmetered();
        let mut pool = bootstrap(&config);
        let who = 7u8;
        let mut ctx = ExecutionContext { pool: &mut pool, config: &config };
        execute_call(&to_call(&Op::Stake { who, amount: stake }), &mut ctx).unwrap();

        let expected = (stake as u128 * percentage as u128 / 100) as u64;
        match execute_call(&to_call(&Op::Unstake { who, percentage }), &mut ctx) {
            Ok(receipt) => {
                prop_assert_eq!(receipt.paid_out(), expected);
                prop_assert_eq!(pool.stakers[0].stake, stake - expected);
            }
            Err(err) => {
                prop_assert_eq!(expected, 0);
                prop_assert_eq!(err, PoolError::ZeroResult);
            }
        }
    }
}
