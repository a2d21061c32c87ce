#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use stakepool_execution::{create_pool, execute_call, ExecutionContext, PoolConfig};
use stakepool_types::constants::registry_allocation_cost;
use stakepool_types::{AccountId, Payment, PoolCall, PoolInstruction};

const POOL: AccountId = AccountId([0xF0; 32]);
const ADMIN: AccountId = AccountId([0xF1; 32]);

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Stake { who: u8, amount: u64, underpay: bool },
    Unstake { who: u8, percentage: u8 },
    Rewards { amount: u32 },
    PickupRewards,
    PayCommission,
    UpdateCommissionRate { rate: u8 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    commission_rate: u8,
    unmetered: bool,
    ops: Vec<FuzzOp>,
}

fn staker(who: u8) -> AccountId {
    // keep the set small so top-ups and removals actually collide
    AccountId([who % 32 + 1; 32])
}

fuzz_target!(|data: FuzzInput| {
    let config = if data.unmetered {
        PoolConfig::unmetered()
    } else {
        PoolConfig::default()
    };
    let Ok(mut pool) = create_pool(POOL, ADMIN, AccountId([0xF2; 32])) else {
        return;
    };
    let deposit = |amount| Payment {
        sender: ADMIN,
        receiver: POOL,
        amount,
    };

    let bootstrap = [
        PoolInstruction::InitPool {
            staked_asset_id: 0,
            reward_asset_id: 0,
            min_stake_period: 0,
            reward_token_id: 0,
            commission_rate_bps: u64::from(data.commission_rate % 101),
            deposit: deposit(1_000_000),
        },
        PoolInstruction::AllocateRegistry {
            deposit: deposit(registry_allocation_cost()),
        },
    ];
    for ix in bootstrap {
        let mut ctx = ExecutionContext { pool: &mut pool, config: &config };
        if execute_call(&PoolCall::new(ADMIN, ix), &mut ctx).is_err() {
            return;
        }
    }

    for op in data.ops.iter().take(256) {
        let call = match *op {
            FuzzOp::Stake { who, amount, underpay } => {
                let sender = staker(who);
                let quantity = amount % 10_000_000_000;
                PoolCall::new(
                    sender,
                    PoolInstruction::Stake {
                        payment: Payment {
                            sender,
                            receiver: POOL,
                            amount: if underpay { quantity / 2 } else { quantity },
                        },
                        quantity,
                    },
                )
            }
            FuzzOp::Unstake { who, percentage } => PoolCall::new(
                staker(who),
                PoolInstruction::Unstake {
                    percentage: u64::from(percentage),
                },
            ),
            FuzzOp::Rewards { amount } => {
                pool.receive_external(u64::from(amount));
                continue;
            }
            FuzzOp::PickupRewards => PoolCall::new(ADMIN, PoolInstruction::PickupRewards),
            FuzzOp::PayCommission => PoolCall::new(ADMIN, PoolInstruction::PayCommission),
            FuzzOp::UpdateCommissionRate { rate } => PoolCall::new(
                ADMIN,
                PoolInstruction::UpdateCommissionRate {
                    commission_rate_bps: u64::from(rate),
                },
            ),
        };

        let before = pool.clone();
        let result = {
            let mut ctx = ExecutionContext { pool: &mut pool, config: &config };
            execute_call(&call, &mut ctx)
        };
        if result.is_err() {
            assert_eq!(pool, before, "rejected call mutated the pool");
        }
        if let Err(violation) = pool.check_invariants() {
            panic!("invariant violated after {:?}: {}", op, violation);
        }
    }
});
