use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stakepool_execution::{execute_call, summary, ExecutionContext, PoolConfig};
use stakepool_genesis::{bootstrap_pool, derive_account, GenesisConfig};
use stakepool_storage::Storage;
use stakepool_types::{AccountId, Payment, PoolCall, PoolInstruction, PoolState, Receipt};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Staking pool simulation runner")]
struct Args {
    /// Distinct accounts that stake and unstake.
    #[arg(long, default_value_t = 120)]
    stakers: usize,
    /// Calls submitted by stakers.
    #[arg(long, default_value_t = 5_000)]
    rounds: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Rounds between consensus reward arrivals.
    #[arg(long, default_value_t = 250)]
    epoch_length: usize,
    #[arg(long, default_value_t = 4_000_000)]
    reward_per_epoch: u64,
    #[arg(long, default_value_t = 10)]
    commission_rate: u64,
    /// JSON file holding a `PoolConfig`; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    unmetered: bool,
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

#[derive(Debug, Default)]
struct Stats {
    committed: u64,
    aborted: BTreeMap<&'static str, u64>,
    staked_in: u64,
    paid_to_stakers: u64,
    paid_to_treasury: u64,
    rewards_arrived: u64,
}

struct Simulation {
    pool: PoolState,
    config: PoolConfig,
    admin: AccountId,
    stakers: Vec<AccountId>,
    storage: Storage,
    receipts: Vec<Receipt>,
    stats: Stats,
    rng: StdRng,
}

fn load_config(args: &Args) -> Result<PoolConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PoolConfig::default(),
    };
    if args.unmetered {
        config.budget = stakepool_execution::BudgetConfig::Unmetered;
    }
    config.validate().context("invalid pool config")?;
    Ok(config)
}

impl Simulation {
    fn new(args: &Args, config: PoolConfig) -> Result<Self> {
        let genesis = GenesisConfig {
            commission_rate_bps: args.commission_rate,
            ..GenesisConfig::default()
        };
        let pool = bootstrap_pool(&genesis, &config)?;
        let stakers = (0..args.stakers)
            .map(|i| derive_account(&format!("staker-{}", i)))
            .collect();
        Ok(Self {
            pool,
            config,
            admin: genesis.admin,
            stakers,
            storage: Storage::in_memory(),
            receipts: Vec::new(),
            stats: Stats::default(),
            rng: StdRng::seed_from_u64(args.seed),
        })
    }

    fn submit(&mut self, sender: AccountId, instruction: PoolInstruction) -> Result<()> {
        let call = PoolCall::new(sender, instruction);
        let staked = match &call.instruction {
            PoolInstruction::Stake { quantity, .. } => *quantity,
            _ => 0,
        };
        let result = {
            let mut ctx = ExecutionContext {
                pool: &mut self.pool,
                config: &self.config,
            };
            execute_call(&call, &mut ctx)
        };

        match result {
            Ok(receipt) => {
                self.stats.committed += 1;
                self.stats.staked_in += staked;
                if sender == self.admin {
                    self.stats.paid_to_treasury += receipt.paid_out();
                } else {
                    self.stats.paid_to_stakers += receipt.paid_out();
                }
                self.storage.save_receipt(&receipt)?;
                self.receipts.push(receipt);
            }
            Err(err) => {
                *self.stats.aborted.entry(err.kind()).or_default() += 1;
            }
        }

        self.pool
            .check_invariants()
            .with_context(|| format!("invariants broken after {}", call.instruction.name()))?;
        Ok(())
    }

    fn random_staker_call(&mut self) -> (AccountId, PoolInstruction) {
        let who = self.stakers[self.rng.gen_range(0..self.stakers.len())];
        if self.rng.gen_bool(0.6) {
            let amount = self.rng.gen_range(1_000..=500_000);
            let instruction = PoolInstruction::Stake {
                payment: Payment {
                    sender: who,
                    receiver: self.pool.address,
                    amount,
                },
                quantity: amount,
            };
            (who, instruction)
        } else {
            let percentage = if self.rng.gen_bool(0.3) {
                100
            } else {
                self.rng.gen_range(1..100)
            };
            (who, PoolInstruction::Unstake { percentage })
        }
    }

    fn run(&mut self, args: &Args) -> Result<()> {
        let epoch_length = args.epoch_length.max(1);
        for round in 0..args.rounds {
            let (sender, instruction) = self.random_staker_call();
            debug!(round, staker = %sender, instruction = instruction.name(), "submitting");
            self.submit(sender, instruction)?;

            if (round + 1) % epoch_length == 0 {
                self.pool.receive_external(args.reward_per_epoch);
                self.stats.rewards_arrived += args.reward_per_epoch;
                self.submit(self.admin, PoolInstruction::PickupRewards)?;
                if ((round + 1) / epoch_length) % 4 == 0 {
                    self.submit(self.admin, PoolInstruction::PayCommission)?;
                }
            }
        }
        Ok(())
    }

    /// Persists the final pool and checks it reloads to the same state root.
    fn persist(&self) -> Result<[u8; 32]> {
        self.storage.save_pool(&self.pool)?;
        let reloaded = self
            .storage
            .load_pool()?
            .context("pool missing after save")?;
        if reloaded != self.pool {
            bail!("reloaded pool differs from the live pool");
        }
        Ok(reloaded.root_hash())
    }
}

fn run_simulation(args: &Args) -> Result<(Stats, PoolState, [u8; 32])> {
    let config = load_config(args)?;
    let mut sim = Simulation::new(args, config)?;

    let start = Instant::now();
    sim.run(args)?;
    let elapsed = start.elapsed();
    let root = sim.persist()?;
    if let Some(last) = sim.receipts.last() {
        let stored = sim.storage.load_receipt(&last.call_id)?;
        if stored.as_ref() != Some(last) {
            bail!("receipt {} did not survive storage", hex::encode(last.call_id));
        }
    }

    info!(
        committed = sim.stats.committed,
        elapsed_ms = elapsed.as_millis() as u64,
        "simulation finished"
    );

    let view = summary(&sim.pool);
    println!("=== Staking Pool Simulation ===");
    println!("Stakers: {}", sim.stakers.len());
    println!("Rounds: {}", args.rounds);
    println!("Committed calls: {}", sim.stats.committed);
    for (kind, count) in &sim.stats.aborted {
        println!("Aborted ({}): {}", kind, count);
    }
    println!("Staked in: {}", sim.stats.staked_in);
    println!("Paid to stakers: {}", sim.stats.paid_to_stakers);
    println!("Rewards arrived: {}", sim.stats.rewards_arrived);
    println!("Commission paid: {}", sim.stats.paid_to_treasury);
    println!("Active stakers: {}", view.active_count);
    println!("Total staked: {}", view.total_staked);
    println!("Injected rewards: {}", view.injected_rewards);
    println!("Accrued commission: {}", view.accrued_commission);
    println!("Pool balance: {}", view.balance);
    println!("State root: {}", hex::encode(root));
    println!("Receipts stored: {}", sim.receipts.len());
    println!("Elapsed: {:.2?}", elapsed);

    Ok((sim.stats, sim.pool, root))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    run_simulation(&args).map(|_| ())
}
