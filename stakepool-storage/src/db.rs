use crate::backend::{KvBackend, MemoryBackend};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use stakepool_types::layout::{decode_registry, encode_registry};
use stakepool_types::{AccountId, Ledger, PoolState, Receipt};
use tracing::debug;

const LEDGER_KEY: &[u8] = b"ledger";
const ACCOUNT_KEY: &[u8] = b"account";
const ROOT_KEY: &[u8] = b"state_root";

#[derive(Serialize, Deserialize)]
struct AccountRecord {
    address: AccountId,
    balance: u64,
}

pub struct Storage<B: KvBackend = MemoryBackend> {
    pub backend: B,
}

impl Storage<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self {
            backend: MemoryBackend::new(),
        }
    }
}

#[cfg(feature = "rocksdb")]
impl Storage<crate::backend::RocksBackend> {
    pub fn new(path: &str) -> Result<Self> {
        Ok(Self {
            backend: crate::backend::RocksBackend::open(path)?,
        })
    }
}

impl<B: KvBackend> Storage<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Writes the ledger, the registry block and the account, then the state root.
    pub fn save_pool(&self, pool: &PoolState) -> Result<()> {
        let account = AccountRecord {
            address: pool.address,
            balance: pool.balance,
        };
        let encoded_account = bincode::serialize(&account).map_err(|e| anyhow!("Serialization error: {}", e))?;
        let encoded_ledger = bincode::serialize(&pool.ledger).map_err(|e| anyhow!("Serialization error: {}", e))?;

        self.backend.put(ACCOUNT_KEY, &encoded_account)?;
        self.backend.put(LEDGER_KEY, &encoded_ledger)?;
        if pool.registry_allocated() {
            let block = encode_registry(&pool.stakers).context("encoding staker registry")?;
            self.backend.put(stakepool_types::constants::REGISTRY_KEY, &block)?;
        }

        let root = pool.root_hash();
        self.backend.put(ROOT_KEY, &root)?;
        debug!(root = %hex::encode(root), "pool saved");
        Ok(())
    }

    /// `None` when nothing has been saved yet.
    pub fn load_pool(&self) -> Result<Option<PoolState>> {
        let Some(raw_account) = self.backend.get(ACCOUNT_KEY)? else {
            return Ok(None);
        };
        let account: AccountRecord =
            bincode::deserialize(&raw_account).map_err(|e| anyhow!("Deserialization error: {}", e))?;

        let raw_ledger = self
            .backend
            .get(LEDGER_KEY)?
            .ok_or_else(|| anyhow!("ledger record missing"))?;
        let ledger: Ledger =
            bincode::deserialize(&raw_ledger).map_err(|e| anyhow!("Deserialization error: {}", e))?;

        let stakers = match self.backend.get(stakepool_types::constants::REGISTRY_KEY)? {
            Some(block) => decode_registry(&block).context("decoding staker registry")?,
            None => Vec::new(),
        };

        let pool = PoolState {
            address: account.address,
            balance: account.balance,
            ledger,
            stakers,
        };
        pool.check_invariants().context("stored pool violates registry invariants")?;

        if let Some(stored_root) = self.backend.get(ROOT_KEY)? {
            let root = pool.root_hash();
            if stored_root.as_slice() != root.as_slice() {
                bail!(
                    "state root mismatch: stored {}, computed {}",
                    hex::encode(stored_root),
                    hex::encode(root)
                );
            }
        }
        Ok(Some(pool))
    }

    pub fn save_receipt(&self, receipt: &Receipt) -> Result<()> {
        let key = format!("receipt_{}", hex::encode(receipt.call_id));
        let encoded = bincode::serialize(receipt).map_err(|e| anyhow!("Serialization error: {}", e))?;
        self.backend.put(key.as_bytes(), &encoded)
    }

    pub fn load_receipt(&self, call_id: &[u8; 32]) -> Result<Option<Receipt>> {
        let key = format!("receipt_{}", hex::encode(call_id));
        match self.backend.get(key.as_bytes())? {
            Some(v) => Ok(Some(bincode::deserialize(&v)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakepool_types::constants::{MAX_STAKERS, REGISTRY_KEY};
    use stakepool_types::{Effect, PoolStatus, StakeRecord};

    fn sample_pool() -> PoolState {
        let mut pool = PoolState::new(AccountId([1; 32]), AccountId([2; 32]), AccountId([3; 32]));
        pool.ledger.status = PoolStatus::Initialized;
        pool.ledger.minimum_balance = 1_000;
        pool.stakers = vec![StakeRecord::EMPTY; MAX_STAKERS];
        pool.stakers[0] = StakeRecord::new(AccountId([7; 32]), 400);
        pool.stakers[1] = StakeRecord::new(AccountId([8; 32]), 600);
        pool.ledger.active_count = 2;
        pool.ledger.total_staked = 1_000;
        pool.balance = 2_000;
        pool
    }

    #[test]
    fn empty_store_loads_nothing() {
        let storage = Storage::in_memory();
        assert!(storage.load_pool().unwrap().is_none());
    }

    #[test]
    fn pool_survives_save_and_load() {
        let storage = Storage::in_memory();
        let pool = sample_pool();
        storage.save_pool(&pool).unwrap();

        let loaded = storage.load_pool().unwrap().unwrap();
        assert_eq!(loaded, pool);
        assert_eq!(
            storage.backend.get(REGISTRY_KEY).unwrap().map(|b| b.len()),
            Some(MAX_STAKERS * 48)
        );
    }

    #[test]
    fn unallocated_registry_is_not_written() {
        let storage = Storage::in_memory();
        let pool = PoolState::new(AccountId([1; 32]), AccountId([2; 32]), AccountId([3; 32]));
        storage.save_pool(&pool).unwrap();
        assert!(storage.backend.get(REGISTRY_KEY).unwrap().is_none());
        assert_eq!(storage.load_pool().unwrap().unwrap(), pool);
    }

    #[test]
    fn corrupted_registry_is_rejected() {
        let storage = Storage::in_memory();
        storage.save_pool(&sample_pool()).unwrap();

        // open a gap at slot 0 of the prefix
        let mut block = storage.backend.get(REGISTRY_KEY).unwrap().unwrap();
        block[..48].fill(0);
        storage.backend.put(REGISTRY_KEY, &block).unwrap();
        assert!(storage.load_pool().is_err());

        storage.backend.put(REGISTRY_KEY, &block[..100]).unwrap();
        let err = storage.load_pool().unwrap_err();
        assert!(format!("{:#}", err).contains("registry block is 100 bytes"));
    }

    #[test]
    fn tampered_balance_fails_root_check() {
        let storage = Storage::in_memory();
        storage.save_pool(&sample_pool()).unwrap();

        let forged = AccountRecord {
            address: AccountId([1; 32]),
            balance: 9_999,
        };
        storage
            .backend
            .put(ACCOUNT_KEY, &bincode::serialize(&forged).unwrap())
            .unwrap();
        let err = storage.load_pool().unwrap_err();
        assert!(err.to_string().contains("state root mismatch"));
    }

    #[test]
    fn receipts_are_keyed_by_call_id() {
        let storage = Storage::in_memory();
        let receipt = Receipt {
            call_id: [9; 32],
            sender: AccountId([7; 32]),
            instruction: "unstake".into(),
            effects: vec![Effect::Payment {
                receiver: AccountId([7; 32]),
                amount: 400,
            }],
            state_root: [4; 32],
        };
        storage.save_receipt(&receipt).unwrap();

        assert_eq!(storage.load_receipt(&[9; 32]).unwrap(), Some(receipt));
        assert_eq!(storage.load_receipt(&[1; 32]).unwrap(), None);
    }
}
