use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::query::{self, PoolSummary};
use crate::{execute_call, ExecutionContext};
use stakepool_types::{PoolCall, PoolState, Receipt};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A pool shared between tasks. Calls hold the write lock for their whole
/// run, so readers never observe a call half applied.
#[derive(Clone)]
pub struct SharedPool {
    state: Arc<RwLock<PoolState>>,
    config: Arc<PoolConfig>,
}

impl SharedPool {
    pub fn new(state: PoolState, config: PoolConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            config: Arc::new(config),
        }
    }

    pub async fn submit(&self, call: &PoolCall) -> Result<Receipt, PoolError> {
        let mut guard = self.state.write().await;
        let mut ctx = ExecutionContext {
            pool: &mut guard,
            config: &self.config,
        };
        execute_call(call, &mut ctx)
    }

    /// Value landing on the pool account from outside, e.g. consensus rewards.
    pub async fn receive_external(&self, amount: u64) {
        self.state.write().await.receive_external(amount);
    }

    pub async fn snapshot(&self) -> PoolState {
        self.state.read().await.clone()
    }

    pub async fn summary(&self) -> PoolSummary {
        query::summary(&*self.state.read().await)
    }
}
