use stakepool_types::constants::MAX_STAKERS;
use stakepool_types::AccountId;
use thiserror::Error;

/// Reasons a pool call aborts. Any of these leaves the pool untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("only the pool admin may {action}")]
    Unauthorized { action: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("payment mismatch: {0}")]
    PaymentMismatch(String),

    #[error("{0} already initialized")]
    AlreadyInitialized(&'static str),

    #[error("{0} not initialized")]
    NotInitialized(&'static str),

    #[error("no active stake record for {0}")]
    NotFound(AccountId),

    #[error("stake record for {0} holds no stake")]
    NoStake(AccountId),

    #[error("computed amount rounds to zero")]
    ZeroResult,

    #[error("staker registry is full ({} slots)", MAX_STAKERS)]
    RegistryFull,

    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("pool balance {available} cannot cover {needed}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("step budget exhausted after {steps} steps")]
    BudgetExhausted { steps: u64 },

    #[error("pool has been torn down")]
    PoolDeleted,

    #[error("{total_staked} still staked across {stakers} stakers")]
    StakeOutstanding { total_staked: u64, stakers: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PoolError {
    /// Stable short label, used as a log field and for tallying aborts.
    pub fn kind(&self) -> &'static str {
        match self {
            PoolError::Unauthorized { .. } => "unauthorized",
            PoolError::InvalidInput(_) => "invalid_input",
            PoolError::PaymentMismatch(_) => "payment_mismatch",
            PoolError::AlreadyInitialized(_) => "already_initialized",
            PoolError::NotInitialized(_) => "not_initialized",
            PoolError::NotFound(_) => "not_found",
            PoolError::NoStake(_) => "no_stake",
            PoolError::ZeroResult => "zero_result",
            PoolError::RegistryFull => "registry_full",
            PoolError::ArithmeticOverflow(_) => "arithmetic_overflow",
            PoolError::InsufficientBalance { .. } => "insufficient_balance",
            PoolError::BudgetExhausted { .. } => "budget_exhausted",
            PoolError::PoolDeleted => "pool_deleted",
            PoolError::StakeOutstanding { .. } => "stake_outstanding",
            PoolError::InvalidConfig(_) => "invalid_config",
        }
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;
