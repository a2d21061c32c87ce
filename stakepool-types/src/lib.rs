pub mod account;
pub mod call;
pub mod constants;
pub mod instruction;
pub mod layout;
pub mod receipt;
pub mod state;

pub use account::AccountId;
pub use call::PoolCall;
pub use instruction::{Payment, PoolInstruction};
pub use receipt::{Effect, Receipt};
pub use state::{Ledger, PoolState, PoolStatus, StakeRecord};
