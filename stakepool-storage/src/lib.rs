pub mod backend;
pub mod db;

pub use backend::{KvBackend, MemoryBackend};
#[cfg(feature = "rocksdb")]
pub use backend::RocksBackend;
pub use db::Storage;
