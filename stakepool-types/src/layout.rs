//! Fixed-size persisted layout of the staker registry.
//!
//! The registry block is exactly `MAX_STAKERS * RECORD_SIZE` bytes. Each record
//! is the 32-byte account followed by `stake` and `share_percentage` as
//! little-endian u64. Empty slots encode as all zeroes.

use crate::account::{AccountId, ACCOUNT_ID_LEN};
use crate::constants::{MAX_STAKERS, RECORD_SIZE};
use crate::state::StakeRecord;
use thiserror::Error;

pub const REGISTRY_BLOCK_SIZE: usize = MAX_STAKERS * RECORD_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("registry block is {actual} bytes, expected {}", REGISTRY_BLOCK_SIZE)]
    BlockSize { actual: usize },
    #[error("registry holds {0} slots, expected {}", MAX_STAKERS)]
    SlotCount(usize),
}

pub fn encode_record(record: &StakeRecord) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    out[..ACCOUNT_ID_LEN].copy_from_slice(record.account.as_bytes());
    out[ACCOUNT_ID_LEN..ACCOUNT_ID_LEN + 8].copy_from_slice(&record.stake.to_le_bytes());
    out[ACCOUNT_ID_LEN + 8..].copy_from_slice(&record.share_percentage.to_le_bytes());
    out
}

pub fn decode_record(bytes: &[u8; RECORD_SIZE]) -> StakeRecord {
    let mut account = [0u8; ACCOUNT_ID_LEN];
    account.copy_from_slice(&bytes[..ACCOUNT_ID_LEN]);
    let mut stake = [0u8; 8];
    stake.copy_from_slice(&bytes[ACCOUNT_ID_LEN..ACCOUNT_ID_LEN + 8]);
    let mut share = [0u8; 8];
    share.copy_from_slice(&bytes[ACCOUNT_ID_LEN + 8..]);
    StakeRecord {
        account: AccountId(account),
        stake: u64::from_le_bytes(stake),
        share_percentage: u64::from_le_bytes(share),
    }
}

pub fn encode_registry(stakers: &[StakeRecord]) -> Result<Vec<u8>, LayoutError> {
    if stakers.len() != MAX_STAKERS {
        return Err(LayoutError::SlotCount(stakers.len()));
    }
    let mut block = Vec::with_capacity(REGISTRY_BLOCK_SIZE);
    for record in stakers {
        block.extend_from_slice(&encode_record(record));
    }
    Ok(block)
}

pub fn decode_registry(block: &[u8]) -> Result<Vec<StakeRecord>, LayoutError> {
    if block.len() != REGISTRY_BLOCK_SIZE {
        return Err(LayoutError::BlockSize {
            actual: block.len(),
        });
    }
    Ok(block
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            let mut raw = [0u8; RECORD_SIZE];
            raw.copy_from_slice(chunk);
            decode_record(&raw)
        })
        .collect())
}
