use crate::account::AccountId;
use crate::instruction::PoolInstruction;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolCall {
    pub sender: AccountId,
    pub instruction: PoolInstruction,
}

impl PoolCall {
    pub fn new(sender: AccountId, instruction: PoolInstruction) -> Self {
        Self { sender, instruction }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("pool call serialization")
    }

    pub fn id(&self) -> [u8; 32] {
        use blake3::Hasher;
        let mut hasher = Hasher::new();
        hasher.update(&self.to_bytes());
        *hasher.finalize().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_depends_on_sender_and_instruction() {
        let a = PoolCall::new(AccountId([1; 32]), PoolInstruction::Unstake { percentage: 50 });
        let b = PoolCall::new(AccountId([2; 32]), PoolInstruction::Unstake { percentage: 50 });
        let c = PoolCall::new(AccountId([1; 32]), PoolInstruction::Unstake { percentage: 51 });
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id(), a.clone().id());
    }
}
