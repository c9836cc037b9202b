//! Core transaction types for script verification

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Witness Data: 𝒲 = 𝕊* (stack of witness elements)
pub type Witness = Vec<ByteString>;

/// OutPoint: 𝒪 = ℍ × ℕ
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Transaction Input: ℐ = 𝒪 × 𝕊 × ℕ × 𝒲
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
    pub witness: Witness,
}

impl TransactionInput {
    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }
}

/// Transaction Output: 𝒯 = ℤ × 𝕊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: ByteString,
}

/// Transaction: 𝒯𝒳 = ℤ × ℐ* × 𝒯* × ℕ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// True if any input carries witness data
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(TransactionInput::has_witness)
    }
}

/// Script verification result
///
/// This is the complete, closed result set of `verify_script`. Every
/// interpreter-level failure folds into `EvalFalse`, except a failed
/// OP_EQUALVERIFY which keeps its own code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyResult {
    /// Script evaluated to true
    EvalTrue,
    /// Script evaluated to false or failed a consensus rule
    EvalFalse,
    /// OP_EQUALVERIFY comparison failed
    EqualVerify,
    /// Transaction deserialization failed
    TxInvalid,
    /// Input index out of range for the decoded transaction
    TxInputInvalid,
    /// Transaction decoded but did not occupy the whole buffer
    TxSizeInvalid,
}

impl VerifyResult {
    /// True only for a fully successful verification
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyResult::EvalTrue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_has_witness() {
        let mut tx = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint { hash: [0; 32], index: 0 },
                script_sig: vec![],
                sequence: 0xffffffff,
                witness: vec![],
            }],
            outputs: vec![],
            lock_time: 0,
        };
        assert!(!tx.has_witness());

        tx.inputs[0].witness.push(vec![0x01]);
        assert!(tx.has_witness());
    }

    #[test]
    fn test_verify_result_is_valid() {
        assert!(VerifyResult::EvalTrue.is_valid());
        assert!(!VerifyResult::EvalFalse.is_valid());
        assert!(!VerifyResult::EqualVerify.is_valid());
        assert!(!VerifyResult::TxInvalid.is_valid());
    }

    #[test]
    fn test_verify_result_serde_roundtrip() {
        let json = serde_json::to_string(&VerifyResult::EqualVerify).unwrap();
        let back: VerifyResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VerifyResult::EqualVerify);
    }
}
