//! # Consensus-Verify
//!
//! Standalone verification of Bitcoin transaction scripts.
//!
//! This crate answers one question: does a given input of a serialized
//! transaction correctly spend a given previous output under a selected set
//! of consensus rules? It contains a complete script interpreter, both
//! signature hash algorithms (legacy and BIP143) and the pay-to-script-hash
//! and segregated witness evaluation paths, with no chain state, network or
//! policy logic attached.
//!
//! ## Architecture
//!
//! The verification pipeline is layered:
//! - byte-stream reader (little-endian primitives, compact sizes)
//! - transaction decoder (legacy and extended witness encodings)
//! - script interpreter (the stack machine and its opcode set)
//! - signature hash engines (legacy and BIP143)
//! - rule-flag dispatcher and public entry point
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: verification is deterministic and side-effect-free
//! 2. **Exact Version Pinning**: consensus-critical dependencies are pinned
//!    to exact versions
//! 3. **Closed Result Set**: every verification returns one of six codes;
//!    only caller errors surface as `Err`
//!
//! ## Usage
//!
//! ```rust
//! use consensus_verify::transaction::encode_transaction;
//! use consensus_verify::types::*;
//! use consensus_verify::{verify_script, VERIFY_P2SH};
//!
//! // A one-input transaction with an empty scriptSig, spending OP_1
//! let tx = Transaction {
//!     version: 1,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint { hash: [0x11; 32], index: 0 },
//!         script_sig: vec![],
//!         sequence: 0xffffffff,
//!         witness: vec![],
//!     }],
//!     outputs: vec![TransactionOutput {
//!         value: 1000,
//!         script_pubkey: vec![0x51],
//!     }],
//!     lock_time: 0,
//! };
//! let bytes = encode_transaction(&tx);
//! let result = verify_script(Some(&bytes), Some(&[0x51]), 0, 0, VERIFY_P2SH);
//! assert_eq!(result, Ok(VerifyResult::EvalTrue));
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod reader;
pub mod transaction;
pub mod opcodes;
pub mod script;
pub mod interpreter;
pub mod sighash;
pub mod verify;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{DecodeError, InvalidArgument, Result, ScriptError};
pub use sighash::{SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_NONE, SIGHASH_SINGLE};
pub use verify::*;
