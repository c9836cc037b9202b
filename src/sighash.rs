//! Signature hash computation (legacy and BIP143)

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};

use crate::script::strip_code_separators;
use crate::transaction::{
    encode_output, write_compact_size, write_i32, write_i64, write_u32,
};
use crate::types::*;

/// SIGHASH_ALL: commit to all outputs
pub const SIGHASH_ALL: u32 = 0x01;
/// SIGHASH_NONE: commit to no outputs
pub const SIGHASH_NONE: u32 = 0x02;
/// SIGHASH_SINGLE: commit to the output paired with this input
pub const SIGHASH_SINGLE: u32 = 0x03;
/// SIGHASH_ANYONECANPAY: commit to this input only
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// The digest returned by the legacy algorithm for its out-of-range quirks
const ONE_HASH: Hash = [
    0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub fn double_sha256(data: &[u8]) -> Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(data);
    let digest = sha256d::Hash::from_engine(engine);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest[..]);
    hash
}

/// Legacy signature hash
///
/// The pre-segwit digest over a filtered copy of the spending transaction:
/// 1. an out-of-range input index hashes to the one-value instead of
///    failing, as does SIGHASH_SINGLE with no paired output
/// 2. the script code is hashed with its OP_CODESEPARATOR opcodes removed
///    (the caller has already deleted the signature pushes)
/// 3. inputs and outputs are filtered by the ALL/NONE/SINGLE base type and
///    the ANYONECANPAY modifier
/// 4. the 32-bit hash type is appended before double-SHA256
pub fn legacy_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    hash_type: u32,
) -> Hash {
    if input_index >= tx.inputs.len() {
        return ONE_HASH;
    }

    let base_type = hash_type & 0x1f;
    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;

    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return ONE_HASH;
    }

    let script_code = strip_code_separators(script_code);

    let mut preimage = Vec::new();
    write_i32(&mut preimage, tx.version);

    if anyone_can_pay {
        write_compact_size(&mut preimage, 1);
        serialize_input(&mut preimage, &tx.inputs[input_index], &script_code, None);
    } else {
        write_compact_size(&mut preimage, tx.inputs.len() as u64);
        for (i, input) in tx.inputs.iter().enumerate() {
            if i == input_index {
                serialize_input(&mut preimage, input, &script_code, None);
            } else {
                // Other inputs are blanked; their sequences are zeroed
                // unless the signature commits to all outputs
                let sequence = if base_type == SIGHASH_NONE || base_type == SIGHASH_SINGLE {
                    Some(0)
                } else {
                    None
                };
                serialize_input(&mut preimage, input, &[], sequence);
            }
        }
    }

    match base_type {
        SIGHASH_NONE => write_compact_size(&mut preimage, 0),
        SIGHASH_SINGLE => {
            write_compact_size(&mut preimage, input_index as u64 + 1);
            for _ in 0..input_index {
                // Null output: maximal value, empty script
                write_i64(&mut preimage, -1);
                write_compact_size(&mut preimage, 0);
            }
            encode_output(&mut preimage, &tx.outputs[input_index]);
        }
        _ => {
            write_compact_size(&mut preimage, tx.outputs.len() as u64);
            for output in &tx.outputs {
                encode_output(&mut preimage, output);
            }
        }
    }

    write_u32(&mut preimage, tx.lock_time);
    write_u32(&mut preimage, hash_type);

    double_sha256(&preimage)
}

fn serialize_input(
    out: &mut ByteString,
    input: &TransactionInput,
    script_code: &[u8],
    sequence_override: Option<u32>,
) {
    out.extend_from_slice(&input.prevout.hash);
    write_u32(out, input.prevout.index);
    write_compact_size(out, script_code.len() as u64);
    out.extend_from_slice(script_code);
    write_u32(out, sequence_override.unwrap_or(input.sequence));
}

/// BIP143 signature hash for witness v0 programs
///
/// Commits to the spent amount and uses precomputable midstate digests over
/// the prevout, sequence and output sets.
pub fn witness_v0_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    amount: i64,
    hash_type: u32,
) -> Hash {
    let base_type = hash_type & 0x1f;
    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if anyone_can_pay {
        [0u8; 32]
    } else {
        let mut data = Vec::new();
        for input in &tx.inputs {
            data.extend_from_slice(&input.prevout.hash);
            write_u32(&mut data, input.prevout.index);
        }
        double_sha256(&data)
    };

    let hash_sequence =
        if anyone_can_pay || base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE {
            [0u8; 32]
        } else {
            let mut data = Vec::new();
            for input in &tx.inputs {
                write_u32(&mut data, input.sequence);
            }
            double_sha256(&data)
        };

    let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
        let mut data = Vec::new();
        for output in &tx.outputs {
            encode_output(&mut data, output);
        }
        double_sha256(&data)
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        let mut data = Vec::new();
        encode_output(&mut data, &tx.outputs[input_index]);
        double_sha256(&data)
    } else {
        [0u8; 32]
    };

    let input = &tx.inputs[input_index];
    let mut preimage = Vec::new();
    write_i32(&mut preimage, tx.version);
    preimage.extend_from_slice(&hash_prevouts);
    preimage.extend_from_slice(&hash_sequence);
    preimage.extend_from_slice(&input.prevout.hash);
    write_u32(&mut preimage, input.prevout.index);
    write_compact_size(&mut preimage, script_code.len() as u64);
    preimage.extend_from_slice(script_code);
    write_i64(&mut preimage, amount);
    write_u32(&mut preimage, input.sequence);
    preimage.extend_from_slice(&hash_outputs);
    write_u32(&mut preimage, tx.lock_time);
    write_u32(&mut preimage, hash_type);

    double_sha256(&preimage)
}
