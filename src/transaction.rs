//! Transaction wire codec (legacy and BIP144 extended format)

use crate::error::DecodeError;
use crate::reader::ByteReader;
use crate::types::*;

/// Marker byte distinguishing the extended format from a legacy input count
const SEGWIT_MARKER: u8 = 0x00;

/// Flag byte selecting the witness-carrying extended format
const SEGWIT_FLAG: u8 = 0x01;

/// Decode a transaction from wire bytes
///
/// Returns the transaction together with the number of bytes consumed. The
/// caller decides what a remainder means: for consensus verification a
/// buffer longer than the encoding it holds is a size mismatch, not a
/// decode failure.
///
/// Decoding rules:
/// 1. version is a signed 32-bit little-endian integer
/// 2. an input count of zero introduces the extended format: a flag byte
///    follows, and flag bit 0 announces per-input witness stacks
/// 3. a witness-flagged transaction whose witness stacks are all empty is
///    non-canonical and rejected
/// 4. any flag bit other than bit 0 is unknown optional data and rejected
pub fn decode_transaction(data: &[u8]) -> Result<(Transaction, usize), DecodeError> {
    let mut reader = ByteReader::new(data);

    let version = reader.read_i32()?;

    let mut flags = 0u8;
    let mut inputs = decode_inputs(&mut reader)?;
    let outputs;
    if inputs.is_empty() {
        flags = reader.read_u8()?;
        if flags != 0 {
            inputs = decode_inputs(&mut reader)?;
            outputs = decode_outputs(&mut reader)?;
        } else {
            outputs = Vec::new();
        }
    } else {
        outputs = decode_outputs(&mut reader)?;
    }

    let mut tx = Transaction {
        version,
        inputs,
        outputs,
        lock_time: 0,
    };

    if flags & SEGWIT_FLAG != 0 {
        flags ^= SEGWIT_FLAG;
        for input in &mut tx.inputs {
            input.witness = decode_witness(&mut reader)?;
        }
        if !tx.has_witness() {
            return Err(DecodeError::SuperfluousWitness);
        }
    }
    if flags != 0 {
        return Err(DecodeError::UnknownOptionalData);
    }

    tx.lock_time = reader.read_u32()?;

    Ok((tx, reader.position()))
}

fn decode_inputs(reader: &mut ByteReader) -> Result<Vec<TransactionInput>, DecodeError> {
    let count = reader.read_count()?;
    let mut inputs = Vec::with_capacity(count);
    for _ in 0..count {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(reader.read_bytes(32)?);
        let index = reader.read_u32()?;
        let script_len = reader.read_count()?;
        let script_sig = reader.read_bytes(script_len)?.to_vec();
        let sequence = reader.read_u32()?;
        inputs.push(TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
            witness: Vec::new(),
        });
    }
    Ok(inputs)
}

fn decode_outputs(reader: &mut ByteReader) -> Result<Vec<TransactionOutput>, DecodeError> {
    let count = reader.read_count()?;
    let mut outputs = Vec::with_capacity(count);
    for _ in 0..count {
        let value = reader.read_i64()?;
        let script_len = reader.read_count()?;
        let script_pubkey = reader.read_bytes(script_len)?.to_vec();
        outputs.push(TransactionOutput {
            value,
            script_pubkey,
        });
    }
    Ok(outputs)
}

fn decode_witness(reader: &mut ByteReader) -> Result<Witness, DecodeError> {
    let count = reader.read_count()?;
    let mut stack = Vec::with_capacity(count);
    for _ in 0..count {
        let len = reader.read_count()?;
        stack.push(reader.read_bytes(len)?.to_vec());
    }
    Ok(stack)
}

/// Encode a transaction to wire bytes
///
/// The extended format is used exactly when any input carries witness data,
/// so `encode(decode(b)) == b` for every canonical buffer.
pub fn encode_transaction(tx: &Transaction) -> ByteString {
    let mut out = Vec::new();
    write_i32(&mut out, tx.version);

    let segwit = tx.has_witness();
    if segwit {
        out.push(SEGWIT_MARKER);
        out.push(SEGWIT_FLAG);
    }

    write_compact_size(&mut out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        encode_input(&mut out, input);
    }

    write_compact_size(&mut out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        encode_output(&mut out, output);
    }

    if segwit {
        for input in &tx.inputs {
            write_compact_size(&mut out, input.witness.len() as u64);
            for element in &input.witness {
                write_compact_size(&mut out, element.len() as u64);
                out.extend_from_slice(element);
            }
        }
    }

    write_u32(&mut out, tx.lock_time);
    out
}

pub(crate) fn encode_input(out: &mut ByteString, input: &TransactionInput) {
    out.extend_from_slice(&input.prevout.hash);
    write_u32(out, input.prevout.index);
    write_compact_size(out, input.script_sig.len() as u64);
    out.extend_from_slice(&input.script_sig);
    write_u32(out, input.sequence);
}

pub(crate) fn encode_output(out: &mut ByteString, output: &TransactionOutput) {
    write_i64(out, output.value);
    write_compact_size(out, output.script_pubkey.len() as u64);
    out.extend_from_slice(&output.script_pubkey);
}

pub(crate) fn write_u32(out: &mut ByteString, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_i32(out: &mut ByteString, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_i64(out: &mut ByteString, value: i64) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_compact_size(out: &mut ByteString, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x10000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single-input P2PKH spend, no witness data
    const LEGACY_TX: &str = "01000000017d01943c40b7f3d8a00a2d62fa1d560bf739a2368c18\
        0615b0a7937c0e883e7c000000006b4830450221008f66d188c664a8088893ea4ddd9689024e\
        a5593877753ecc1e9051ed58c15168022037109f0d06e6068b7447966f751de8474641ad2b15\
        ec37f4a9d159b02af68174012103e208f5403383c77d5832a268c9f71480f6e7bfbdfa44904b\
        ecacfad66163ea31ffffffff01c8af0000000000001976a91458b7a60f11a904feef35a639b6\
        048de8dd4d9f1c88ac00000000";

    // Nested P2SH-P2WPKH spend with a two-element witness stack
    const SEGWIT_TX: &str = "010000000001015836964079411659db5a4cfddd70e3f0de0261268f\
        86c998a69a143f47c6c83800000000171600149445e8b825f1a17d5e091948545c90654096db\
        68ffffffff02d8be04000000000017a91422c17a06117b40516f9826804800003562e834c987\
        00000000000000004d6a4b424950313431205c6f2f2048656c6c6f20536567576974203a2d29\
        206b656570206974207374726f6e6721204c4c415020426974636f696e20747769747465722e\
        636f6d2f6b6873396e6502483045022100aaa281e0611ba0b5a2cd055f77e5594709d611ad12\
        33e7096394f64ffe16f5b202207e2dcc9ef3a54c24471799ab99f6615847b21be2a6b4e02859\
        18fd025597c5740121021ec0613f21c4e81c4b300426e5e5d30fa651f41e9993223adbe74dbe\
        603c74fb00000000";

    fn tx_bytes(s: &str) -> Vec<u8> {
        hex::decode(s.replace([' ', '\n'], "")).unwrap()
    }

    #[test]
    fn test_decode_legacy_transaction() {
        let bytes = tx_bytes(LEGACY_TX);
        let (tx, consumed) = decode_transaction(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(tx.version, 1);
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.lock_time, 0);
        assert_eq!(tx.inputs[0].sequence, 0xffffffff);
        assert_eq!(tx.inputs[0].prevout.index, 0);
        assert!(!tx.has_witness());
        assert_eq!(tx.outputs[0].value, 45000);
        assert_eq!(tx.outputs[0].script_pubkey.len(), 25);
    }

    #[test]
    fn test_decode_segwit_transaction() {
        let bytes = tx_bytes(SEGWIT_TX);
        let (tx, consumed) = decode_transaction(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 2);
        assert!(tx.has_witness());
        assert_eq!(tx.inputs[0].witness.len(), 2);
        // signature + compressed pubkey
        assert_eq!(tx.inputs[0].witness[0].len(), 72);
        assert_eq!(tx.inputs[0].witness[1].len(), 33);
    }

    #[test]
    fn test_encode_roundtrip() {
        for fixture in [LEGACY_TX, SEGWIT_TX] {
            let bytes = tx_bytes(fixture);
            let (tx, _) = decode_transaction(&bytes).unwrap();
            assert_eq!(encode_transaction(&tx), bytes);
        }
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = tx_bytes(LEGACY_TX);
        let result = decode_transaction(&bytes[..bytes.len() - 1]);
        assert_eq!(result, Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn test_decode_trailing_bytes_reported() {
        let mut bytes = tx_bytes(LEGACY_TX);
        let expected = bytes.len();
        bytes.push(0x00);
        let (_, consumed) = decode_transaction(&bytes).unwrap();
        assert_eq!(consumed, expected);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_transaction(&[0x42]).is_err());
        assert!(decode_transaction(&[]).is_err());
    }

    #[test]
    fn test_decode_witness_flag_without_witness() {
        // version | marker | flag=1 | 1 input (null prevout, empty script)
        // | 0 outputs | empty witness stack | locktime
        let mut bytes = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01];
        bytes.extend_from_slice(&[0u8; 32]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes.push(0x00); // script_sig
        bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        bytes.push(0x00); // outputs
        bytes.push(0x00); // witness stack for input 0
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            decode_transaction(&bytes),
            Err(DecodeError::SuperfluousWitness)
        );
    }

    #[test]
    fn test_decode_unknown_flag() {
        // Same shape as above but with flag bit 1, which nothing defines
        let mut bytes = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01];
        bytes.extend_from_slice(&[0u8; 32]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes.push(0x00); // script_sig
        bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        bytes.push(0x00); // outputs
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            decode_transaction(&bytes),
            Err(DecodeError::UnknownOptionalData)
        );
    }

    #[test]
    fn test_write_compact_size_boundaries() {
        let mut out = Vec::new();
        write_compact_size(&mut out, 0xfc);
        write_compact_size(&mut out, 0xfd);
        write_compact_size(&mut out, 0x10000);
        assert_eq!(
            out,
            vec![0xfc, 0xfd, 0xfd, 0x00, 0xfe, 0x00, 0x00, 0x01, 0x00]
        );
    }
}
