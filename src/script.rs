//! Script-level utilities: parsing, numeric codec, pattern predicates

use crate::constants::*;
use crate::error::{Result, ScriptError};
use crate::opcodes::*;
use crate::types::ByteString;

/// Parse one operation at `pc`
///
/// Returns the opcode, its push payload (if any) and the offset of the next
/// operation. A push whose payload runs past the end of the script is
/// malformed.
pub fn next_op(script: &[u8], pc: usize) -> Result<(u8, Option<&[u8]>, usize)> {
    let opcode = script[pc];
    let mut cursor = pc + 1;

    if opcode > OP_PUSHDATA4 {
        return Ok((opcode, None, cursor));
    }

    let len = match opcode {
        OP_PUSHDATA1 => {
            let b = *script.get(cursor).ok_or(ScriptError::BadOpcode)?;
            cursor += 1;
            b as usize
        }
        OP_PUSHDATA2 => {
            let b = script
                .get(cursor..cursor + 2)
                .ok_or(ScriptError::BadOpcode)?;
            cursor += 2;
            u16::from_le_bytes([b[0], b[1]]) as usize
        }
        OP_PUSHDATA4 => {
            let b = script
                .get(cursor..cursor + 4)
                .ok_or(ScriptError::BadOpcode)?;
            cursor += 4;
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize
        }
        direct => direct as usize,
    };

    let data = script
        .get(cursor..cursor + len)
        .ok_or(ScriptError::BadOpcode)?;
    Ok((opcode, Some(data), cursor + len))
}

/// Decode a script number from its minimal little-endian representation
///
/// 1. operands longer than `max_size` bytes are rejected
/// 2. under `require_minimal`, a zero-padded encoding is rejected unless the
///    padding byte carries the sign bit of the preceding byte
/// 3. the most significant bit of the last byte is the sign
pub fn decode_num(data: &[u8], require_minimal: bool, max_size: usize) -> Result<i64> {
    if data.len() > max_size {
        return Err(ScriptError::ScriptNumOverflow);
    }
    if data.is_empty() {
        return Ok(0);
    }
    if require_minimal && (data[data.len() - 1] & 0x7f) == 0 {
        if data.len() == 1 || (data[data.len() - 2] & 0x80) == 0 {
            return Err(ScriptError::MinimalData);
        }
    }

    let mut result: i64 = 0;
    for (i, byte) in data.iter().enumerate() {
        result |= (*byte as i64) << (8 * i);
    }
    if data[data.len() - 1] & 0x80 != 0 {
        result &= !(0x80i64 << (8 * (data.len() - 1)));
        result = -result;
    }
    Ok(result)
}

/// Encode a script number to its minimal little-endian representation
pub fn encode_num(value: i64) -> ByteString {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut result = Vec::new();
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    // The top bit of the last byte is the sign; spill into an extra byte
    // when the magnitude already occupies it.
    if result[result.len() - 1] & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let last = result.len() - 1;
        result[last] |= 0x80;
    }
    result
}

/// Script truthiness: any nonzero byte makes the value true, except a lone
/// sign bit in the last position (negative zero)
pub fn cast_to_bool(data: &[u8]) -> bool {
    for (i, byte) in data.iter().enumerate() {
        if *byte != 0 {
            return !(i == data.len() - 1 && *byte == 0x80);
        }
    }
    false
}

/// True if `opcode` is the shortest possible encoding for `data`
pub fn is_minimal_push(opcode: u8, data: &[u8]) -> bool {
    match data.len() {
        0 => opcode == OP_0,
        1 if data[0] >= 1 && data[0] <= 16 => opcode == encode_small_int(data[0]),
        1 if data[0] == 0x81 => opcode == OP_1NEGATE,
        len if len <= 75 => opcode as usize == len,
        len if len <= 255 => opcode == OP_PUSHDATA1,
        len if len <= 65535 => opcode == OP_PUSHDATA2,
        _ => true,
    }
}

/// Size-prefixed push encoding for a data element
///
/// This is the script-builder form used for find-and-delete patterns and
/// the nested-witness redeem comparison; it never substitutes small-integer
/// opcodes.
pub fn encode_push(data: &[u8]) -> ByteString {
    let mut out = Vec::with_capacity(data.len() + 5);
    match data.len() {
        len if len < OP_PUSHDATA1 as usize => {
            out.push(len as u8);
        }
        len if len <= 0xff => {
            out.push(OP_PUSHDATA1);
            out.push(len as u8);
        }
        len if len <= 0xffff => {
            out.push(OP_PUSHDATA2);
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        len => {
            out.push(OP_PUSHDATA4);
            out.extend_from_slice(&(len as u32).to_le_bytes());
        }
    }
    out.extend_from_slice(data);
    out
}

/// True if every operation in the script is a push
pub fn is_push_only(script: &[u8]) -> bool {
    let mut pc = 0;
    while pc < script.len() {
        match next_op(script, pc) {
            Ok((opcode, _, next)) if opcode <= OP_16 => pc = next,
            _ => return false,
        }
    }
    true
}

/// True for the pay-to-script-hash template: HASH160 <20 bytes> EQUAL
pub fn is_p2sh(script: &[u8]) -> bool {
    script.len() == 23
        && script[0] == OP_HASH160
        && script[1] == 0x14
        && script[22] == OP_EQUAL
}

/// Witness program detection: version opcode followed by a single 2..=40
/// byte push makes up the whole script
pub fn witness_program(script: &[u8]) -> Option<(u8, &[u8])> {
    if script.len() < 4 || script.len() > 42 {
        return None;
    }
    let version_op = script[0];
    if version_op != OP_0 && !(OP_1..=OP_16).contains(&version_op) {
        return None;
    }
    let push_len = script[1] as usize;
    if push_len < 2 || push_len > 40 || push_len + 2 != script.len() {
        return None;
    }
    let version = if version_op == OP_0 {
        0
    } else {
        version_op - OP_1 + 1
    };
    Some((version, &script[2..]))
}

/// Remove every occurrence of `pattern` found at an operation boundary
///
/// Used by the legacy signature hash to delete the signature push from the
/// script code before hashing.
pub fn find_and_delete(script: &[u8], pattern: &[u8]) -> ByteString {
    if pattern.is_empty() {
        return script.to_vec();
    }
    let mut result = Vec::with_capacity(script.len());
    let mut pc = 0;
    while pc < script.len() {
        if script[pc..].starts_with(pattern) {
            pc += pattern.len();
            continue;
        }
        // Malformed tails are copied through untouched
        let next = match next_op(script, pc) {
            Ok((_, _, next)) => next,
            Err(_) => script.len(),
        };
        result.extend_from_slice(&script[pc..next]);
        pc = next;
    }
    result
}

/// Remove OP_CODESEPARATOR opcodes from a script code before legacy hashing
pub fn strip_code_separators(script: &[u8]) -> ByteString {
    let mut result = Vec::with_capacity(script.len());
    let mut pc = 0;
    while pc < script.len() {
        let next = match next_op(script, pc) {
            Ok((_, _, next)) => next,
            Err(_) => script.len(),
        };
        if script[pc] != OP_CODESEPARATOR {
            result.extend_from_slice(&script[pc..next]);
        }
        pc = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_op_direct_push() {
        let script = [0x02, 0xaa, 0xbb, 0x51];
        let (op, data, next) = next_op(&script, 0).unwrap();
        assert_eq!(op, 0x02);
        assert_eq!(data, Some(&[0xaa, 0xbb][..]));
        assert_eq!(next, 3);

        let (op, data, next) = next_op(&script, 3).unwrap();
        assert_eq!(op, OP_1);
        assert_eq!(data, None);
        assert_eq!(next, 4);
    }

    #[test]
    fn test_next_op_pushdata() {
        let script = [OP_PUSHDATA1, 0x02, 0x01, 0x02];
        let (op, data, next) = next_op(&script, 0).unwrap();
        assert_eq!(op, OP_PUSHDATA1);
        assert_eq!(data, Some(&[0x01, 0x02][..]));
        assert_eq!(next, 4);

        let script = [OP_PUSHDATA2, 0x01, 0x00, 0xee];
        let (_, data, _) = next_op(&script, 0).unwrap();
        assert_eq!(data, Some(&[0xee][..]));
    }

    #[test]
    fn test_next_op_truncated_push() {
        assert_eq!(next_op(&[0x05, 0x01], 0), Err(ScriptError::BadOpcode));
        assert_eq!(next_op(&[OP_PUSHDATA1], 0), Err(ScriptError::BadOpcode));
        assert_eq!(
            next_op(&[OP_PUSHDATA4, 0xff, 0xff, 0xff, 0xff], 0),
            Err(ScriptError::BadOpcode)
        );
    }

    #[test]
    fn test_num_roundtrip() {
        for value in [0i64, 1, -1, 127, 128, -128, 255, 256, 0x7fffffff, -0x7fffffff] {
            let encoded = encode_num(value);
            assert_eq!(decode_num(&encoded, true, 5).unwrap(), value, "{value}");
        }
    }

    #[test]
    fn test_num_known_encodings() {
        assert_eq!(encode_num(0), Vec::<u8>::new());
        assert_eq!(encode_num(1), vec![0x01]);
        assert_eq!(encode_num(-1), vec![0x81]);
        assert_eq!(encode_num(127), vec![0x7f]);
        assert_eq!(encode_num(128), vec![0x80, 0x00]);
        assert_eq!(encode_num(-128), vec![0x80, 0x80]);
        assert_eq!(encode_num(256), vec![0x00, 0x01]);
    }

    #[test]
    fn test_decode_num_minimal() {
        // Zero-padded
        assert_eq!(
            decode_num(&[0x01, 0x00], true, 4),
            Err(ScriptError::MinimalData)
        );
        // Negative zero
        assert_eq!(decode_num(&[0x80], true, 4), Err(ScriptError::MinimalData));
        // Padding byte carrying the sign of 0x80 is allowed
        assert_eq!(decode_num(&[0x80, 0x00], true, 4).unwrap(), 128);
        // Accepted without the minimal requirement
        assert_eq!(decode_num(&[0x01, 0x00], false, 4).unwrap(), 1);
    }

    #[test]
    fn test_decode_num_overflow() {
        assert_eq!(
            decode_num(&[1, 2, 3, 4, 5], true, 4),
            Err(ScriptError::ScriptNumOverflow)
        );
        assert!(decode_num(&[1, 2, 3, 4, 5], true, 5).is_ok());
    }

    #[test]
    fn test_cast_to_bool() {
        assert!(!cast_to_bool(&[]));
        assert!(!cast_to_bool(&[0x00]));
        assert!(!cast_to_bool(&[0x00, 0x00]));
        assert!(!cast_to_bool(&[0x80])); // negative zero
        assert!(!cast_to_bool(&[0x00, 0x80]));
        assert!(cast_to_bool(&[0x01]));
        assert!(cast_to_bool(&[0x80, 0x00]));
        assert!(cast_to_bool(&[0x00, 0x01]));
    }

    #[test]
    fn test_is_minimal_push() {
        assert!(is_minimal_push(OP_0, &[]));
        assert!(is_minimal_push(0x01, &[0x00])); // a lone zero byte is a direct push
        assert!(is_minimal_push(0x55, &[0x05])); // OP_5
        assert!(!is_minimal_push(0x01, &[0x05]));
        assert!(is_minimal_push(OP_1NEGATE, &[0x81]));
        assert!(is_minimal_push(0x4b, &vec![0xaa; 75]));
        assert!(!is_minimal_push(OP_PUSHDATA1, &vec![0xaa; 75]));
        assert!(is_minimal_push(OP_PUSHDATA1, &vec![0xaa; 76]));
        assert!(is_minimal_push(OP_PUSHDATA2, &vec![0xaa; 256]));
    }

    #[test]
    fn test_encode_push_roundtrip() {
        for data in [vec![], vec![0x07], vec![0xaa; 75], vec![0xbb; 76], vec![0xcc; 300]] {
            let encoded = encode_push(&data);
            let (_, parsed, next) = next_op(&encoded, 0).unwrap();
            assert_eq!(next, encoded.len());
            assert_eq!(parsed, Some(&data[..]));
        }
    }

    #[test]
    fn test_is_push_only() {
        assert!(is_push_only(&[]));
        assert!(is_push_only(&[OP_0, 0x02, 0xaa, 0xbb, OP_16]));
        assert!(!is_push_only(&[OP_DUP]));
        assert!(!is_push_only(&[0x02, 0xaa])); // truncated
    }

    #[test]
    fn test_is_p2sh() {
        let mut script = vec![OP_HASH160, 0x14];
        script.extend_from_slice(&[0u8; 20]);
        script.push(OP_EQUAL);
        assert!(is_p2sh(&script));

        script.push(OP_NOP);
        assert!(!is_p2sh(&script));
        assert!(!is_p2sh(&[OP_HASH160, OP_EQUAL]));
    }

    #[test]
    fn test_witness_program() {
        let mut v0_keyhash = vec![OP_0, 0x14];
        v0_keyhash.extend_from_slice(&[0u8; 20]);
        assert_eq!(witness_program(&v0_keyhash), Some((0, &[0u8; 20][..])));

        let mut v1 = vec![OP_1, 0x20];
        v1.extend_from_slice(&[0u8; 32]);
        assert_eq!(witness_program(&v1).map(|(v, _)| v), Some(1));

        // Push length must fill the script exactly
        let mut bad = vec![OP_0, 0x13];
        bad.extend_from_slice(&[0u8; 20]);
        assert_eq!(witness_program(&bad), None);

        // P2SH is not a witness program
        let mut p2sh = vec![OP_HASH160, 0x14];
        p2sh.extend_from_slice(&[0u8; 20]);
        p2sh.push(OP_EQUAL);
        assert_eq!(witness_program(&p2sh), None);
    }

    #[test]
    fn test_find_and_delete() {
        let sig = vec![0xde, 0xad, 0xbe, 0xef];
        let pattern = encode_push(&sig);

        let mut script = pattern.clone();
        script.push(OP_DUP);
        script.extend_from_slice(&pattern);
        assert_eq!(find_and_delete(&script, &pattern), vec![OP_DUP]);

        // Matching bytes inside a larger push are not at an op boundary
        let mut container = vec![0x06, 0x00];
        container.extend_from_slice(&sig);
        container.push(0x00);
        assert_eq!(find_and_delete(&container, &pattern), container);
    }

    #[test]
    fn test_strip_code_separators() {
        let script = vec![OP_DUP, OP_CODESEPARATOR, OP_HASH160, OP_CODESEPARATOR];
        assert_eq!(strip_code_separators(&script), vec![OP_DUP, OP_HASH160]);

        // Pushed 0xab bytes are data, not separators
        let script = vec![0x01, OP_CODESEPARATOR];
        assert_eq!(strip_code_separators(&script), script);
    }
}
