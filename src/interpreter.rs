//! Script interpreter: dual-stack machine with transaction context

use std::sync::OnceLock;

use ripemd::Ripemd160;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{Result, ScriptError};
use crate::opcodes::*;
use crate::script::*;
use crate::sighash::{
    double_sha256, legacy_sighash, witness_v0_sighash, SIGHASH_ALL, SIGHASH_ANYONECANPAY,
    SIGHASH_SINGLE,
};
use crate::types::*;
use crate::verify::{
    VERIFY_CHECKLOCKTIMEVERIFY, VERIFY_CHECKSEQUENCEVERIFY, VERIFY_DERSIG,
    VERIFY_DISCOURAGE_UPGRADABLE_NOPS, VERIFY_LOW_S, VERIFY_MINIMALDATA, VERIFY_NULLDUMMY,
    VERIFY_STRICTENC,
};

/// Signature hashing scheme selected by the execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigVersion {
    /// Legacy and P2SH evaluation
    Base,
    /// BIP143 witness v0 evaluation
    WitnessV0,
}

fn secp() -> &'static Secp256k1<VerifyOnly> {
    static SECP: OnceLock<Secp256k1<VerifyOnly>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::verification_only)
}

/// Transaction context for signature and locktime checks
///
/// Borrows the spending transaction; one checker is built per verified
/// input, so the engine stays stateless and reentrant.
pub struct TransactionChecker<'a> {
    pub tx: &'a Transaction,
    pub input_index: usize,
    pub amount: i64,
}

impl TransactionChecker<'_> {
    /// ECDSA check of an endorsement against a public key
    ///
    /// Consensus parsing is lax DER with S normalization; strictness is
    /// enforced separately by the encoding checks when flagged.
    pub fn check_sig(
        &self,
        sig: &[u8],
        pubkey: &[u8],
        script_code: &[u8],
        sig_version: SigVersion,
    ) -> bool {
        if sig.is_empty() {
            return false;
        }
        let hash_type = sig[sig.len() - 1] as u32;
        let der = &sig[..sig.len() - 1];

        let pubkey = match PublicKey::from_slice(pubkey) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let mut signature = match Signature::from_der_lax(der) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        signature.normalize_s();

        let sighash = match sig_version {
            SigVersion::Base => {
                legacy_sighash(self.tx, self.input_index, script_code, hash_type)
            }
            SigVersion::WitnessV0 => witness_v0_sighash(
                self.tx,
                self.input_index,
                script_code,
                self.amount,
                hash_type,
            ),
        };
        let message = match Message::from_digest_slice(&sighash) {
            Ok(message) => message,
            Err(_) => return false,
        };

        secp().verify_ecdsa(&message, &signature, &pubkey).is_ok()
    }

    /// Absolute locktime requirement (BIP65)
    ///
    /// 1. the operand and the transaction lock time must be of the same
    ///    kind, both heights or both timestamps
    /// 2. the operand must not exceed the transaction lock time
    /// 3. a final input sequence would disable lock time entirely
    pub fn check_lock_time(&self, lock_time: i64) -> bool {
        let tx_lock_time = self.tx.lock_time as i64;
        let same_kind = (tx_lock_time < LOCKTIME_THRESHOLD && lock_time < LOCKTIME_THRESHOLD)
            || (tx_lock_time >= LOCKTIME_THRESHOLD && lock_time >= LOCKTIME_THRESHOLD);
        if !same_kind {
            return false;
        }
        if lock_time > tx_lock_time {
            return false;
        }
        self.tx.inputs[self.input_index].sequence != SEQUENCE_FINAL
    }

    /// Relative locktime requirement (BIP112)
    pub fn check_sequence(&self, sequence: i64) -> bool {
        let input_sequence = self.tx.inputs[self.input_index].sequence as i64;

        // Relative lock time is only available from version 2; the version
        // is compared as unsigned, so negative versions qualify
        if (self.tx.version as u32) < 2 {
            return false;
        }
        if input_sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG as i64 != 0 {
            return false;
        }

        let mask = (SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK) as i64;
        let masked_input = input_sequence & mask;
        let masked_operand = sequence & mask;
        let type_flag = SEQUENCE_LOCKTIME_TYPE_FLAG as i64;

        let same_kind = (masked_input < type_flag && masked_operand < type_flag)
            || (masked_input >= type_flag && masked_operand >= type_flag);
        if !same_kind {
            return false;
        }
        masked_operand <= masked_input
    }
}

/// Strict DER check per BIP66; `sig` includes the trailing hash type byte
pub fn is_valid_signature_encoding(sig: &[u8]) -> bool {
    // Shortest possible: sequence header plus two one-byte integers plus
    // the hash type. Longest: 33-byte R and S.
    if sig.len() < 9 || sig.len() > 73 {
        return false;
    }
    if sig[0] != 0x30 || sig[1] as usize != sig.len() - 3 {
        return false;
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= sig.len() {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != sig.len() {
        return false;
    }

    if sig[2] != 0x02 || len_r == 0 || sig[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && sig[4] == 0 && sig[5] & 0x80 == 0 {
        return false;
    }

    if sig[len_r + 4] != 0x02 || len_s == 0 || sig[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[len_r + 6] == 0 && sig[len_r + 7] & 0x80 == 0 {
        return false;
    }
    true
}

/// True when the S component is in the lower half of the curve order
fn is_low_s(sig: &[u8]) -> bool {
    if sig.is_empty() {
        return false;
    }
    let signature = match Signature::from_der_lax(&sig[..sig.len() - 1]) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    let mut normalized = signature;
    normalized.normalize_s();
    normalized.serialize_compact() == signature.serialize_compact()
}

/// True when the trailing hash type byte names a defined scheme
fn is_defined_hashtype(sig: &[u8]) -> bool {
    if sig.is_empty() {
        return false;
    }
    let hash_type = (sig[sig.len() - 1] as u32) & !SIGHASH_ANYONECANPAY;
    (SIGHASH_ALL..=SIGHASH_SINGLE).contains(&hash_type)
}

/// True for a compressed (33 byte) or uncompressed (65 byte) public key
fn is_compressed_or_uncompressed_pubkey(pubkey: &[u8]) -> bool {
    match pubkey.len() {
        33 => pubkey[0] == 0x02 || pubkey[0] == 0x03,
        65 => pubkey[0] == 0x04,
        _ => false,
    }
}

/// Signature encoding gates selected by the verification flags
///
/// An empty signature passes every gate; it can never validate, but it is
/// the canonical way to fail a CHECKSIG cleanly.
pub fn check_signature_encoding(sig: &[u8], flags: u32) -> Result<()> {
    if sig.is_empty() {
        return Ok(());
    }
    if flags & (VERIFY_DERSIG | VERIFY_LOW_S | VERIFY_STRICTENC) != 0
        && !is_valid_signature_encoding(sig)
    {
        return Err(ScriptError::SigDer);
    }
    if flags & VERIFY_LOW_S != 0 && !is_low_s(sig) {
        return Err(ScriptError::SigHighS);
    }
    if flags & VERIFY_STRICTENC != 0 && !is_defined_hashtype(sig) {
        return Err(ScriptError::SigHashType);
    }
    Ok(())
}

pub fn check_pubkey_encoding(pubkey: &[u8], flags: u32) -> Result<()> {
    if flags & VERIFY_STRICTENC != 0 && !is_compressed_or_uncompressed_pubkey(pubkey) {
        return Err(ScriptError::PubkeyType);
    }
    Ok(())
}

fn require(stack: &[ByteString], depth: usize) -> Result<()> {
    if stack.len() < depth {
        Err(ScriptError::InvalidStackOperation)
    } else {
        Ok(())
    }
}

fn top(stack: &[ByteString], from_top: usize) -> Result<&ByteString> {
    stack
        .len()
        .checked_sub(from_top + 1)
        .map(|i| &stack[i])
        .ok_or(ScriptError::InvalidStackOperation)
}

fn pop(stack: &mut Vec<ByteString>) -> Result<ByteString> {
    stack.pop().ok_or(ScriptError::InvalidStackOperation)
}

fn bool_item(value: bool) -> ByteString {
    if value {
        vec![1]
    } else {
        vec![]
    }
}

fn sha256(data: &[u8]) -> ByteString {
    Sha256::digest(data).to_vec()
}

pub(crate) fn hash160(data: &[u8]) -> ByteString {
    Ripemd160::digest(Sha256::digest(data)).to_vec()
}

/// Evaluate a script over the given stack
///
/// Execution rules:
/// 1. the script must not exceed 10,000 bytes
/// 2. pushed elements are capped at 520 bytes, the combined stacks at
///    1,000 elements, counted operations at 201
/// 3. disabled opcodes fail the script wherever they appear, even inside
///    an unexecuted branch; pushes inside unexecuted branches are still
///    parsed
/// 4. every conditional must be closed before the script ends
pub fn eval_script(
    stack: &mut Vec<ByteString>,
    script: &[u8],
    flags: u32,
    checker: &TransactionChecker,
    sig_version: SigVersion,
) -> Result<()> {
    if script.len() > MAX_SCRIPT_SIZE {
        return Err(ScriptError::ScriptSize);
    }

    let require_minimal = flags & VERIFY_MINIMALDATA != 0;
    let mut alt_stack: Vec<ByteString> = Vec::new();
    let mut exec_stack: Vec<bool> = Vec::new();
    let mut op_count = 0usize;
    let mut code_sep = 0usize;

    let mut pc = 0usize;
    while pc < script.len() {
        let (opcode, push_data, next_pc) = next_op(script, pc)?;
        let executing = exec_stack.iter().all(|branch| *branch);

        if let Some(data) = push_data {
            if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                return Err(ScriptError::PushSize);
            }
        }
        if opcode > OP_16 {
            op_count += 1;
            if op_count > MAX_OPS_PER_SCRIPT {
                return Err(ScriptError::OpCount);
            }
        }
        if is_disabled(opcode) {
            return Err(ScriptError::DisabledOpcode);
        }

        if let (true, Some(data)) = (executing, push_data) {
            if require_minimal && !is_minimal_push(opcode, data) {
                return Err(ScriptError::MinimalData);
            }
            stack.push(data.to_vec());
        } else if executing || (OP_IF..=OP_ENDIF).contains(&opcode) {
            match opcode {
                OP_1NEGATE | OP_1..=OP_16 => {
                    stack.push(encode_num(decode_small_int(opcode)));
                }

                OP_NOP => {}

                OP_CHECKLOCKTIMEVERIFY => {
                    if flags & VERIFY_CHECKLOCKTIMEVERIFY == 0 {
                        if flags & VERIFY_DISCOURAGE_UPGRADABLE_NOPS != 0 {
                            return Err(ScriptError::DiscourageUpgradableNops);
                        }
                    } else {
                        let lock_time = decode_num(
                            top(stack, 0)?,
                            require_minimal,
                            MAX_LOCKTIME_SCRIPTNUM_SIZE,
                        )?;
                        if lock_time < 0 {
                            return Err(ScriptError::NegativeLockTime);
                        }
                        if !checker.check_lock_time(lock_time) {
                            return Err(ScriptError::UnsatisfiedLockTime);
                        }
                    }
                }

                OP_CHECKSEQUENCEVERIFY => {
                    if flags & VERIFY_CHECKSEQUENCEVERIFY == 0 {
                        if flags & VERIFY_DISCOURAGE_UPGRADABLE_NOPS != 0 {
                            return Err(ScriptError::DiscourageUpgradableNops);
                        }
                    } else {
                        let sequence = decode_num(
                            top(stack, 0)?,
                            require_minimal,
                            MAX_LOCKTIME_SCRIPTNUM_SIZE,
                        )?;
                        if sequence < 0 {
                            return Err(ScriptError::NegativeLockTime);
                        }
                        // The disable bit turns the operand into a NOP
                        if sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG as i64 == 0
                            && !checker.check_sequence(sequence)
                        {
                            return Err(ScriptError::UnsatisfiedLockTime);
                        }
                    }
                }

                OP_NOP1 | OP_NOP4..=OP_NOP10 => {
                    if flags & VERIFY_DISCOURAGE_UPGRADABLE_NOPS != 0 {
                        return Err(ScriptError::DiscourageUpgradableNops);
                    }
                }

                OP_VERIF | OP_VERNOTIF => return Err(ScriptError::BadOpcode),

                OP_IF | OP_NOTIF => {
                    let mut branch = false;
                    if executing {
                        let top = stack
                            .pop()
                            .ok_or(ScriptError::UnbalancedConditional)?;
                        branch = cast_to_bool(&top);
                        if opcode == OP_NOTIF {
                            branch = !branch;
                        }
                    }
                    exec_stack.push(branch);
                }

                OP_ELSE => {
                    let branch = exec_stack
                        .last_mut()
                        .ok_or(ScriptError::UnbalancedConditional)?;
                    *branch = !*branch;
                }

                OP_ENDIF => {
                    exec_stack
                        .pop()
                        .ok_or(ScriptError::UnbalancedConditional)?;
                }

                OP_VERIFY => {
                    let top = pop(stack)?;
                    if !cast_to_bool(&top) {
                        return Err(ScriptError::Verify);
                    }
                }

                OP_RETURN => return Err(ScriptError::OpReturn),

                OP_TOALTSTACK => alt_stack.push(pop(stack)?),

                OP_FROMALTSTACK => {
                    let item = alt_stack
                        .pop()
                        .ok_or(ScriptError::InvalidAltStackOperation)?;
                    stack.push(item);
                }

                OP_2DROP => {
                    require(stack, 2)?;
                    stack.pop();
                    stack.pop();
                }

                OP_2DUP => {
                    require(stack, 2)?;
                    let a = top(stack, 1)?.clone();
                    let b = top(stack, 0)?.clone();
                    stack.push(a);
                    stack.push(b);
                }

                OP_3DUP => {
                    require(stack, 3)?;
                    let a = top(stack, 2)?.clone();
                    let b = top(stack, 1)?.clone();
                    let c = top(stack, 0)?.clone();
                    stack.push(a);
                    stack.push(b);
                    stack.push(c);
                }

                OP_2OVER => {
                    require(stack, 4)?;
                    let a = top(stack, 3)?.clone();
                    let b = top(stack, 2)?.clone();
                    stack.push(a);
                    stack.push(b);
                }

                OP_2ROT => {
                    require(stack, 6)?;
                    let a = stack.remove(stack.len() - 6);
                    let b = stack.remove(stack.len() - 5);
                    stack.push(a);
                    stack.push(b);
                }

                OP_2SWAP => {
                    require(stack, 4)?;
                    let len = stack.len();
                    stack.swap(len - 4, len - 2);
                    stack.swap(len - 3, len - 1);
                }

                OP_IFDUP => {
                    let item = top(stack, 0)?.clone();
                    if cast_to_bool(&item) {
                        stack.push(item);
                    }
                }

                OP_DEPTH => {
                    let depth = stack.len() as i64;
                    stack.push(encode_num(depth));
                }

                OP_DROP => {
                    pop(stack)?;
                }

                OP_DUP => {
                    let item = top(stack, 0)?.clone();
                    stack.push(item);
                }

                OP_NIP => {
                    require(stack, 2)?;
                    let len = stack.len();
                    stack.remove(len - 2);
                }

                OP_OVER => {
                    let item = top(stack, 1)?.clone();
                    stack.push(item);
                }

                OP_PICK | OP_ROLL => {
                    require(stack, 2)?;
                    let depth =
                        decode_num(top(stack, 0)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    stack.pop();
                    if depth < 0 || depth as usize >= stack.len() {
                        return Err(ScriptError::InvalidStackOperation);
                    }
                    let index = stack.len() - 1 - depth as usize;
                    let item = if opcode == OP_PICK {
                        stack[index].clone()
                    } else {
                        stack.remove(index)
                    };
                    stack.push(item);
                }

                OP_ROT => {
                    require(stack, 3)?;
                    let len = stack.len();
                    let item = stack.remove(len - 3);
                    stack.push(item);
                }

                OP_SWAP => {
                    require(stack, 2)?;
                    let len = stack.len();
                    stack.swap(len - 2, len - 1);
                }

                OP_TUCK => {
                    require(stack, 2)?;
                    let item = top(stack, 0)?.clone();
                    let len = stack.len();
                    stack.insert(len - 2, item);
                }

                OP_SIZE => {
                    let size = top(stack, 0)?.len() as i64;
                    stack.push(encode_num(size));
                }

                OP_EQUAL | OP_EQUALVERIFY => {
                    require(stack, 2)?;
                    let b = pop(stack)?;
                    let a = pop(stack)?;
                    let equal = a == b;
                    if opcode == OP_EQUAL {
                        stack.push(bool_item(equal));
                    } else if !equal {
                        return Err(ScriptError::EqualVerify);
                    }
                }

                OP_1ADD | OP_1SUB | OP_NEGATE | OP_ABS | OP_NOT | OP_0NOTEQUAL => {
                    let operand =
                        decode_num(top(stack, 0)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    stack.pop();
                    let result = match opcode {
                        OP_1ADD => operand + 1,
                        OP_1SUB => operand - 1,
                        OP_NEGATE => -operand,
                        OP_ABS => operand.abs(),
                        OP_NOT => (operand == 0) as i64,
                        _ => (operand != 0) as i64,
                    };
                    stack.push(encode_num(result));
                }

                OP_ADD | OP_SUB | OP_BOOLAND | OP_BOOLOR | OP_NUMEQUAL
                | OP_NUMEQUALVERIFY | OP_NUMNOTEQUAL | OP_LESSTHAN | OP_GREATERTHAN
                | OP_LESSTHANOREQUAL | OP_GREATERTHANOREQUAL | OP_MIN | OP_MAX => {
                    require(stack, 2)?;
                    let b = decode_num(top(stack, 0)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    let a = decode_num(top(stack, 1)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    stack.pop();
                    stack.pop();
                    let result = match opcode {
                        OP_ADD => a + b,
                        OP_SUB => a - b,
                        OP_BOOLAND => (a != 0 && b != 0) as i64,
                        OP_BOOLOR => (a != 0 || b != 0) as i64,
                        OP_NUMEQUAL | OP_NUMEQUALVERIFY => (a == b) as i64,
                        OP_NUMNOTEQUAL => (a != b) as i64,
                        OP_LESSTHAN => (a < b) as i64,
                        OP_GREATERTHAN => (a > b) as i64,
                        OP_LESSTHANOREQUAL => (a <= b) as i64,
                        OP_GREATERTHANOREQUAL => (a >= b) as i64,
                        OP_MIN => a.min(b),
                        _ => a.max(b),
                    };
                    if opcode == OP_NUMEQUALVERIFY {
                        if result == 0 {
                            return Err(ScriptError::NumEqualVerify);
                        }
                    } else {
                        stack.push(encode_num(result));
                    }
                }

                OP_WITHIN => {
                    require(stack, 3)?;
                    let max = decode_num(top(stack, 0)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    let min = decode_num(top(stack, 1)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    let value =
                        decode_num(top(stack, 2)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    stack.pop();
                    stack.pop();
                    stack.pop();
                    stack.push(bool_item(min <= value && value < max));
                }

                OP_RIPEMD160 => {
                    let data = pop(stack)?;
                    stack.push(Ripemd160::digest(&data).to_vec());
                }

                OP_SHA1 => {
                    let data = pop(stack)?;
                    stack.push(Sha1::digest(&data).to_vec());
                }

                OP_SHA256 => {
                    let data = pop(stack)?;
                    stack.push(sha256(&data));
                }

                OP_HASH160 => {
                    let data = pop(stack)?;
                    stack.push(hash160(&data));
                }

                OP_HASH256 => {
                    let data = pop(stack)?;
                    stack.push(double_sha256(&data).to_vec());
                }

                OP_CODESEPARATOR => code_sep = next_pc,

                OP_CHECKSIG | OP_CHECKSIGVERIFY => {
                    require(stack, 2)?;
                    let sig = top(stack, 1)?.clone();
                    let pubkey = top(stack, 0)?.clone();

                    check_signature_encoding(&sig, flags)?;
                    check_pubkey_encoding(&pubkey, flags)?;

                    let script_code = match sig_version {
                        SigVersion::Base => {
                            find_and_delete(&script[code_sep..], &encode_push(&sig))
                        }
                        SigVersion::WitnessV0 => script[code_sep..].to_vec(),
                    };
                    let success =
                        checker.check_sig(&sig, &pubkey, &script_code, sig_version);

                    stack.pop();
                    stack.pop();
                    if opcode == OP_CHECKSIG {
                        stack.push(bool_item(success));
                    } else if !success {
                        return Err(ScriptError::CheckSigVerify);
                    }
                }

                OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
                    let mut i = 1usize;
                    require(stack, i)?;
                    let key_count =
                        decode_num(top(stack, i - 1)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    if key_count < 0 || key_count > MAX_PUBKEYS_PER_MULTISIG {
                        return Err(ScriptError::PubkeyCount);
                    }
                    op_count += key_count as usize;
                    if op_count > MAX_OPS_PER_SCRIPT {
                        return Err(ScriptError::OpCount);
                    }

                    i += 1;
                    let mut ikey = i;
                    i += key_count as usize;
                    require(stack, i)?;
                    let sig_count =
                        decode_num(top(stack, i - 1)?, require_minimal, MAX_SCRIPTNUM_SIZE)?;
                    if sig_count < 0 || sig_count > key_count {
                        return Err(ScriptError::SigCount);
                    }

                    i += 1;
                    let mut isig = i;
                    i += sig_count as usize;
                    require(stack, i)?;

                    let mut script_code = script[code_sep..].to_vec();
                    if sig_version == SigVersion::Base {
                        for k in 0..sig_count as usize {
                            let sig = top(stack, isig - 1 + k)?;
                            script_code = find_and_delete(&script_code, &encode_push(sig));
                        }
                    }

                    let mut success = true;
                    let mut sigs_left = sig_count;
                    let mut keys_left = key_count;
                    while success && sigs_left > 0 {
                        let sig = top(stack, isig - 1)?.clone();
                        let pubkey = top(stack, ikey - 1)?.clone();

                        check_signature_encoding(&sig, flags)?;
                        check_pubkey_encoding(&pubkey, flags)?;

                        if checker.check_sig(&sig, &pubkey, &script_code, sig_version) {
                            isig += 1;
                            sigs_left -= 1;
                        }
                        ikey += 1;
                        keys_left -= 1;

                        // Not enough keys remain to satisfy the rest
                        if sigs_left > keys_left {
                            success = false;
                        }
                    }

                    // Consume counts, keys and signatures; the dummy stays
                    while i > 1 {
                        stack.pop();
                        i -= 1;
                    }

                    let dummy = pop(stack)?;
                    if flags & VERIFY_NULLDUMMY != 0 && !dummy.is_empty() {
                        return Err(ScriptError::SigNullDummy);
                    }

                    if opcode == OP_CHECKMULTISIG {
                        stack.push(bool_item(success));
                    } else if !success {
                        return Err(ScriptError::CheckMultiSigVerify);
                    }
                }

                _ => return Err(ScriptError::BadOpcode),
            }
        }

        if stack.len() + alt_stack.len() > MAX_STACK_SIZE {
            return Err(ScriptError::StackSize);
        }
        pc = next_pc;
    }

    if !exec_stack.is_empty() {
        return Err(ScriptError::UnbalancedConditional);
    }
    Ok(())
}
