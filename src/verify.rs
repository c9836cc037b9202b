//! Rule-flag dispatch and the public verification entry point

use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{InvalidArgument, Result, ScriptError};
use crate::interpreter::{eval_script, SigVersion, TransactionChecker};
use crate::opcodes::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use crate::script::{cast_to_bool, encode_push, is_p2sh, is_push_only, witness_program};
use crate::transaction::decode_transaction;
use crate::types::*;

/// No additional rules: the script machine alone decides
pub const VERIFY_NONE: u32 = 0;
/// Evaluate pay-to-script-hash subscripts (BIP16)
pub const VERIFY_P2SH: u32 = 1 << 0;
/// Enforce strict signature, hash type and public key encodings
pub const VERIFY_STRICTENC: u32 = 1 << 1;
/// Enforce strict DER signature encoding (BIP66)
pub const VERIFY_DERSIG: u32 = 1 << 2;
/// Reject signatures with a high S value
pub const VERIFY_LOW_S: u32 = 1 << 3;
/// Require the CHECKMULTISIG dummy element to be null (BIP147)
pub const VERIFY_NULLDUMMY: u32 = 1 << 4;
/// Require the signature script to be push-only
pub const VERIFY_SIGPUSHONLY: u32 = 1 << 5;
/// Require minimal push and number encodings
pub const VERIFY_MINIMALDATA: u32 = 1 << 6;
/// Fail on upgradable NOP opcodes
pub const VERIFY_DISCOURAGE_UPGRADABLE_NOPS: u32 = 1 << 7;
/// Require exactly one stack element after evaluation
pub const VERIFY_CLEANSTACK: u32 = 1 << 8;
/// Enable OP_CHECKLOCKTIMEVERIFY (BIP65)
pub const VERIFY_CHECKLOCKTIMEVERIFY: u32 = 1 << 9;
/// Enable OP_CHECKSEQUENCEVERIFY (BIP112)
pub const VERIFY_CHECKSEQUENCEVERIFY: u32 = 1 << 10;
/// Evaluate witness programs (BIP141)
pub const VERIFY_WITNESS: u32 = 1 << 11;

/// Verify one input of a decoded transaction against the script it spends
///
/// Pass structure:
/// 1. evaluate the signature script, snapshotting the stack for P2SH
/// 2. evaluate the prevout script over the result; the top must be truthy
/// 3. a witness-program prevout requires an empty signature script and
///    hands control to the witness path
/// 4. a P2SH prevout re-evaluates the popped redeem script, which may
///    itself be a witness program (nested segwit); the signature script
///    must then be exactly the push of the redeem script
/// 5. CLEANSTACK and unexpected-witness checks close the pass
pub fn verify_input(
    tx: &Transaction,
    input_index: usize,
    prevout_script: &[u8],
    amount: i64,
    flags: u32,
) -> Result<()> {
    let checker = TransactionChecker { tx, input_index, amount };
    let script_sig = &tx.inputs[input_index].script_sig;
    let witness = &tx.inputs[input_index].witness;

    if flags & VERIFY_SIGPUSHONLY != 0 && !is_push_only(script_sig) {
        return Err(ScriptError::SigPushOnly);
    }

    let mut stack: Vec<ByteString> = Vec::new();
    eval_script(&mut stack, script_sig, flags, &checker, SigVersion::Base)?;
    let p2sh_snapshot = if flags & VERIFY_P2SH != 0 {
        stack.clone()
    } else {
        Vec::new()
    };

    eval_script(&mut stack, prevout_script, flags, &checker, SigVersion::Base)?;
    if !stack.last().map(|top| cast_to_bool(top)).unwrap_or(false) {
        return Err(ScriptError::EvalFalse);
    }

    let mut had_witness = false;
    if flags & VERIFY_WITNESS != 0 {
        if let Some((version, program)) = witness_program(prevout_script) {
            had_witness = true;
            // A bare witness program leaves no room for a signature script
            if !script_sig.is_empty() {
                return Err(ScriptError::WitnessMalleated);
            }
            verify_witness_program(witness, version, program, flags, &checker)?;
            stack.truncate(1);
        }
    }

    if flags & VERIFY_P2SH != 0 && is_p2sh(prevout_script) {
        if !is_push_only(script_sig) {
            return Err(ScriptError::SigPushOnly);
        }

        stack = p2sh_snapshot;
        // The P2SH template just matched against this stack's top
        let redeem_script = stack.pop().ok_or(ScriptError::InvalidStackOperation)?;

        eval_script(&mut stack, &redeem_script, flags, &checker, SigVersion::Base)?;
        if !stack.last().map(|top| cast_to_bool(top)).unwrap_or(false) {
            return Err(ScriptError::EvalFalse);
        }

        if flags & VERIFY_WITNESS != 0 {
            if let Some((version, program)) = witness_program(&redeem_script) {
                had_witness = true;
                if *script_sig != encode_push(&redeem_script) {
                    return Err(ScriptError::WitnessMalleatedP2sh);
                }
                verify_witness_program(witness, version, program, flags, &checker)?;
                stack.truncate(1);
            }
        }
    }

    if flags & VERIFY_CLEANSTACK != 0 && stack.len() != 1 {
        return Err(ScriptError::CleanStack);
    }

    if flags & VERIFY_WITNESS != 0 && !had_witness && !witness.is_empty() {
        return Err(ScriptError::WitnessUnexpected);
    }

    Ok(())
}

/// Execute a witness program against its witness stack
///
/// Version 0 defines two program shapes; every other version succeeds
/// vacuously so future rules can deploy as soft forks.
fn verify_witness_program(
    witness: &Witness,
    version: u8,
    program: &[u8],
    flags: u32,
    checker: &TransactionChecker,
) -> Result<()> {
    if version != 0 {
        return Ok(());
    }

    let script: ByteString;
    let mut stack: Vec<ByteString>;
    match program.len() {
        WITNESS_V0_SCRIPTHASH_SIZE => {
            // The last witness element is the script; the rest is its stack
            let (witness_script, rest) = witness
                .split_last()
                .ok_or(ScriptError::WitnessProgramWitnessEmpty)?;
            if Sha256::digest(witness_script)[..] != *program {
                return Err(ScriptError::WitnessProgramMismatch);
            }
            script = witness_script.clone();
            stack = rest.to_vec();
        }
        WITNESS_V0_KEYHASH_SIZE => {
            // Exactly a signature and a public key
            if witness.len() != 2 {
                return Err(ScriptError::WitnessProgramMismatch);
            }
            let mut p2pkh = Vec::with_capacity(25);
            p2pkh.push(OP_DUP);
            p2pkh.push(OP_HASH160);
            p2pkh.push(WITNESS_V0_KEYHASH_SIZE as u8);
            p2pkh.extend_from_slice(program);
            p2pkh.push(OP_EQUALVERIFY);
            p2pkh.push(OP_CHECKSIG);
            script = p2pkh;
            stack = witness.clone();
        }
        _ => return Err(ScriptError::WitnessProgramWrongLength),
    }

    for element in &stack {
        if element.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptError::PushSize);
        }
    }

    eval_script(&mut stack, &script, flags, checker, SigVersion::WitnessV0)?;

    // Witness evaluation implicitly requires a clean, truthy stack
    if stack.len() != 1 {
        return Err(ScriptError::EvalFalse);
    }
    if !cast_to_bool(&stack[0]) {
        return Err(ScriptError::EvalFalse);
    }
    Ok(())
}

/// Fold an interpreter diagnostic into the public result set
///
/// Only a failed OP_EQUALVERIFY keeps a distinct code; the one failure a
/// spend debugger most often needs to tell apart from an ordinary false
/// evaluation.
fn fold_script_error(error: ScriptError) -> VerifyResult {
    match error {
        ScriptError::EqualVerify => VerifyResult::EqualVerify,
        _ => VerifyResult::EvalFalse,
    }
}

/// Verify that a transaction input correctly spends a previous output
///
/// `transaction` is the serialized spending transaction and
/// `prevout_script` the script of the output being spent; `None` models an
/// absent buffer and is a caller error. `prevout_value` is the spent amount
/// in satoshis, committed to by BIP143 signatures.
///
/// Argument contract:
/// 1. `prevout_value` must fit a signed 64-bit amount
/// 2. both buffers must be present
///
/// Transaction-level outcomes:
/// 1. a buffer too short for its encoding fails to decode (`TxInvalid`)
/// 2. an out-of-range `input_index` is `TxInputInvalid`
/// 3. a buffer longer than the encoding it holds is `TxSizeInvalid`
///
/// Everything else is the script outcome: `EvalTrue`, `EvalFalse` or
/// `EqualVerify`.
///
/// # Examples
///
/// ```
/// use consensus_verify::{verify_script, InvalidArgument, VerifyResult};
///
/// // Value outside the monetary domain is rejected before decoding
/// let result = verify_script(None, Some(&[0x51]), u64::MAX, 0, 0);
/// assert_eq!(result, Err(InvalidArgument::Value));
///
/// // A missing transaction buffer is a caller error
/// let result = verify_script(None, Some(&[0x51]), 0, 0, 0);
/// assert_eq!(result, Err(InvalidArgument::Transaction));
///
/// // An undecodable transaction is a verification outcome, not an error
/// let result = verify_script(Some(&[0x42]), Some(&[0x51]), 0, 0, 0);
/// assert_eq!(result, Ok(VerifyResult::TxInvalid));
/// ```
pub fn verify_script(
    transaction: Option<&[u8]>,
    prevout_script: Option<&[u8]>,
    prevout_value: u64,
    input_index: u32,
    flags: u32,
) -> std::result::Result<VerifyResult, InvalidArgument> {
    if prevout_value > i64::MAX as u64 {
        return Err(InvalidArgument::Value);
    }
    let transaction = transaction.ok_or(InvalidArgument::Transaction)?;
    let prevout_script = prevout_script.ok_or(InvalidArgument::PrevoutScript)?;

    let (tx, consumed) = match decode_transaction(transaction) {
        Ok(decoded) => decoded,
        Err(_) => return Ok(VerifyResult::TxInvalid),
    };
    if input_index as usize >= tx.inputs.len() {
        return Ok(VerifyResult::TxInputInvalid);
    }
    if consumed != transaction.len() {
        return Ok(VerifyResult::TxSizeInvalid);
    }

    let outcome = verify_input(
        &tx,
        input_index as usize,
        prevout_script,
        prevout_value as i64,
        flags,
    );
    Ok(match outcome {
        Ok(()) => VerifyResult::EvalTrue,
        Err(error) => fold_script_error(error),
    })
}
