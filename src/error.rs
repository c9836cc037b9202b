//! Error types for script verification

use thiserror::Error;

/// Contract violation at the verification API boundary
///
/// These are caller errors, not script outcomes: a missing buffer or an
/// out-of-domain value never reaches the interpreter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("Invalid argument: transaction")]
    Transaction,

    #[error("Invalid argument: prevout_script")]
    PrevoutScript,

    #[error("Invalid argument: value")]
    Value,
}

/// Transaction wire decode failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected end of data")]
    UnexpectedEnd,

    #[error("Non-canonical compact size encoding")]
    NonCanonicalCompactSize,

    #[error("Unknown transaction optional data")]
    UnknownOptionalData,

    #[error("Witness flag set but no witness data present")]
    SuperfluousWitness,
}

/// Script execution failure taxonomy
///
/// Internal diagnostic codes produced by the interpreter and the
/// verification passes. The public API folds these into `VerifyResult`;
/// only `EqualVerify` survives the fold with a distinct code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Script evaluated to false")]
    EvalFalse,
    #[error("OP_RETURN encountered")]
    OpReturn,

    // Size limits
    #[error("Script exceeds maximum size")]
    ScriptSize,
    #[error("Pushed element exceeds maximum size")]
    PushSize,
    #[error("Operation count exceeds maximum")]
    OpCount,
    #[error("Stack exceeds maximum depth")]
    StackSize,
    #[error("Signature count out of range")]
    SigCount,
    #[error("Public key count out of range")]
    PubkeyCount,

    // Failed verify operations
    #[error("OP_VERIFY failed")]
    Verify,
    #[error("OP_EQUALVERIFY failed")]
    EqualVerify,
    #[error("OP_CHECKSIGVERIFY failed")]
    CheckSigVerify,
    #[error("OP_CHECKMULTISIGVERIFY failed")]
    CheckMultiSigVerify,
    #[error("OP_NUMEQUALVERIFY failed")]
    NumEqualVerify,

    // Logical/format errors
    #[error("Undefined or malformed opcode")]
    BadOpcode,
    #[error("Disabled opcode present in script")]
    DisabledOpcode,
    #[error("Stack underflow")]
    InvalidStackOperation,
    #[error("Alt stack underflow")]
    InvalidAltStackOperation,
    #[error("Unbalanced conditional")]
    UnbalancedConditional,

    // Numeric encoding
    #[error("Script number exceeds operand size limit")]
    ScriptNumOverflow,
    #[error("Negative lock time operand")]
    NegativeLockTime,
    #[error("Lock time requirement not satisfied")]
    UnsatisfiedLockTime,

    // Strict encoding (BIP62/BIP66/BIP147)
    #[error("Undefined signature hash type")]
    SigHashType,
    #[error("Signature is not strict DER")]
    SigDer,
    #[error("Non-minimal push or number encoding")]
    MinimalData,
    #[error("Signature script is not push-only")]
    SigPushOnly,
    #[error("Signature S value is too high")]
    SigHighS,
    #[error("CHECKMULTISIG dummy element is not null")]
    SigNullDummy,
    #[error("Public key is not compressed or uncompressed")]
    PubkeyType,
    #[error("Extra items left on stack")]
    CleanStack,

    // Softfork safeness
    #[error("Upgradable NOP used with discouragement on")]
    DiscourageUpgradableNops,

    // Witness (BIP141)
    #[error("Witness program has wrong length")]
    WitnessProgramWrongLength,
    #[error("Witness program witness is empty")]
    WitnessProgramWitnessEmpty,
    #[error("Witness program hash mismatch")]
    WitnessProgramMismatch,
    #[error("Witness requires empty signature script")]
    WitnessMalleated,
    #[error("Witness requires only a single push of the redeem script")]
    WitnessMalleatedP2sh,
    #[error("Witness provided for non-witness script")]
    WitnessUnexpected,
}

pub type Result<T> = std::result::Result<T, ScriptError>;
