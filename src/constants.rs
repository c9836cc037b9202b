//! Script verification consensus constants

/// Maximum script length in bytes
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum size of a pushed stack element in bytes
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum combined depth of the main and alt stacks
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of counted operations per script
pub const MAX_OPS_PER_SCRIPT: usize = 201;

/// Maximum number of public keys in a CHECKMULTISIG
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

/// Default operand size limit for script numbers, in bytes
pub const MAX_SCRIPTNUM_SIZE: usize = 4;

/// Operand size limit for the locktime peeks (CLTV/CSV), in bytes
pub const MAX_LOCKTIME_SCRIPTNUM_SIZE: usize = 5;

/// Lock time threshold: lock times below this are block heights
pub const LOCKTIME_THRESHOLD: i64 = 500_000_000;

/// Sequence number for final transaction input
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Relative lock time is disabled when this sequence bit is set
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// Sequence bit selecting time-based relative lock time
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

/// Mask extracting the relative lock time value from a sequence
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

/// Witness program v0 length for pay-to-witness-key-hash
pub const WITNESS_V0_KEYHASH_SIZE: usize = 20;

/// Witness program v0 length for pay-to-witness-script-hash
pub const WITNESS_V0_SCRIPTHASH_SIZE: usize = 32;
