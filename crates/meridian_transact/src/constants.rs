pub const HASH_BYTES_LENGTH: usize = 32;
pub const MERIDIAN_CHECKSUM_BYTE_LENGTH: usize = 4;
pub const MERIDIAN_ADDRESS_LENGTH: usize = 58;
pub const MERIDIAN_PUBLIC_KEY_BYTE_LENGTH: usize = 32;
pub const MERIDIAN_SECRET_KEY_BYTE_LENGTH: usize = 32;
pub const MERIDIAN_SIGNATURE_BYTE_LENGTH: usize = 64;
pub const MERIDIAN_SIGNATURE_ENCODING_INCR: usize = 75;
pub type Byte32 = [u8; 32];

/// Maximum number of atoms in one atomic transaction group.
pub const MAX_TX_GROUP_SIZE: usize = 16;

/// Flat minimum fee per transaction, in microMER.
pub const MIN_TXN_FEE: u64 = 1000;

pub const EMPTY_SIGNATURE: [u8; MERIDIAN_SIGNATURE_BYTE_LENGTH] =
    [0; MERIDIAN_SIGNATURE_BYTE_LENGTH];

// Application argument limits
pub const MAX_APP_ARGS: usize = 16;
pub const MAX_ARGS_SIZE: usize = 2048;

// Application state schema limits
pub const MAX_GLOBAL_STATE_KEYS: u64 = 64;
pub const MAX_LOCAL_STATE_KEYS: u64 = 16;
