use regex::Regex;
use std::sync::LazyLock;

pub const HASH_BYTES_LENGTH: usize = 32;
pub const LENGTH_ENCODE_BYTE_SIZE: usize = 2;
pub const MERIDIAN_PUBLIC_KEY_BYTE_LENGTH: usize = 32;
pub const MERIDIAN_CHECKSUM_BYTE_LENGTH: usize = 4;
pub const MERIDIAN_ADDRESS_LENGTH: usize = 58;

// Method selectors are the leading bytes of the signature hash
pub const SELECTOR_BYTE_LENGTH: usize = 4;

// Boolean encoding
pub const BOOL_TRUE_BYTE: u8 = 0x80;
pub const BOOL_FALSE_BYTE: u8 = 0x00;

// Bit manipulation
pub const BITS_PER_BYTE: u8 = 8;

// ABI type parsing constants
pub const MAX_BIT_SIZE: u16 = 512;

// Regex pattern for static array type parsing
pub static STATIC_ARRAY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z\d\[\](),]+)\[(0|[1-9][\d]*)]$").expect("Invalid static array regex")
});
