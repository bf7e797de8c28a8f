//! Meridian addresses are base32-encoded strings that represent 32 bytes plus a checksum.
//!
//! This module provides the [`Address`] type, which encapsulates the logic for parsing,
//! validating, and displaying Meridian addresses. An address is a 58-character base32 string
//! encoding 32 bytes of data and a 4-byte checksum.

use crate::constants::{
    Byte32, MERIDIAN_ADDRESS_LENGTH, MERIDIAN_CHECKSUM_BYTE_LENGTH,
    MERIDIAN_PUBLIC_KEY_BYTE_LENGTH,
};
use crate::error::TransactError;
use crate::utils::{hash, pub_key_to_checksum};
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Represents a Meridian address as decoded bytes without the checksum from a
/// 58-character base32 string.
///
/// The [`Address`] type stores the 32 bytes of the address (the public key or hash
/// digest), and provides methods for encoding to and decoding from the standard
/// base32 string format. The checksum is calculated and validated as part of
/// parsing and formatting.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Address(#[serde_as(as = "Bytes")] pub Byte32);

impl Address {
    /// Returns the 32 bytes of the address as a byte array reference.
    pub fn as_bytes(&self) -> &Byte32 {
        &self.0
    }

    /// Creates an [`Address`] directly from a 32-byte public key.
    pub fn from_pubkey(pub_key: &Byte32) -> Self {
        Address(*pub_key)
    }

    /// Computes the ledger-held account address for a contract instance.
    pub fn from_instance_id(instance_id: &u64) -> Self {
        let mut to_hash = b"instanceID".to_vec();
        to_hash.extend_from_slice(&instance_id.to_be_bytes());
        Address(hash(&to_hash))
    }

    /// Returns the base32-encoded string representation of the address, including the checksum.
    pub fn as_str(&self) -> String {
        let mut buffer = [0u8; MERIDIAN_PUBLIC_KEY_BYTE_LENGTH + MERIDIAN_CHECKSUM_BYTE_LENGTH];
        buffer[..MERIDIAN_PUBLIC_KEY_BYTE_LENGTH].copy_from_slice(&self.0);

        let checksum = self.checksum();
        buffer[MERIDIAN_PUBLIC_KEY_BYTE_LENGTH..].copy_from_slice(&checksum);

        base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &buffer)
    }

    /// Computes the 4-byte checksum for the address.
    pub fn checksum(&self) -> [u8; MERIDIAN_CHECKSUM_BYTE_LENGTH] {
        pub_key_to_checksum(&self.0)
    }
}

impl FromStr for Address {
    type Err = TransactError;

    /// Parses a 58-character base32 address string into an [`Address`] instance.
    ///
    /// Returns an error if the string is not exactly 58 characters, is not valid base32,
    /// or if the checksum does not match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != MERIDIAN_ADDRESS_LENGTH {
            return Err(TransactError::InvalidAddress {
                message: format!(
                    "Meridian address must be exactly {} characters",
                    MERIDIAN_ADDRESS_LENGTH
                ),
            });
        }
        let decoded_address = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, s)
            .ok_or_else(|| TransactError::InvalidAddress {
                message: "Invalid base32 encoding for Meridian address".to_string(),
            })?;

        // The leading 32 bytes are usually a public key, but can also be a hash
        // digest when the address names a contract instance account.
        let pub_key: [u8; MERIDIAN_PUBLIC_KEY_BYTE_LENGTH] = decoded_address
            [..MERIDIAN_PUBLIC_KEY_BYTE_LENGTH]
            .try_into()
            .map_err(|_| TransactError::InvalidAddress {
                message: "Could not decode address into 32-byte public key".to_string(),
            })?;
        let checksum: [u8; MERIDIAN_CHECKSUM_BYTE_LENGTH] = decoded_address
            [MERIDIAN_PUBLIC_KEY_BYTE_LENGTH..]
            .try_into()
            .map_err(|_| TransactError::InvalidAddress {
                message: "Could not get 4-byte checksum from decoded address".to_string(),
            })?;

        if pub_key_to_checksum(&pub_key) != checksum {
            return Err(TransactError::InvalidAddress {
                message: "Checksum is invalid".to_string(),
            });
        }
        Ok(Address(pub_key))
    }
}

impl Display for Address {
    /// Formats the address as a base32-encoded string.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
