use crate::constants::Byte32;
use crate::error::TransactError;
use crate::utils::hash;
use serde::{Serialize, de::DeserializeOwned};

/// Canonical msgpack encoding with an optional domain-separation prefix.
///
/// The canonical byte form is what gets hashed for identity and signed by
/// account keys, so it must be stable for a given value.
pub trait CanonicalMsgpack: Serialize + DeserializeOwned {
    /// Domain-separation prefix prepended to the raw encoding.
    const PREFIX: &'static [u8] = b"";

    /// Encodes the value to canonical msgpack without the prefix.
    fn encode_raw(&self) -> Result<Vec<u8>, TransactError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Encodes the value to canonical msgpack with the domain prefix.
    fn encode(&self) -> Result<Vec<u8>, TransactError> {
        let mut buffer = Self::PREFIX.to_vec();
        buffer.extend_from_slice(&self.encode_raw()?);
        Ok(buffer)
    }

    /// Decodes a value from msgpack bytes, accepting either the prefixed or
    /// the raw encoding.
    fn decode(bytes: &[u8]) -> Result<Self, TransactError> {
        let raw = bytes.strip_prefix(Self::PREFIX).unwrap_or(bytes);
        Ok(rmp_serde::from_slice(raw)?)
    }
}

/// Stable identity for transactions, derived from the canonical encoding.
pub trait TransactionId: CanonicalMsgpack {
    /// Generates the raw transaction id as a hash of the prefixed encoding.
    fn id_raw(&self) -> Result<Byte32, TransactError> {
        Ok(hash(&self.encode()?))
    }

    /// Generates the transaction id as a base32 string.
    fn id(&self) -> Result<String, TransactError> {
        Ok(base32::encode(
            base32::Alphabet::Rfc4648 { padding: false },
            &self.id_raw()?,
        ))
    }
}

/// Grouping operations over an ordered set of transactions.
pub trait Transactions {
    /// Assigns the computed group id to every transaction in the set.
    fn assign_group(self) -> Result<Vec<crate::transactions::Transaction>, TransactError>;
}
