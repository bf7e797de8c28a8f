use crate::constants::{
    Byte32, HASH_BYTES_LENGTH, MAX_TX_GROUP_SIZE, MERIDIAN_CHECKSUM_BYTE_LENGTH,
};
use crate::error::TransactError;
use crate::traits::TransactionId;
use crate::transactions::Transaction;
use sha2::{Digest, Sha512_256};

/// Domain separator for group identity hashing.
const GROUP_ID_PREFIX: &[u8] = b"TG";

/// SHA-512/256 digest of the input bytes.
pub(crate) fn hash(data: &[u8]) -> Byte32 {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The last 4 bytes of the public key digest, used as an address checksum.
pub(crate) fn pub_key_to_checksum(pub_key: &Byte32) -> [u8; MERIDIAN_CHECKSUM_BYTE_LENGTH] {
    let digest = hash(pub_key);
    let mut checksum = [0u8; MERIDIAN_CHECKSUM_BYTE_LENGTH];
    checksum.copy_from_slice(&digest[(HASH_BYTES_LENGTH - MERIDIAN_CHECKSUM_BYTE_LENGTH)..]);
    checksum
}

/// Computes the group id for a set of transactions as the hash of the
/// concatenated raw transaction ids behind a domain separator.
pub fn compute_group_id(transactions: &[Transaction]) -> Result<Byte32, TransactError> {
    if transactions.is_empty() {
        return Err(TransactError::InputError {
            message: String::from("Transaction group size cannot be 0"),
        });
    }
    if transactions.len() > MAX_TX_GROUP_SIZE {
        return Err(TransactError::InputError {
            message: format!(
                "Transaction group size exceeds the max limit of {}",
                MAX_TX_GROUP_SIZE
            ),
        });
    }

    let mut to_hash = GROUP_ID_PREFIX.to_vec();
    for transaction in transactions {
        to_hash.extend_from_slice(&transaction.id_raw()?);
    }

    Ok(hash(&to_hash))
}
