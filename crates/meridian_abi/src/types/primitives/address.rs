use sha2::{Digest, Sha512_256};

use crate::{
    ABIError, ABIType, ABIValue,
    constants::{
        HASH_BYTES_LENGTH, MERIDIAN_ADDRESS_LENGTH, MERIDIAN_CHECKSUM_BYTE_LENGTH,
        MERIDIAN_PUBLIC_KEY_BYTE_LENGTH,
    },
};

impl ABIType {
    pub(crate) fn encode_address(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match self {
            ABIType::Address => {
                let address_str = match value {
                    ABIValue::Address(a) => a,
                    _ => {
                        return Err(ABIError::EncodingError {
                            message: "ABI value mismatch, expected address string".to_string(),
                        });
                    }
                };

                if address_str.len() != MERIDIAN_ADDRESS_LENGTH {
                    return Err(ABIError::ValidationError {
                        message: format!(
                            "Meridian address must be exactly {} characters",
                            MERIDIAN_ADDRESS_LENGTH
                        ),
                    });
                }
                let decoded_address =
                    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, address_str)
                        .ok_or_else(|| ABIError::ValidationError {
                            message: "Invalid base32 encoding for Meridian address".to_string(),
                        })?[..MERIDIAN_PUBLIC_KEY_BYTE_LENGTH]
                        .to_vec();

                Ok(decoded_address)
            }
            _ => Err(ABIError::EncodingError {
                message: "ABI type mismatch, expected address".to_string(),
            }),
        }
    }

    pub(crate) fn decode_address(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::Address => {
                if bytes.len() != MERIDIAN_PUBLIC_KEY_BYTE_LENGTH {
                    return Err(ABIError::DecodingError {
                        message: format!(
                            "Address byte string must be {} bytes long",
                            MERIDIAN_PUBLIC_KEY_BYTE_LENGTH
                        ),
                    });
                }
                let bytes: &[u8; MERIDIAN_PUBLIC_KEY_BYTE_LENGTH] =
                    bytes.try_into().map_err(|_| ABIError::DecodingError {
                        message: format!(
                            "Failed to convert bytes to [u8; {}] for checksum",
                            MERIDIAN_PUBLIC_KEY_BYTE_LENGTH
                        ),
                    })?;

                let mut buffer =
                    [0u8; MERIDIAN_PUBLIC_KEY_BYTE_LENGTH + MERIDIAN_CHECKSUM_BYTE_LENGTH];
                buffer[..MERIDIAN_PUBLIC_KEY_BYTE_LENGTH].copy_from_slice(bytes);

                let checksum = get_checksum(bytes);
                buffer[MERIDIAN_PUBLIC_KEY_BYTE_LENGTH..].copy_from_slice(&checksum);

                let address_str =
                    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &buffer);

                Ok(ABIValue::Address(address_str))
            }
            _ => Err(ABIError::DecodingError {
                message: "ABI type mismatch, expected address".to_string(),
            }),
        }
    }
}

fn get_checksum(
    pub_key: &[u8; MERIDIAN_PUBLIC_KEY_BYTE_LENGTH],
) -> [u8; MERIDIAN_CHECKSUM_BYTE_LENGTH] {
    let mut hasher = Sha512_256::new();
    hasher.update(pub_key);

    let mut checksum = [0u8; MERIDIAN_CHECKSUM_BYTE_LENGTH];
    checksum.copy_from_slice(
        &hasher.finalize()[(HASH_BYTES_LENGTH - MERIDIAN_CHECKSUM_BYTE_LENGTH)..],
    );

    checksum
}
