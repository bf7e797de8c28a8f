use num_bigint::BigUint;

use crate::{ABIError, ABIType, ABIValue, utils};

impl ABIType {
    pub(crate) fn encode_uint(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match self {
            ABIType::Uint(bit_size) => {
                let bit_size = bit_size.value();
                let value = match value {
                    ABIValue::Uint(n) => n,
                    _ => {
                        return Err(ABIError::EncodingError {
                            message: "ABI value mismatch, expected uint".to_string(),
                        });
                    }
                };

                if value >= &BigUint::from(2u64).pow(bit_size as u32) {
                    return Err(ABIError::EncodingError {
                        message: format!("{} is too big to fit in uint{}", value, bit_size),
                    });
                }

                Ok(utils::big_uint_to_bytes(value, (bit_size / 8) as usize))
            }
            _ => Err(ABIError::EncodingError {
                message: "ABI type mismatch, expected uint".to_string(),
            }),
        }
    }

    pub(crate) fn decode_uint(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::Uint(bit_size) => {
                let bit_size = bit_size.value();
                let expected_len = (bit_size / 8) as usize;
                if bytes.len() != expected_len {
                    return Err(ABIError::DecodingError {
                        message: format!(
                            "Invalid byte array length, expected {} bytes, got {}",
                            expected_len,
                            bytes.len()
                        ),
                    });
                }

                Ok(ABIValue::Uint(BigUint::from_bytes_be(bytes)))
            }
            _ => Err(ABIError::DecodingError {
                message: "ABI type mismatch, expected uint".to_string(),
            }),
        }
    }
}
