use crate::{ABIError, ABIType, ABIValue};

impl ABIType {
    pub(crate) fn encode_byte(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match self {
            ABIType::Byte => {
                let byte_value = match value {
                    ABIValue::Byte(b) => b,
                    _ => {
                        return Err(ABIError::EncodingError {
                            message: "ABI value mismatch, expected byte".to_string(),
                        });
                    }
                };

                Ok(vec![*byte_value])
            }
            _ => Err(ABIError::EncodingError {
                message: "ABI type mismatch, expected byte".to_string(),
            }),
        }
    }

    pub(crate) fn decode_byte(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::Byte => {
                if bytes.len() != 1 {
                    return Err(ABIError::DecodingError {
                        message: format!(
                            "Invalid byte array length, expected 1 byte, got {}",
                            bytes.len()
                        ),
                    });
                }

                Ok(ABIValue::Byte(bytes[0]))
            }
            _ => Err(ABIError::DecodingError {
                message: "ABI type mismatch, expected byte".to_string(),
            }),
        }
    }
}
