use crate::{ABIError, ABIType, ABIValue, constants::LENGTH_ENCODE_BYTE_SIZE};

impl ABIType {
    pub(crate) fn encode_string(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match self {
            ABIType::String => {
                let value = match value {
                    ABIValue::String(s) => s,
                    _ => {
                        return Err(ABIError::EncodingError {
                            message: "ABI value mismatch, expected string".to_string(),
                        });
                    }
                };

                let utf8_bytes = value.as_bytes().to_vec();
                let length = utf8_bytes.len() as u16;
                let mut result = Vec::with_capacity(LENGTH_ENCODE_BYTE_SIZE + utf8_bytes.len());
                result.extend_from_slice(&length.to_be_bytes());
                result.extend_from_slice(&utf8_bytes);

                Ok(result)
            }
            _ => Err(ABIError::EncodingError {
                message: "ABI type mismatch, expected string".to_string(),
            }),
        }
    }

    pub(crate) fn decode_string(&self, value: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::String => {
                if value.len() < LENGTH_ENCODE_BYTE_SIZE {
                    return Err(ABIError::DecodingError {
                        message: "Byte array is too short for string".to_string(),
                    });
                }

                let length = u16::from_be_bytes([value[0], value[1]]) as usize;
                let content_bytes = &value[LENGTH_ENCODE_BYTE_SIZE..];
                if content_bytes.len() != length {
                    return Err(ABIError::DecodingError {
                        message: format!(
                            "Invalid byte array length for string, expected {} value, got {}",
                            length,
                            content_bytes.len()
                        ),
                    });
                }

                let string_value = String::from_utf8(content_bytes.to_vec()).map_err(|_| {
                    ABIError::DecodingError {
                        message: "Invalid UTF-8 encoding".to_string(),
                    }
                })?;
                Ok(ABIValue::String(string_value))
            }
            _ => Err(ABIError::DecodingError {
                message: "ABI type mismatch, expected string".to_string(),
            }),
        }
    }
}
