use crate::{
    ABIError, ABIType, ABIValue,
    constants::{BOOL_FALSE_BYTE, BOOL_TRUE_BYTE},
};

impl ABIType {
    pub(crate) fn encode_bool(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match self {
            ABIType::Bool => {
                let bool_value = match value {
                    ABIValue::Bool(b) => b,
                    _ => {
                        return Err(ABIError::EncodingError {
                            message: "ABI value mismatch, expected boolean".to_string(),
                        });
                    }
                };

                match *bool_value {
                    true => Ok(vec![BOOL_TRUE_BYTE]),
                    false => Ok(vec![BOOL_FALSE_BYTE]),
                }
            }
            _ => Err(ABIError::EncodingError {
                message: "ABI type mismatch, expected bool".to_string(),
            }),
        }
    }

    pub(crate) fn decode_bool(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::Bool => {
                if bytes.len() != 1 {
                    return Err(ABIError::DecodingError {
                        message: "Bool string must be 1 byte long".to_string(),
                    });
                }

                match bytes[0] {
                    BOOL_TRUE_BYTE => Ok(ABIValue::Bool(true)),
                    BOOL_FALSE_BYTE => Ok(ABIValue::Bool(false)),
                    _ => Err(ABIError::DecodingError {
                        message: "Boolean could not be decoded from the byte string".to_string(),
                    }),
                }
            }
            _ => Err(ABIError::DecodingError {
                message: "ABI type mismatch, expected bool".to_string(),
            }),
        }
    }
}
