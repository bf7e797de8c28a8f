use crate::{
    ABIError, ABIValue,
    constants::{
        BITS_PER_BYTE, MAX_BIT_SIZE, MERIDIAN_PUBLIC_KEY_BYTE_LENGTH, STATIC_ARRAY_REGEX,
    },
    types::collections::tuple::find_bool_sequence_end,
};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Represents a validated bit size for ABI uint types (8-512, multiple of 8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSize(u16);

impl BitSize {
    /// Creates a new [`BitSize`] with validation.
    ///
    /// # Arguments
    /// * `bits` - The bit size, must be 8-512 and divisible by 8.
    ///
    /// # Returns
    /// A new [`BitSize`] if valid, or an [`ABIError`] if invalid.
    pub fn new(bits: u16) -> Result<Self, ABIError> {
        if bits < BITS_PER_BYTE as u16 || bits > MAX_BIT_SIZE || bits % BITS_PER_BYTE as u16 != 0 {
            return Err(ABIError::ValidationError {
                message: format!(
                    "Bit size must be between {} and {} and divisible by {}, got {}",
                    BITS_PER_BYTE, MAX_BIT_SIZE, BITS_PER_BYTE, bits
                ),
            });
        }
        Ok(BitSize(bits))
    }

    /// Returns the bit size value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Represents a Meridian ABI type for encoding and decoding method call values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ABIType {
    /// An unsigned integer of a specific bit size.
    Uint(BitSize),
    /// A Meridian account address.
    Address,
    /// A tuple of other ABI types.
    Tuple(Vec<ABIType>),
    /// A dynamic-length string.
    String,
    /// A single byte.
    Byte,
    /// A boolean value.
    Bool,
    /// A static-length array of another ABI type.
    StaticArray(Box<ABIType>, usize),
    /// A dynamic-length array of another ABI type.
    DynamicArray(Box<ABIType>),
}

impl AsRef<ABIType> for ABIType {
    fn as_ref(&self) -> &ABIType {
        self
    }
}

impl ABIType {
    /// Encodes an [`ABIValue`] according to this ABI type specification.
    ///
    /// # Arguments
    /// * `value` - The value to encode, must match this type.
    ///
    /// # Returns
    /// The encoded bytes if successful, or an [`ABIError`] if encoding fails.
    pub fn encode(&self, value: &ABIValue) -> Result<Vec<u8>, ABIError> {
        match self {
            ABIType::Uint(_) => self.encode_uint(value),
            ABIType::Address => self.encode_address(value),
            ABIType::Tuple(_) => self.encode_tuple(value),
            ABIType::StaticArray(_, _size) => self.encode_static_array(value),
            ABIType::DynamicArray(_) => self.encode_dynamic_array(value),
            ABIType::String => self.encode_string(value),
            ABIType::Byte => self.encode_byte(value),
            ABIType::Bool => self.encode_bool(value),
        }
    }

    /// Decodes bytes according to this ABI type specification.
    ///
    /// # Arguments
    /// * `bytes` - The encoded bytes to decode.
    ///
    /// # Returns
    /// The decoded [`ABIValue`] if successful, or an [`ABIError`] if decoding fails.
    pub fn decode(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        match self {
            ABIType::Uint(_) => self.decode_uint(bytes),
            ABIType::Address => self.decode_address(bytes),
            ABIType::String => self.decode_string(bytes),
            ABIType::Bool => self.decode_bool(bytes),
            ABIType::Byte => self.decode_byte(bytes),
            ABIType::Tuple(_) => self.decode_tuple(bytes),
            ABIType::StaticArray(_, _size) => self.decode_static_array(bytes),
            ABIType::DynamicArray(_) => self.decode_dynamic_array(bytes),
        }
    }

    pub(crate) fn is_dynamic(&self) -> bool {
        match self {
            ABIType::StaticArray(child_type, _) => child_type.is_dynamic(),
            ABIType::Tuple(child_types) => child_types.iter().any(|t| t.is_dynamic()),
            ABIType::DynamicArray(_) | ABIType::String => true,
            _ => false,
        }
    }

    pub(crate) fn get_size(abi_type: &ABIType) -> Result<usize, ABIError> {
        match abi_type {
            ABIType::Uint(bit_size) => Ok((bit_size.value() / BITS_PER_BYTE as u16) as usize),
            ABIType::Address => Ok(MERIDIAN_PUBLIC_KEY_BYTE_LENGTH),
            ABIType::Bool => Ok(1),
            ABIType::Byte => Ok(1),
            ABIType::StaticArray(child_type, size) => match child_type.as_ref() {
                ABIType::Bool => Ok((*size).div_ceil(BITS_PER_BYTE as usize)),
                _ => Ok(Self::get_size(child_type)? * *size),
            },
            ABIType::Tuple(child_types) => {
                let mut size = 0;
                let mut i = 0;
                while i < child_types.len() {
                    let child_type = &child_types[i];
                    match child_type {
                        ABIType::Bool => {
                            let sequence_end_index = find_bool_sequence_end(child_types, i);
                            let bool_count = sequence_end_index - i + 1;

                            size += bool_count.div_ceil(BITS_PER_BYTE as usize);
                            i = sequence_end_index + 1;
                        }
                        _ => {
                            size += Self::get_size(child_type)?;
                            i += 1;
                        }
                    }
                }
                Ok(size)
            }
            ABIType::String | ABIType::DynamicArray(_) => Err(ABIError::DecodingError {
                message: format!("Failed to get size, {} is a dynamic type", abi_type),
            }),
        }
    }
}

impl Display for ABIType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ABIType::Uint(bit_size) => write!(f, "uint{}", bit_size.value()),
            ABIType::Address => write!(f, "address"),
            ABIType::Tuple(child_types) => {
                let type_strings: Vec<String> = child_types.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", type_strings.join(","))
            }
            ABIType::String => write!(f, "string"),
            ABIType::Byte => write!(f, "byte"),
            ABIType::Bool => write!(f, "bool"),
            ABIType::StaticArray(child_type, length) => {
                write!(f, "{}[{}]", child_type, length)
            }
            ABIType::DynamicArray(child_type) => {
                write!(f, "{}[]", child_type)
            }
        }
    }
}

impl FromStr for ABIType {
    type Err = ABIError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Dynamic array
        if let Some(element_type_str) = s.strip_suffix("[]") {
            let element_type = ABIType::from_str(element_type_str)?;
            return Ok(ABIType::DynamicArray(Box::new(element_type)));
        }

        // Static array
        if s.ends_with(']') {
            let regex = &*STATIC_ARRAY_REGEX;
            if let Some(captures) = regex.captures(s) {
                let element_type_str = &captures[1];
                let length_str = &captures[2];

                let length = length_str.parse::<usize>().map_err(|_| {
                    ABIError::ValidationError {
                        message: format!("Invalid array length: {}", length_str),
                    }
                })?;

                let element_type = ABIType::from_str(element_type_str)?;
                return Ok(ABIType::StaticArray(Box::new(element_type), length));
            } else {
                return Err(ABIError::ValidationError {
                    message: format!("Malformed static array string: {}", s),
                });
            }
        }

        // Uint type
        if let Some(size_str) = s.strip_prefix("uint") {
            if size_str.chars().all(|c| c.is_ascii_digit()) {
                let size = size_str.parse::<u16>().map_err(|_| {
                    ABIError::ValidationError {
                        message: format!("Invalid uint size: {}", size_str),
                    }
                })?;
                let bit_size = BitSize::new(size)?;
                return Ok(ABIType::Uint(bit_size));
            } else {
                return Err(ABIError::ValidationError {
                    message: format!("Malformed uint string: {}", size_str),
                });
            }
        }

        // Tuple type
        if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
            let tuple_type_strings: Vec<_> = parse_tuple_content(&s[1..s.len() - 1])?;
            let child_types: Result<Vec<_>, _> = tuple_type_strings
                .iter()
                .map(|str| ABIType::from_str(str))
                .collect();

            return Ok(ABIType::Tuple(child_types?));
        }

        // Simple types
        match s {
            "byte" => Ok(ABIType::Byte),
            "bool" => Ok(ABIType::Bool),
            "address" => Ok(ABIType::Address),
            "string" => Ok(ABIType::String),
            _ => Err(ABIError::ValidationError {
                message: format!("Cannot convert string '{}' to an ABI type", s),
            }),
        }
    }
}

pub(crate) fn parse_tuple_content(content: &str) -> Result<Vec<String>, ABIError> {
    if content.is_empty() {
        return Ok(Vec::new());
    }

    if content.starts_with(',') || content.ends_with(',') {
        return Err(ABIError::ValidationError {
            message: "Tuple content must not start or end with a comma".to_string(),
        });
    }
    if content.contains(",,") {
        return Err(ABIError::ValidationError {
            message: "Tuple content must not have consecutive commas".to_string(),
        });
    }

    let mut tuple_strings: Vec<String> = Vec::new();
    let mut depth = 0;
    let mut word: String = String::new();

    for ch in content.chars() {
        word.push(ch);
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                word.pop();
                tuple_strings.push(word);
                word = String::new();
            }
            _ => {}
        }
    }
    if !word.is_empty() {
        tuple_strings.push(word);
    }
    if depth != 0 {
        return Err(ABIError::ValidationError {
            message: "Tuple string has mismatched parentheses".to_string(),
        });
    }

    Ok(tuple_strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use rstest::rstest;

    #[rstest]
    #[case(
        ABIType::Uint(BitSize::new(8).unwrap()),
        ABIValue::Uint(BigUint::from(0u8)),
        &[0]
    )]
    #[case(
        ABIType::Uint(BitSize::new(16).unwrap()),
        ABIValue::Uint(BigUint::from(3u16)),
        &[0, 3]
    )]
    #[case(
        ABIType::Uint(BitSize::new(64).unwrap()),
        ABIValue::Uint(BigUint::from(256u64)),
        &[0, 0, 0, 0, 0, 0, 1, 0]
    )]
    #[case(
        ABIType::String,
        ABIValue::String("asdf".to_string()),
        &[0, 4, 97, 115, 100, 102]
    )]
    #[case(
        ABIType::Byte,
        ABIValue::Byte(10),
        &[10]
    )]
    #[case(
        ABIType::Bool,
        ABIValue::Bool(true),
        &[128]
    )]
    #[case(
        ABIType::Bool,
        ABIValue::Bool(false),
        &[0]
    )]
    #[case(
        ABIType::StaticArray(Box::new(ABIType::Bool), 3),
        ABIValue::Array(vec![ABIValue::Bool(true), ABIValue::Bool(true), ABIValue::Bool(false)]),
        &[192]
    )]
    #[case(
        ABIType::StaticArray(Box::new(ABIType::Bool), 9),
        ABIValue::Array(vec![ABIValue::Bool(true), ABIValue::Bool(false), ABIValue::Bool(false), ABIValue::Bool(true), ABIValue::Bool(false), ABIValue::Bool(false), ABIValue::Bool(true), ABIValue::Bool(false), ABIValue::Bool(true)]),
        &[146, 128]
    )]
    #[case(
        ABIType::StaticArray(Box::new(ABIType::Uint(BitSize::new(64).unwrap())), 3),
        ABIValue::Array(vec![ABIValue::Uint(BigUint::from(1u64)), ABIValue::Uint(BigUint::from(2u64)), ABIValue::Uint(BigUint::from(3u64))]),
        &[0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 3]
    )]
    #[case(
        ABIType::DynamicArray(Box::new(ABIType::Bool)),
        ABIValue::Array(vec![]),
        &[0, 0]
    )]
    #[case(
        ABIType::DynamicArray(Box::new(ABIType::Bool)),
        ABIValue::Array(vec![ABIValue::Bool(true), ABIValue::Bool(true), ABIValue::Bool(false)]),
        &[0, 3, 192]
    )]
    #[case(
        ABIType::from_str("()").unwrap(),
        ABIValue::Array(vec![]),
        &[]
    )]
    #[case(
        ABIType::from_str("(bool,bool,bool)").unwrap(),
        ABIValue::Array(vec![ABIValue::Bool(false), ABIValue::Bool(true), ABIValue::Bool(true)]),
        &[96]
    )]
    #[case(
        ABIType::from_str("(bool[])").unwrap(),
        ABIValue::Array(vec![ABIValue::Array(vec![ABIValue::Bool(false), ABIValue::Bool(true), ABIValue::Bool(true)])]),
        &[0, 2, 0, 3, 96]
    )]
    #[case(
        ABIType::from_str("(bool[2],bool[])").unwrap(),
        ABIValue::Array(vec![ABIValue::Array(vec![ABIValue::Bool(true), ABIValue::Bool(true)]), ABIValue::Array(vec![ABIValue::Bool(true), ABIValue::Bool(true)])]),
        &[192, 0, 3, 0, 2, 192]
    )]
    #[case(
        ABIType::from_str("(string,bool,bool,bool,bool,string)").unwrap(),
        ABIValue::Array(vec![ABIValue::String("AB".to_string()), ABIValue::Bool(true), ABIValue::Bool(false), ABIValue::Bool(true), ABIValue::Bool(false), ABIValue::String("DE".to_string())]),
        &[0, 5, 160, 0, 9, 0, 2, 65, 66, 0, 2, 68, 69]
    )]
    #[case(
        ABIType::Tuple(vec![ABIType::Uint(BitSize::new(8).unwrap()),
        ABIType::Uint(BitSize::new(16).unwrap())]), ABIValue::Array(vec![ABIValue::Uint(BigUint::from(1u8)), ABIValue::Uint(BigUint::from(2u16))]),
        &[1, 0, 2]
    )]
    #[case(
        ABIType::Tuple(vec![ABIType::Uint(BitSize::new(32).unwrap()),
        ABIType::String]), ABIValue::Array(vec![ABIValue::Uint(BigUint::from(42u32)), ABIValue::String("hello".to_string())]),
        &[0, 0, 0, 42, 0, 6, 0, 5, 104, 101, 108, 108, 111]
    )]
    #[case(
        ABIType::Tuple(vec![ABIType::Uint(BitSize::new(16).unwrap()),
        ABIType::Bool]), ABIValue::Array(vec![ABIValue::Uint(BigUint::from(1234u32)), ABIValue::Bool(false)]),
        &[4, 210, 0]
    )]
    #[case(
        ABIType::Tuple(vec![ABIType::Uint(BitSize::new(32).unwrap()),
        ABIType::String, ABIType::Bool]), ABIValue::Array(vec![ABIValue::Uint(BigUint::from(42u32)), ABIValue::String("test".to_string()), ABIValue::Bool(false)]),
        &[0, 0, 0, 42, 0, 7, 0, 0, 4, 116, 101, 115, 116]
    )]
    fn should_round_trip(
        #[case] abi_type: ABIType,
        #[case] abi_value: ABIValue,
        #[case] expected_encoded_value: &[u8],
    ) {
        let encoded = abi_type.encode(&abi_value).expect("Failed to encode");
        assert_eq!(encoded, expected_encoded_value);
        let decoded = abi_type.decode(&encoded).expect("Failed to decode");
        assert_eq!(decoded, abi_value);
    }

    #[rstest]
    #[case("uint64")]
    #[case("uint8")]
    #[case("byte")]
    #[case("bool")]
    #[case("address")]
    #[case("string")]
    #[case("uint64[]")]
    #[case("uint64[3]")]
    #[case("(uint64,string)")]
    #[case("(uint64,(byte,bool))")]
    fn type_string_round_trip(#[case] type_str: &str) {
        let abi_type = ABIType::from_str(type_str).unwrap();
        assert_eq!(abi_type.to_string(), type_str);
    }

    #[rstest]
    #[case("uint0")]
    #[case("uint513")]
    #[case("uint7")]
    #[case("int64")]
    #[case("(uint64,,string)")]
    #[case("uint64[x]")]
    fn invalid_type_strings(#[case] type_str: &str) {
        assert!(ABIType::from_str(type_str).is_err());
    }
}
