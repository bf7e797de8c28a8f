use num_bigint::BigUint;

/// Represents a value that can be encoded or decoded as an ABI type.
#[derive(Debug, Clone, PartialEq)]
pub enum ABIValue {
    /// A boolean value.
    Bool(bool),
    /// An unsigned integer value.
    Uint(BigUint),
    /// A string value.
    String(String),
    /// A byte value.
    Byte(u8),
    /// An array of ABI values.
    Array(Vec<ABIValue>),
    /// A Meridian account address.
    Address(String),
}

impl From<bool> for ABIValue {
    fn from(value: bool) -> Self {
        ABIValue::Bool(value)
    }
}

impl From<BigUint> for ABIValue {
    fn from(value: BigUint) -> Self {
        ABIValue::Uint(value)
    }
}

impl From<u8> for ABIValue {
    fn from(value: u8) -> Self {
        ABIValue::Uint(BigUint::from(value))
    }
}

impl From<u16> for ABIValue {
    fn from(value: u16) -> Self {
        ABIValue::Uint(BigUint::from(value))
    }
}

impl From<u32> for ABIValue {
    fn from(value: u32) -> Self {
        ABIValue::Uint(BigUint::from(value))
    }
}

impl From<u64> for ABIValue {
    fn from(value: u64) -> Self {
        ABIValue::Uint(BigUint::from(value))
    }
}

impl From<u128> for ABIValue {
    fn from(value: u128) -> Self {
        ABIValue::Uint(BigUint::from(value))
    }
}

impl From<String> for ABIValue {
    fn from(value: String) -> Self {
        ABIValue::String(value)
    }
}

impl From<&str> for ABIValue {
    fn from(value: &str) -> Self {
        ABIValue::String(value.to_string())
    }
}

impl From<Vec<ABIValue>> for ABIValue {
    fn from(value: Vec<ABIValue>) -> Self {
        ABIValue::Array(value)
    }
}

impl ABIValue {
    /// Create an ABIValue::Byte from a u8 value
    pub fn from_byte(value: u8) -> Self {
        ABIValue::Byte(value)
    }

    /// Create an ABIValue::Address from a string
    pub fn from_address<S: Into<String>>(value: S) -> Self {
        ABIValue::Address(value.into())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_from_bool() {
        assert_eq!(ABIValue::from(true), ABIValue::Bool(true));
        assert_eq!(ABIValue::from(false), ABIValue::Bool(false));
    }

    #[rstest]
    #[case(ABIValue::from(42u8), ABIValue::Uint(BigUint::from(42u8)))]
    #[case(ABIValue::from(1000u16), ABIValue::Uint(BigUint::from(1000u16)))]
    #[case(ABIValue::from(100000u32), ABIValue::Uint(BigUint::from(100000u32)))]
    #[case(
        ABIValue::from(10000000000u64),
        ABIValue::Uint(BigUint::from(10000000000u64))
    )]
    #[case(
        ABIValue::from(BigUint::from(999999u64)),
        ABIValue::Uint(BigUint::from(999999u64))
    )]
    fn test_from_uint_types(#[case] abi_value_1: ABIValue, #[case] abi_value_2: ABIValue) {
        assert_eq!(abi_value_1, abi_value_2);
    }

    #[test]
    fn test_from_string() {
        let value = ABIValue::from("hello world".to_string());
        assert_eq!(value, ABIValue::String("hello world".to_string()));

        let value = ABIValue::from("hello world");
        assert_eq!(value, ABIValue::String("hello world".to_string()));
    }

    #[test]
    fn test_from_array() {
        let array = vec![
            ABIValue::Bool(true),
            ABIValue::Uint(BigUint::from(42u8)),
            ABIValue::String("test".to_string()),
        ];
        let value = ABIValue::from(array.clone());
        assert_eq!(value, ABIValue::Array(array));
    }

    #[test]
    fn test_from_byte() {
        assert_eq!(ABIValue::from_byte(255u8), ABIValue::Byte(255u8));
    }
}
