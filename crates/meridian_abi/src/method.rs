use crate::abi_type::ABIType;
use crate::abi_value::ABIValue;
use crate::constants::SELECTOR_BYTE_LENGTH;
use crate::error::ABIError;
use sha2::{Digest, Sha512_256};
use std::fmt::Display;
use std::str::FromStr;

/// Separator between the argument list and the return type in a method signature.
const RETURN_SEPARATOR: &str = "->";

/// Return values are stored in call logs behind this prefix.
pub const RETURN_LOG_PREFIX: &[u8] = &[0x15, 0x1f, 0x7c, 0x75];

/// Represents a parsed contract method, including its name, arguments, and return type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ABIMethod {
    /// The name of the method.
    pub name: String,
    /// A list of the method's arguments.
    pub args: Vec<ABIMethodArg>,
    /// The return type of the method, or `None` if the method does not return a value.
    pub returns: Option<ABIType>,
    /// An optional description of the method.
    pub description: Option<String>,
}

/// Represents an argument in a contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ABIMethodArg {
    /// The declared type of the argument.
    pub arg_type: ABIType,
    /// An optional name for the argument.
    pub name: Option<String>,
    /// An optional description of the argument.
    pub description: Option<String>,
}

impl ABIMethodArg {
    /// Creates a new method argument.
    pub fn new(arg_type: ABIType, name: Option<String>, description: Option<String>) -> Self {
        Self {
            arg_type,
            name,
            description,
        }
    }
}

impl ABIMethod {
    /// Creates a new contract method.
    pub fn new(
        name: String,
        args: Vec<ABIMethodArg>,
        returns: Option<ABIType>,
        description: Option<String>,
    ) -> Self {
        Self {
            name,
            args,
            returns,
            description,
        }
    }

    /// Returns the method signature as a string, e.g. `greet(string)->string`.
    pub fn signature(&self) -> Result<String, ABIError> {
        if self.name.is_empty() {
            return Err(ABIError::ValidationError {
                message: "Method name cannot be empty".to_string(),
            });
        }

        let arg_types: Vec<String> = self.args.iter().map(|arg| arg.arg_type.to_string()).collect();

        let mut signature = format!("{}({})", self.name, arg_types.join(","));
        if let Some(return_type) = self.returns.as_ref() {
            signature.push_str(RETURN_SEPARATOR);
            signature.push_str(&return_type.to_string());
        }

        if signature.chars().any(|c| c.is_whitespace()) {
            return Err(ABIError::ValidationError {
                message: "Generated signature contains whitespace".to_string(),
            });
        }

        Ok(signature)
    }

    /// Returns the method selector, which is the first 4 bytes of the SHA-512/256
    /// hash of the method signature.
    pub fn selector(&self) -> Result<Vec<u8>, ABIError> {
        let signature = self.signature()?;

        let mut hasher = Sha512_256::new();
        hasher.update(signature.as_bytes());
        let hash = hasher.finalize();

        Ok(hash[..SELECTOR_BYTE_LENGTH].to_vec())
    }

    /// Encodes a list of bound argument values against the declared parameter list.
    ///
    /// Returns one encoded byte sequence per argument, in declaration order.
    /// Fails with [`ABIError::ArgumentCountMismatch`] when the number of values
    /// differs from the declared parameters, and with
    /// [`ABIError::ArgumentTypeMismatch`] when a value's runtime type does not
    /// match its declared parameter type.
    pub fn encode_args(&self, values: &[ABIValue]) -> Result<Vec<Vec<u8>>, ABIError> {
        if values.len() != self.args.len() {
            return Err(ABIError::ArgumentCountMismatch {
                expected: self.args.len(),
                actual: values.len(),
            });
        }

        self.args
            .iter()
            .zip(values)
            .enumerate()
            .map(|(position, (arg, value))| {
                arg.arg_type
                    .encode(value)
                    .map_err(|source| ABIError::ArgumentTypeMismatch {
                        position,
                        expected: arg.arg_type.to_string(),
                        message: source.to_string(),
                    })
            })
            .collect()
    }

    /// Decodes a raw returned byte sequence as the method's declared return type.
    ///
    /// Fails with [`ABIError::ReturnDecodeError`] when the method is void, or when
    /// the byte sequence is malformed or its length is inconsistent with the
    /// declared type.
    pub fn decode_return(&self, bytes: &[u8]) -> Result<ABIValue, ABIError> {
        let return_type = self
            .returns
            .as_ref()
            .ok_or_else(|| ABIError::ReturnDecodeError {
                message: format!("Method {} is void and has no return value", self.name),
            })?;

        return_type
            .decode(bytes)
            .map_err(|source| ABIError::ReturnDecodeError {
                message: source.to_string(),
            })
    }
}

impl Display for ABIMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.signature() {
            Ok(signature) => write!(f, "{}", signature),
            Err(_) => write!(f, "{}(<invalid>)", self.name),
        }
    }
}

impl FromStr for ABIMethod {
    type Err = ABIError;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        if signature.chars().any(|c| c.is_whitespace()) {
            return Err(ABIError::ValidationError {
                message: "Method signature cannot contain whitespace".to_string(),
            });
        }

        let open_paren_pos = signature.find('(').ok_or_else(|| {
            ABIError::ValidationError {
                message: "Method signature must contain opening parenthesis".to_string(),
            }
        })?;

        if open_paren_pos == 0 {
            return Err(ABIError::ValidationError {
                message: "Method name cannot be empty".to_string(),
            });
        }
        let method_name = signature[..open_paren_pos].to_string();

        let close_paren_pos = find_matching_closing_paren(signature, open_paren_pos)?;

        let args_str = &signature[open_paren_pos + 1..close_paren_pos];

        let arguments = if args_str.is_empty() {
            Vec::new()
        } else {
            split_arguments_by_comma(args_str)?
        };

        let rest = &signature[close_paren_pos + 1..];
        let returns = if rest.is_empty() {
            None
        } else {
            let return_type_str = rest.strip_prefix(RETURN_SEPARATOR).ok_or_else(|| {
                ABIError::ValidationError {
                    message: format!(
                        "Expected '{}' before return type in method signature",
                        RETURN_SEPARATOR
                    ),
                }
            })?;
            Some(ABIType::from_str(return_type_str)?)
        };

        let mut args = Vec::new();
        for (i, arg_type) in arguments.iter().enumerate() {
            let parsed_type = ABIType::from_str(arg_type)?;
            args.push(ABIMethodArg::new(parsed_type, Some(format!("arg{}", i)), None));
        }

        Ok(ABIMethod::new(method_name, args, returns, None))
    }
}

/// Find the matching closing parenthesis for an opening parenthesis.
fn find_matching_closing_paren(s: &str, open_pos: usize) -> Result<usize, ABIError> {
    let chars: Vec<char> = s.chars().collect();
    let mut depth = 0;

    for (i, &ch) in chars.iter().enumerate().skip(open_pos) {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }

    Err(ABIError::ValidationError {
        message: "Mismatched parentheses in method signature".to_string(),
    })
}

/// Split arguments by comma, respecting nested parentheses.
fn split_arguments_by_comma(args_str: &str) -> Result<Vec<String>, ABIError> {
    use crate::abi_type::parse_tuple_content;

    let arguments = parse_tuple_content(args_str)?;

    for arg in &arguments {
        if arg.trim().is_empty() {
            return Err(ABIError::ValidationError {
                message: "Empty argument in method signature".to_string(),
            });
        }
    }

    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use rstest::rstest;

    #[rstest]
    #[case("add(uint64,uint64)->uint64", "add", Some("uint64"), 2)]
    #[case("getName()->string", "getName", Some("string"), 0)]
    #[case("doSomething(uint64)", "doSomething", None, 1)]
    #[case("transfer(address,uint64)->bool", "transfer", Some("bool"), 2)]
    #[case("store((uint64,string))", "store", None, 1)]
    fn method_from_str_valid(
        #[case] signature: &str,
        #[case] expected_name: &str,
        #[case] expected_return: Option<&str>,
        #[case] expected_arg_count: usize,
    ) {
        let method = ABIMethod::from_str(signature).unwrap();
        assert_eq!(method.name, expected_name);
        assert_eq!(method.args.len(), expected_arg_count);

        if let Some(return_str) = expected_return {
            let expected_abi_type = ABIType::from_str(return_str).unwrap();
            assert_eq!(method.returns, Some(expected_abi_type));
        } else {
            assert_eq!(method.returns, None);
        }
    }

    #[rstest]
    #[case("add(uint64, uint64)->uint64")] // whitespace
    #[case("(uint64)->uint64")] // empty name
    #[case("method")] // no parenthesis
    #[case("add(uint64)uint64")] // missing return separator
    #[case("add(uint64,)->uint64")] // trailing comma
    fn method_from_str_invalid(#[case] signature: &str) {
        assert!(ABIMethod::from_str(signature).is_err());
    }

    // Selector verification - critical for hash correctness
    #[rstest]
    #[case("greet(string)->string", "d8e5fb17")]
    #[case("add(uint64,uint64)->uint64", "fc3941f8")]
    #[case("bump()->uint64", "f541d3f7")]
    #[case("reset()", "06d7d885")]
    fn method_selector(#[case] signature: &str, #[case] expected_hex: &str) {
        let method = ABIMethod::from_str(signature).unwrap();
        let selector = method.selector().unwrap();
        assert_eq!(hex::encode(&selector), expected_hex);
        assert_eq!(selector.len(), 4);
    }

    #[rstest]
    #[case("add(uint64,uint64)->uint64")]
    #[case("optIn()")]
    #[case("greet(string)->string")]
    fn signature_round_trip(#[case] signature: &str) {
        let method = ABIMethod::from_str(signature).unwrap();
        assert_eq!(method.signature().unwrap(), signature);
    }

    #[test]
    fn encode_args_happy_path() {
        let method = ABIMethod::from_str("add(uint64,uint64)->uint64").unwrap();
        let encoded = method
            .encode_args(&[ABIValue::from(1u64), ABIValue::from(2u64)])
            .unwrap();
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0], vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encoded[1], vec![0, 0, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn encode_args_count_mismatch() {
        let method = ABIMethod::from_str("add(uint64,uint64)->uint64").unwrap();
        let result = method.encode_args(&[ABIValue::from(1u64)]);
        assert!(matches!(
            result,
            Err(ABIError::ArgumentCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn encode_args_type_mismatch() {
        let method = ABIMethod::from_str("greet(string)->string").unwrap();
        let result = method.encode_args(&[ABIValue::from(42u64)]);
        match result {
            Err(ABIError::ArgumentTypeMismatch {
                position, expected, ..
            }) => {
                assert_eq!(position, 0);
                assert_eq!(expected, "string");
            }
            other => panic!("Expected ArgumentTypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn decode_return_round_trip() {
        let method = ABIMethod::from_str("greet(string)->string").unwrap();
        let encoded = ABIType::String
            .encode(&ABIValue::String("Hello, World".to_string()))
            .unwrap();
        let decoded = method.decode_return(&encoded).unwrap();
        assert_eq!(decoded, ABIValue::String("Hello, World".to_string()));
    }

    #[test]
    fn decode_return_wrong_length() {
        let method = ABIMethod::from_str("total()->uint64").unwrap();
        // uint64 must be exactly 8 bytes
        let result = method.decode_return(&[0, 0, 1]);
        assert!(matches!(result, Err(ABIError::ReturnDecodeError { .. })));
    }

    #[test]
    fn decode_return_on_void_method() {
        let method = ABIMethod::from_str("reset()").unwrap();
        let result = method.decode_return(&[]);
        assert!(matches!(result, Err(ABIError::ReturnDecodeError { .. })));
    }

    #[test]
    fn decode_return_uint() {
        let method = ABIMethod::from_str("bump()->uint64").unwrap();
        let decoded = method.decode_return(&[0, 0, 0, 0, 0, 0, 0, 7]).unwrap();
        assert_eq!(decoded, ABIValue::Uint(BigUint::from(7u64)));
    }

    #[test]
    fn empty_method_name_error() {
        let method = ABIMethod::new("".to_string(), vec![], None, None);
        assert!(method.signature().is_err());
    }
}
