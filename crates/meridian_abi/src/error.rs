use snafu::Snafu;

/// Represents an error that can occur during ABI operations.
#[derive(Debug, Snafu)]
pub enum ABIError {
    /// An error that occurs during ABI type validation.
    #[snafu(display("ABI validation failed: {message}"))]
    ValidationError { message: String },

    /// An error that occurs during ABI encoding.
    #[snafu(display("ABI encoding failed: {message}"))]
    EncodingError { message: String },

    /// An error that occurs during ABI decoding.
    #[snafu(display("ABI decoding failed: {message}"))]
    DecodingError { message: String },

    /// The number of bound arguments differs from the method's declared parameters.
    #[snafu(display("Argument count mismatch: method declares {expected} parameters, got {actual}"))]
    ArgumentCountMismatch { expected: usize, actual: usize },

    /// A bound argument's runtime type does not match the declared parameter type.
    #[snafu(display("Argument {position} does not match declared type {expected}: {message}"))]
    ArgumentTypeMismatch {
        position: usize,
        expected: String,
        message: String,
    },

    /// A raw return byte sequence could not be decoded as the declared return type.
    #[snafu(display("Return value decoding failed: {message}"))]
    ReturnDecodeError { message: String },
}
