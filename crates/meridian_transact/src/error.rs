//! Error types for the Meridian transact module.

use snafu::Snafu;

/// Represents errors that can occur while creating, manipulating, serializing,
/// or deserializing Meridian transactions.
#[derive(Debug, Snafu)]
pub enum TransactError {
    #[snafu(display("Error occurred during encoding: {source}"))]
    EncodingError { source: rmp_serde::encode::Error },

    #[snafu(display("Error occurred during decoding: {source}"))]
    DecodingError { source: rmp_serde::decode::Error },

    #[snafu(display("{message}"))]
    InputError { message: String },

    #[snafu(display("{message}"))]
    InvalidAddress { message: String },
}

impl From<rmp_serde::encode::Error> for TransactError {
    fn from(source: rmp_serde::encode::Error) -> Self {
        TransactError::EncodingError { source }
    }
}

impl From<rmp_serde::decode::Error> for TransactError {
    fn from(source: rmp_serde::decode::Error) -> Self {
        TransactError::DecodingError { source }
    }
}
