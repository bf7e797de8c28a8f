//! A library for encoding and decoding Meridian contract method calls: typed
//! argument tuples on the way in, typed return values on the way out.
pub mod abi_type;
pub mod abi_value;
pub mod constants;
pub mod error;
pub mod method;
pub mod types;
pub mod utils;

pub use abi_type::{ABIType, BitSize};
pub use abi_value::ABIValue;
pub use error::ABIError;
pub use method::{ABIMethod, ABIMethodArg, RETURN_LOG_PREFIX};
