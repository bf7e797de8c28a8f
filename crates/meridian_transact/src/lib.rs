//! Transaction primitives for the Meridian ledger: typed transaction
//! construction, canonical encoding, identity hashing, and atomic grouping.

mod address;
mod constants;
mod error;
mod keypair_account;
mod traits;
mod transactions;
mod utils;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use address::Address;
pub use constants::*;
pub use error::TransactError;
pub use keypair_account::KeyPairAccount;
pub use traits::{CanonicalMsgpack, TransactionId, Transactions};
pub use transactions::{
    AppCallTransactionFields, AppCreateTransactionFields, AppUpdateTransactionFields, FeeParams,
    PaymentTransactionFields, SignedTransaction, StateSchema, Transaction, TransactionHeader,
};
pub use utils::compute_group_id;
