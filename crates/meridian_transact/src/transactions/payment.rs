use super::common::TransactionHeader;
use crate::Address;
use serde::{Deserialize, Serialize};

/// A plain value transfer between two accounts.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct PaymentTransactionFields {
    pub header: TransactionHeader,

    /// The account receiving the payment.
    pub receiver: Address,

    /// The amount transferred, in microMER.
    pub amount: u64,
}
