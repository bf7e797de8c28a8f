//! Transaction module that provides functionality for creating, manipulating,
//! and managing the Meridian transaction types, along with the ability to
//! serialize, identify, and group them.

mod application_call;
mod common;
mod payment;

pub use application_call::{
    AppCallTransactionFields, AppCreateTransactionFields, AppUpdateTransactionFields, StateSchema,
};
pub use common::TransactionHeader;
pub use payment::PaymentTransactionFields;

use crate::constants::{
    MAX_TX_GROUP_SIZE, MERIDIAN_SIGNATURE_BYTE_LENGTH, MERIDIAN_SIGNATURE_ENCODING_INCR,
};
use crate::error::TransactError;
use crate::traits::{CanonicalMsgpack, TransactionId, Transactions};
use crate::utils::compute_group_id;
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as};

/// Enumeration of all transaction types.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(tag = "type")]
pub enum Transaction {
    #[serde(rename = "pay")]
    Payment(PaymentTransactionFields),

    #[serde(rename = "call")]
    AppCall(AppCallTransactionFields),

    #[serde(rename = "create")]
    AppCreate(AppCreateTransactionFields),

    #[serde(rename = "update")]
    AppUpdate(AppUpdateTransactionFields),
}

/// Inputs to fee assignment.
pub struct FeeParams {
    pub fee_per_byte: u64,
    pub min_fee: u64,
    pub extra_fee: Option<u64>,
    pub max_fee: Option<u64>,
}

impl Transaction {
    pub fn header(&self) -> &TransactionHeader {
        match self {
            Transaction::Payment(p) => &p.header,
            Transaction::AppCall(a) => &a.header,
            Transaction::AppCreate(a) => &a.header,
            Transaction::AppUpdate(a) => &a.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut TransactionHeader {
        match self {
            Transaction::Payment(p) => &mut p.header,
            Transaction::AppCall(a) => &mut a.header,
            Transaction::AppCreate(a) => &mut a.header,
            Transaction::AppUpdate(a) => &mut a.header,
        }
    }

    /// Estimated canonical size of the signed form, used for fee calculation.
    pub fn estimate_size(&self) -> Result<usize, TransactError> {
        Ok(self.encode_raw()?.len() + MERIDIAN_SIGNATURE_ENCODING_INCR)
    }

    /// Returns a copy of the transaction with a fee assigned according to the
    /// supplied parameters.
    pub fn assign_fee(&self, request: FeeParams) -> Result<Transaction, TransactError> {
        let mut tx = self.clone();
        let mut calculated_fee: u64 = 0;

        if request.fee_per_byte > 0 {
            let estimated_size = tx.estimate_size()?;
            calculated_fee = request.fee_per_byte * estimated_size as u64;
        }

        if calculated_fee < request.min_fee {
            calculated_fee = request.min_fee;
        }

        if let Some(extra_fee) = request.extra_fee {
            calculated_fee += extra_fee;
        }

        if let Some(max_fee) = request.max_fee {
            if calculated_fee > max_fee {
                return Err(TransactError::InputError {
                    message: format!(
                        "Transaction fee {} microMER is greater than max fee {} microMER",
                        calculated_fee, max_fee
                    ),
                });
            }
        }

        let header = tx.header_mut();
        header.fee = Some(calculated_fee);

        Ok(tx)
    }
}

impl CanonicalMsgpack for Transaction {
    const PREFIX: &'static [u8] = b"TX";
}

impl TransactionId for Transaction {}

/// A signed transaction.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SignedTransaction {
    /// The transaction that has been signed.
    #[serde(rename = "txn")]
    pub transaction: Transaction,

    /// Optional Ed25519 signature authorizing the transaction.
    #[serde(rename = "sig")]
    #[serde_as(as = "Option<Bytes>")]
    pub signature: Option<[u8; MERIDIAN_SIGNATURE_BYTE_LENGTH]>,
}

impl CanonicalMsgpack for SignedTransaction {}

impl TransactionId for SignedTransaction {
    /// The id of a signed transaction is the id of the inner transaction.
    fn id_raw(&self) -> Result<crate::constants::Byte32, TransactError> {
        self.transaction.id_raw()
    }
}

impl Transactions for &[Transaction] {
    /// Groups the supplied transactions by calculating and assigning the group
    /// id to each transaction.
    fn assign_group(self) -> Result<Vec<Transaction>, TransactError> {
        let group_id = compute_group_id(self)?;
        Ok(self
            .iter()
            .map(|tx| {
                let mut tx = tx.clone();
                tx.header_mut().group = Some(group_id);
                tx
            })
            .collect())
    }
}
