use super::common::CommonParams;
use meridian_transact::{Address, PaymentTransactionFields, Transaction, TransactionHeader};

/// Parameters for a plain value transfer atom.
#[derive(Debug, Default, Clone)]
pub struct PaymentParams {
    pub common_params: CommonParams,
    pub receiver: Address,
    pub amount: u64,
}

pub(crate) fn build_payment(params: &PaymentParams, header: TransactionHeader) -> Transaction {
    Transaction::Payment(PaymentTransactionFields {
        header,
        receiver: params.receiver.clone(),
        amount: params.amount,
    })
}
