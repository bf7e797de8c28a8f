//! Object-mother helpers for building transactions in tests.

use crate::transactions::{
    AppCallTransactionFields, AppCreateTransactionFields, PaymentTransactionFields, StateSchema,
    Transaction, TransactionHeader,
};
use crate::{Address, constants::MIN_TXN_FEE};

pub struct AddressMother;

impl AddressMother {
    pub fn zero_address() -> Address {
        Address([0; 32])
    }

    pub fn sender() -> Address {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        Address(bytes)
    }

    pub fn receiver() -> Address {
        Address([7; 32])
    }
}

pub struct TransactionMother;

impl TransactionMother {
    pub fn header() -> TransactionHeader {
        TransactionHeader {
            sender: AddressMother::sender(),
            fee: Some(MIN_TXN_FEE),
            first_valid: 1,
            last_valid: 1001,
            network_id: Some("emunet-v1".to_string()),
            note: None,
            group: None,
        }
    }

    pub fn simple_payment() -> Transaction {
        Transaction::Payment(PaymentTransactionFields {
            header: Self::header(),
            receiver: AddressMother::receiver(),
            amount: 1_000_000,
        })
    }

    pub fn method_call(instance_id: u64) -> Transaction {
        Transaction::AppCall(AppCallTransactionFields {
            header: Self::header(),
            instance_id,
            app_args: vec![vec![0xd8, 0xe5, 0xfb, 0x17], vec![0, 2, 104, 105]],
        })
    }

    pub fn app_create() -> Transaction {
        Transaction::AppCreate(AppCreateTransactionFields {
            header: Self::header(),
            approval_program: b"approval".to_vec(),
            clear_state_program: b"clear".to_vec(),
            global_schema: StateSchema::new(1, 1),
            local_schema: StateSchema::default(),
        })
    }
}
