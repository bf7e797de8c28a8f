use crate::Address;
use crate::constants::Byte32;
use serde::{Deserialize, Serialize};
use serde_with::{Bytes, serde_as};

/// Fields common to every Meridian transaction type.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct TransactionHeader {
    /// The account paying the fee and authorizing the transaction.
    pub sender: Address,

    /// The fee in microMER. `None` until a fee has been assigned.
    pub fee: Option<u64>,

    /// The first round at which the transaction is valid.
    pub first_valid: u64,

    /// The last round at which the transaction is valid.
    pub last_valid: u64,

    /// The network the transaction is bound to.
    pub network_id: Option<String>,

    /// Optional arbitrary note bytes.
    pub note: Option<Vec<u8>>,

    /// The atomic group this transaction belongs to, if any.
    #[serde_as(as = "Option<Bytes>")]
    pub group: Option<Byte32>,
}
