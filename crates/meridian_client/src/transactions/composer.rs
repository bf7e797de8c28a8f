use super::app_call::{
    AppCreateParams, AppUpdateParams, MethodCallParams, build_app_create, build_app_update,
    build_method_call,
};
use super::common::{CommonParams, TxnSigner};
use super::payment::{PaymentParams, build_payment};
use derive_more::Debug;
use meridian_abi::{ABIError, ABIMethod};
use meridian_transact::{
    Byte32, FeeParams, MAX_TX_GROUP_SIZE, MIN_TXN_FEE, TransactError, Transaction,
    TransactionHeader, Transactions,
};
use snafu::Snafu;
use std::sync::Arc;

#[derive(Debug, Snafu)]
pub enum ComposerError {
    #[snafu(display("Transaction group size exceeds the max limit of {max}", max = MAX_TX_GROUP_SIZE))]
    GroupFull,

    #[snafu(display("Cannot build an empty transaction group"))]
    EmptyGroup,

    #[snafu(display("Transaction group has already been built"))]
    GroupAlreadyBuilt,

    #[snafu(display(
        "All atoms in a group must share one sender: atom 0 has {expected}, atom {index} has {found}"
    ))]
    MixedSenders {
        expected: String,
        index: usize,
        found: String,
    },

    #[snafu(display(
        "All calls in a group must target the same network: expected {expected}, atom {index} targets {found}"
    ))]
    MixedNetworks {
        expected: String,
        index: usize,
        found: String,
    },

    #[snafu(display("Method argument encoding failed: {source}"))]
    EncodingError { source: ABIError },

    #[snafu(display("Meridian transact error: {source}"))]
    TransactError { source: TransactError },

    #[snafu(display("Transaction error: {message}"))]
    TransactionError { message: String },
}

impl From<ABIError> for ComposerError {
    fn from(source: ABIError) -> Self {
        Self::EncodingError { source }
    }
}

impl From<TransactError> for ComposerError {
    fn from(source: TransactError) -> Self {
        Self::TransactError { source }
    }
}

/// One atom of an in-progress group.
#[derive(Debug, Clone)]
pub enum ComposerTxn {
    Payment(PaymentParams),
    MethodCall(MethodCallParams),
    AppCreate(AppCreateParams),
    AppUpdate(AppUpdateParams),
}

impl ComposerTxn {
    fn common_params(&self) -> &CommonParams {
        match self {
            ComposerTxn::Payment(params) => &params.common_params,
            ComposerTxn::MethodCall(params) => &params.common_params,
            ComposerTxn::AppCreate(params) => &params.common_params,
            ComposerTxn::AppUpdate(params) => &params.common_params,
        }
    }

    fn network_id(&self) -> Option<&str> {
        match self {
            ComposerTxn::MethodCall(params) => Some(params.instance.network_id.as_str()),
            _ => None,
        }
    }

    fn method(&self) -> Option<&ABIMethod> {
        match self {
            ComposerTxn::MethodCall(params) => Some(&params.method),
            _ => None,
        }
    }
}

/// An immutable, finalized atomic group.
///
/// Insertion order is significant: it determines execution order and the index
/// used to correlate per-call results. A group is consumed exactly once, by
/// either `simulate` or `commit`.
#[derive(Debug)]
pub struct TransactionGroup {
    transactions: Vec<Transaction>,
    methods: Vec<Option<ABIMethod>>,
    #[debug(skip)]
    signers: Vec<Option<Arc<dyn TxnSigner>>>,
    group_id: Option<Byte32>,
}

impl TransactionGroup {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The ABI method backing atom `index`, when that atom is a method call.
    pub fn method_at(&self, index: usize) -> Option<&ABIMethod> {
        self.methods.get(index).and_then(|m| m.as_ref())
    }

    pub(crate) fn signer_at(&self, index: usize) -> Option<Arc<dyn TxnSigner>> {
        self.signers.get(index).and_then(|s| s.clone())
    }

    pub fn group_id(&self) -> Option<Byte32> {
        self.group_id
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Accumulates an ordered sequence of atoms into one atomic group.
///
/// The composer performs no network I/O and no encoding beyond delegating to
/// the ABI layer; it exists to enforce ordering and group invariants before a
/// group becomes immutable.
#[derive(Default)]
pub struct Composer {
    atoms: Vec<ComposerTxn>,
    built: bool,
}

impl Composer {
    pub fn new() -> Self {
        Composer {
            atoms: Vec::new(),
            built: false,
        }
    }

    fn push(&mut self, txn: ComposerTxn) -> Result<(), ComposerError> {
        if self.built {
            return Err(ComposerError::GroupAlreadyBuilt);
        }
        if self.atoms.len() >= MAX_TX_GROUP_SIZE {
            return Err(ComposerError::GroupFull);
        }
        self.atoms.push(txn);
        Ok(())
    }

    pub fn add_payment(&mut self, params: PaymentParams) -> Result<(), ComposerError> {
        self.push(ComposerTxn::Payment(params))
    }

    pub fn add_method_call(&mut self, params: MethodCallParams) -> Result<(), ComposerError> {
        self.push(ComposerTxn::MethodCall(params))
    }

    pub fn add_app_create(&mut self, params: AppCreateParams) -> Result<(), ComposerError> {
        self.push(ComposerTxn::AppCreate(params))
    }

    pub fn add_app_update(&mut self, params: AppUpdateParams) -> Result<(), ComposerError> {
        self.push(ComposerTxn::AppUpdate(params))
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Finalizes the group: validates the mutual-sender and single-network
    /// invariants, encodes method arguments, assigns fees and the group id,
    /// and returns the immutable [`TransactionGroup`].
    pub fn build(&mut self) -> Result<TransactionGroup, ComposerError> {
        if self.built {
            return Err(ComposerError::GroupAlreadyBuilt);
        }
        if self.atoms.is_empty() {
            return Err(ComposerError::EmptyGroup);
        }

        let expected_sender = self.atoms[0].common_params().sender.clone();
        for (index, atom) in self.atoms.iter().enumerate().skip(1) {
            let sender = &atom.common_params().sender;
            if *sender != expected_sender {
                return Err(ComposerError::MixedSenders {
                    expected: expected_sender.to_string(),
                    index,
                    found: sender.to_string(),
                });
            }
        }

        let mut group_network: Option<(usize, String)> = None;
        for (index, atom) in self.atoms.iter().enumerate() {
            if let Some(network_id) = atom.network_id() {
                match &group_network {
                    Some((_, expected)) if expected != network_id => {
                        return Err(ComposerError::MixedNetworks {
                            expected: expected.clone(),
                            index,
                            found: network_id.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => group_network = Some((index, network_id.to_string())),
                }
            }
        }
        let network_id = group_network.map(|(_, network)| network);

        let mut transactions = Vec::with_capacity(self.atoms.len());
        for atom in &self.atoms {
            let common = atom.common_params();
            let header = TransactionHeader {
                sender: common.sender.clone(),
                fee: common.static_fee,
                first_valid: 0,
                last_valid: 0,
                network_id: network_id.clone(),
                note: common.note.clone(),
                group: None,
            };
            let calculate_fee = header.fee.is_none();

            let mut transaction = match atom {
                ComposerTxn::Payment(params) => build_payment(params, header),
                ComposerTxn::MethodCall(params) => build_method_call(params, header)?,
                ComposerTxn::AppCreate(params) => build_app_create(params, header),
                ComposerTxn::AppUpdate(params) => build_app_update(params, header),
            };

            if calculate_fee {
                transaction = transaction.assign_fee(FeeParams {
                    fee_per_byte: 0,
                    min_fee: MIN_TXN_FEE,
                    extra_fee: None,
                    max_fee: common.max_fee,
                })?;
            }

            transactions.push(transaction);
        }

        let mut group_id = None;
        if transactions.len() > 1 {
            transactions = transactions.as_slice().assign_group()?;
            group_id = transactions[0].header().group;
        }

        let methods = self.atoms.iter().map(|atom| atom.method().cloned()).collect();
        let signers = self
            .atoms
            .iter()
            .map(|atom| atom.common_params().signer.clone())
            .collect();

        self.built = true;

        Ok(TransactionGroup {
            transactions,
            methods,
            signers,
            group_id,
        })
    }
}
