use super::common::TransactionHeader;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Declared persistent-state layout for a contract instance: how many integer
/// slots and how many byte-slice slots it may use.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct StateSchema {
    /// Number of integer state slots.
    pub ints: u64,
    /// Number of byte-slice state slots.
    pub byte_slices: u64,
}

impl StateSchema {
    pub fn new(ints: u64, byte_slices: u64) -> Self {
        StateSchema { ints, byte_slices }
    }

    /// True when this schema has at least as many slots of each kind as `other`.
    pub fn is_superset_of(&self, other: &StateSchema) -> bool {
        self.ints >= other.ints && self.byte_slices >= other.byte_slices
    }
}

impl Display for StateSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "(ints: {}, byte_slices: {})", self.ints, self.byte_slices)
    }
}

/// A method call against a deployed contract instance.
///
/// `app_args[0]` carries the method selector; the remaining entries carry the
/// encoded argument values in declaration order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AppCallTransactionFields {
    pub header: TransactionHeader,

    /// The target contract instance.
    pub instance_id: u64,

    /// Selector plus encoded arguments.
    pub app_args: Vec<Vec<u8>>,
}

/// Deployment of a new contract instance.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AppCreateTransactionFields {
    pub header: TransactionHeader,

    /// Approval program bytecode.
    pub approval_program: Vec<u8>,

    /// Clear-state program bytecode.
    pub clear_state_program: Vec<u8>,

    /// Declared global state schema.
    pub global_schema: StateSchema,

    /// Declared per-account state schema.
    pub local_schema: StateSchema,
}

/// In-place program replacement on an existing contract instance.
///
/// Schemas may only ever widen; the ledger rejects updates that would shrink
/// the deployed layout.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AppUpdateTransactionFields {
    pub header: TransactionHeader,

    /// The contract instance being updated.
    pub instance_id: u64,

    /// Replacement approval program bytecode.
    pub approval_program: Vec<u8>,

    /// Replacement clear-state program bytecode.
    pub clear_state_program: Vec<u8>,

    /// Widened global schema, when the update grows the layout.
    pub global_schema: Option<StateSchema>,

    /// Widened per-account schema, when the update grows the layout.
    pub local_schema: Option<StateSchema>,
}
