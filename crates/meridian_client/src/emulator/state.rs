use meridian_transact::{Address, StateSchema};
use std::collections::{BTreeMap, HashMap};

/// A single persisted state slot value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Uint(u64),
    Bytes(Vec<u8>),
}

/// The deployed state of one contract instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub creator: Address,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    pub global_state: BTreeMap<String, StateValue>,
    pub version: u64,
    pub created_round: u64,
    pub updated_round: u64,
}

impl AppState {
    /// Counts the (integer, byte-slice) slots a prospective write would occupy.
    pub(crate) fn slots_with(&self, key: &str, value: &StateValue) -> (u64, u64) {
        let mut ints = 0;
        let mut byte_slices = 0;
        for (existing_key, existing_value) in &self.global_state {
            if existing_key == key {
                continue;
            }
            match existing_value {
                StateValue::Uint(_) => ints += 1,
                StateValue::Bytes(_) => byte_slices += 1,
            }
        }
        match value {
            StateValue::Uint(_) => ints += 1,
            StateValue::Bytes(_) => byte_slices += 1,
        }
        (ints, byte_slices)
    }
}

/// The whole in-memory ledger: cloned wholesale for each group execution so a
/// failed group can be discarded without touching the committed state.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub round: u64,
    pub next_instance_id: u64,
    pub apps: HashMap<u64, AppState>,
    pub balances: HashMap<Address, u64>,
}

impl Default for LedgerState {
    fn default() -> Self {
        LedgerState {
            round: 0,
            next_instance_id: 1001,
            apps: HashMap::new(),
            balances: HashMap::new(),
        }
    }
}
