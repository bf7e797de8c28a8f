use super::cost::CostTable;
use super::state::{AppState, StateValue};
use meridian_abi::RETURN_LOG_PREFIX;
use meridian_transact::Address;
use sha2::{Digest, Sha256};
use snafu::Snafu;

/// Failures raised by contract program logic.
#[derive(Debug, Snafu)]
pub enum ProgramError {
    /// An assertion inside the program failed.
    #[snafu(display("{message}"))]
    Assertion { message: String },

    /// A state access violated the declared schema.
    #[snafu(display("State access violation: {message}"))]
    State { message: String },
}

/// Pluggable behavior for a deployed program.
///
/// The emulator reproduces the ledger's rules around a call (cost accounting,
/// schema enforcement, atomicity); the business logic of the call itself is
/// supplied through this trait, registered against the approval program bytes.
pub trait ContractProgram: Send + Sync {
    fn invoke(&self, ctx: &mut CallContext<'_>) -> Result<(), ProgramError>;
}

/// The execution context handed to a program for one call.
///
/// Every observable action is charged against the group's budget meter as it
/// happens, reproducing the ledger's cost model.
pub struct CallContext<'a> {
    pub(crate) sender: Address,
    pub(crate) instance_id: u64,
    pub(crate) args: &'a [Vec<u8>],
    pub(crate) app: &'a mut AppState,
    pub(crate) cost_table: &'a CostTable,
    pub(crate) consumed: &'a mut u64,
    pub(crate) logs: Vec<Vec<u8>>,
}

impl CallContext<'_> {
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// The method selector, i.e. the first application argument.
    pub fn selector(&self) -> Result<&[u8], ProgramError> {
        self.args
            .first()
            .map(|arg| arg.as_slice())
            .ok_or_else(|| ProgramError::Assertion {
                message: "call carries no method selector".to_string(),
            })
    }

    /// Number of encoded method arguments (selector excluded).
    pub fn arg_count(&self) -> usize {
        self.args.len().saturating_sub(1)
    }

    /// The encoded method argument at `index` (selector excluded).
    pub fn arg(&self, index: usize) -> Result<&[u8], ProgramError> {
        self.args
            .get(index + 1)
            .map(|arg| arg.as_slice())
            .ok_or_else(|| ProgramError::Assertion {
                message: format!("missing method argument {}", index),
            })
    }

    pub fn charge(&mut self, cost: u64) {
        *self.consumed += cost;
    }

    /// Emits a log entry, charging the log cost.
    pub fn log(&mut self, entry: Vec<u8>) {
        let cost = self.cost_table.log;
        self.charge(cost);
        self.logs.push(entry);
    }

    /// Logs the encoded return value behind the return prefix.
    pub fn set_return(&mut self, encoded: Vec<u8>) {
        let mut entry = RETURN_LOG_PREFIX.to_vec();
        entry.extend_from_slice(&encoded);
        self.log(entry);
    }

    /// Reads a global state slot, charging the read cost.
    pub fn global_get(&mut self, key: &str) -> Option<StateValue> {
        let cost = self.cost_table.state_read;
        self.charge(cost);
        self.app.global_state.get(key).cloned()
    }

    /// Writes a global state slot, charging the write cost. Fails when the
    /// write would exceed the instance's declared schema.
    pub fn global_put(&mut self, key: &str, value: StateValue) -> Result<(), ProgramError> {
        let cost = self.cost_table.state_write;
        self.charge(cost);

        let (ints, byte_slices) = self.app.slots_with(key, &value);
        if ints > self.app.global_schema.ints || byte_slices > self.app.global_schema.byte_slices {
            return Err(ProgramError::State {
                message: format!(
                    "write of key \"{}\" needs (ints: {}, byte_slices: {}) but the schema declares {}",
                    key, ints, byte_slices, self.app.global_schema
                ),
            });
        }

        self.app.global_state.insert(key.to_string(), value);
        Ok(())
    }

    /// SHA-256 digest, charged at the cryptographic-operation rate.
    pub fn sha256(&mut self, data: &[u8]) -> [u8; 32] {
        let cost = self.cost_table.sha256;
        self.charge(cost);
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}
