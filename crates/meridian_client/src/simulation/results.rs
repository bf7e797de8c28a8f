use meridian_abi::ABIValue;
use meridian_transact::Byte32;

/// The outcome of one atom in an executed group.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// A method call that produced a decoded return value.
    Returned(ABIValue),
    /// A void method call or a non-call atom that executed successfully.
    Void,
    /// The atom's own logic failed.
    Failed { diagnostic: String },
    /// Not executed because an earlier atom failed.
    Skipped,
}

impl CallOutcome {
    /// The decoded return value, when there is one.
    pub fn return_value(&self) -> Option<&ABIValue> {
        match self {
            CallOutcome::Returned(value) => Some(value),
            _ => None,
        }
    }
}

/// Per-atom result, index-aligned with the executed group.
#[derive(Debug, Clone)]
pub struct CallResult {
    pub outcome: CallOutcome,
    /// Log entries emitted during the call, in emission order.
    pub logs: Vec<Vec<u8>>,
    /// Resource cost consumed by this atom.
    pub budget_consumed: u64,
    /// Instance id allocated when the atom deployed a contract.
    pub instance_id: Option<u64>,
}

/// The result of a non-committing dry run.
///
/// `call_results[i]` corresponds to group atom `i`; callers assert on specific
/// indices, so the correlation is load-bearing.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub call_results: Vec<CallResult>,
    /// Total resource cost for the whole group.
    pub group_budget_consumed: u64,
    /// The ceiling the group was executed under.
    pub group_budget_ceiling: u64,
    /// The ledger round the simulation was evaluated at.
    pub last_round: u64,
    /// The raw diagnostic trace, surfaced verbatim for assertions.
    pub raw_trace: serde_json::Value,
}

impl SimulationResult {
    /// Convenience accessor for the decoded return value at `index`.
    pub fn return_value(&self, index: usize) -> Option<&ABIValue> {
        self.call_results
            .get(index)
            .and_then(|r| r.outcome.return_value())
    }
}

/// The result of a committed group; same shape as a simulation plus the
/// durable confirmation details.
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub group_id: Option<Byte32>,
    pub transaction_ids: Vec<String>,
    pub confirmed_round: u64,
    pub call_results: Vec<CallResult>,
    pub group_budget_consumed: u64,
    pub raw_trace: serde_json::Value,
}

impl CommitResult {
    /// Convenience accessor for the decoded return value at `index`.
    pub fn return_value(&self, index: usize) -> Option<&ABIValue> {
        self.call_results
            .get(index)
            .and_then(|r| r.outcome.return_value())
    }
}
