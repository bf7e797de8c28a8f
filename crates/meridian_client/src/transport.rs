//! The boundary to the collaborating ledger service.
//!
//! The client depends on exactly three operation shapes: submitting a signed
//! group, simulating an unsigned group, and querying a deployed application.
//! Anything beyond that (retries, connection management, wire serialization)
//! belongs to the transport implementation, not to this crate.

use async_trait::async_trait;
use meridian_transact::{Address, SignedTransaction, StateSchema};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A structured reason for a group failing execution on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupFailure {
    /// A call's own program logic failed at the given group index.
    Logic { index: usize, message: String },
    /// The group's accumulated cost exceeded the per-group ceiling.
    BudgetExceeded { consumed: u64, ceiling: u64 },
    /// A referenced contract instance no longer exists.
    StaleReference { instance_id: u64 },
}

impl Display for GroupFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            GroupFailure::Logic { index, message } => {
                write!(f, "logic failure at index {}: {}", index, message)
            }
            GroupFailure::BudgetExceeded { consumed, ceiling } => {
                write!(f, "budget exceeded: consumed {} of ceiling {}", consumed, ceiling)
            }
            GroupFailure::StaleReference { instance_id } => {
                write!(f, "stale reference to application {}", instance_id)
            }
        }
    }
}

/// Errors surfaced by a ledger transport.
#[derive(Debug, Snafu)]
pub enum TransportError {
    /// Transport-level failure to reach the ledger service; recoverable via
    /// caller-directed retry.
    #[snafu(display("Ledger service unavailable: {message}"))]
    Unavailable { message: String },

    /// The requested application does not exist on the ledger.
    #[snafu(display("Application {instance_id} not found"))]
    NotFound { instance_id: u64 },

    /// The ledger refused the request before executing it (malformed group,
    /// bad signature, oversized group).
    #[snafu(display("Request rejected by the ledger: {message}"))]
    Rejected { message: String },

    /// The group was executed but failed; no effect was applied.
    #[snafu(display("Group execution rejected: {failure}"))]
    GroupRejected { failure: GroupFailure },
}

/// Program and schema information observed for a deployed application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub instance_id: u64,
    pub creator: Address,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    /// Program version counter, bumped on every in-place update.
    pub version: u64,
    pub created_round: u64,
    pub updated_round: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub txn_groups: Vec<SimulateRequestTransactionGroup>,
    pub allow_empty_signatures: Option<bool>,
    /// Additional budget units granted on top of the standard ceiling.
    pub extra_budget: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulateRequestTransactionGroup {
    pub txns: Vec<SignedTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub last_round: u64,
    pub txn_groups: Vec<SimulateTransactionGroupResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateTransactionGroupResult {
    /// Per-transaction results, index-aligned with the submitted group. When
    /// execution fails, results past the failing index are absent.
    pub txn_results: Vec<SimulateTransactionResult>,
    pub failure: Option<GroupFailure>,
    pub budget_consumed: u64,
    pub budget_ceiling: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateTransactionResult {
    pub txn_id: String,
    pub logs: Vec<Vec<u8>>,
    pub budget_consumed: u64,
    /// Instance id allocated by a create transaction.
    pub instance_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub confirmed_round: u64,
    pub confirmations: Vec<TransactionConfirmation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfirmation {
    pub txn_id: String,
    pub confirmed_round: u64,
    /// Instance id allocated by a create transaction.
    pub instance_id: Option<u64>,
    pub logs: Vec<Vec<u8>>,
    pub budget_consumed: u64,
}

/// Request/response operations offered by the collaborating ledger service.
///
/// Retries on [`TransportError::Unavailable`] are the caller's responsibility;
/// implementations must never retry internally, because a retried `submit`
/// could duplicate a committed side effect.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submits a signed group for persistent execution. Either every
    /// transaction's effect is durably applied or none is.
    async fn submit(&self, group: &[SignedTransaction]) -> Result<SubmitResponse, TransportError>;

    /// Executes groups without persisting any ledger state change.
    async fn simulate(&self, request: SimulateRequest) -> Result<SimulateResponse, TransportError>;

    /// Looks up the deployed program and schema for an application.
    async fn get_application_info(
        &self,
        instance_id: u64,
    ) -> Result<ApplicationInfo, TransportError>;
}
