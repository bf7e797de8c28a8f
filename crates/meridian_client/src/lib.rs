//! Contract interaction and simulation client for the Meridian ledger.
//!
//! Composes typed method calls into atomic groups, executes them against a
//! live ledger transport or the bundled deterministic emulator, reports
//! per-call results with resource-consumption metrics, and resolves contract
//! deployments across schema versions without losing on-chain state.

pub mod applications;
pub mod config;
pub mod emulator;
pub mod simulation;
pub mod testing;
pub mod transactions;
pub mod transport;

pub use applications::{
    AppDeployResult, AppSchemas, ContractDeployer, ContractInstance, DeployError, DeployParams,
    DeploymentPolicy, SchemaComparison,
};
pub use config::{Config, EventData, EventType};
pub use emulator::{
    BUDGET_PER_APP_CALL, CallContext, ContractProgram, CostTable, Emulator, ProgramError,
    StateValue,
};
pub use simulation::{
    CallOutcome, CallResult, CommitResult, EngineError, SimulateParams, SimulationEngine,
    SimulationResult,
};
pub use transactions::{
    AppCreateParams, AppUpdateParams, CommonParams, Composer, ComposerError, ComposerTxn,
    EmptySigner, MethodCallParams, PaymentParams, TransactionGroup, TxnSigner, TxnSignerGetter,
};
pub use transport::{
    ApplicationInfo, GroupFailure, LedgerTransport, SimulateRequest,
    SimulateRequestTransactionGroup, SimulateResponse, SimulateTransactionGroupResult,
    SimulateTransactionResult, SubmitResponse, TransactionConfirmation, TransportError,
};
