use super::results::{CallOutcome, CallResult, CommitResult, SimulationResult};
use crate::config::{Config, EventData, EventType, TxnGroupSimulatedEventData};
use crate::transactions::{TransactionGroup, TxnSigner, TxnSignerGetter};
use crate::transport::{
    GroupFailure, LedgerTransport, SimulateRequest, SimulateRequestTransactionGroup,
    TransportError,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, info};
use meridian_abi::{ABIMethod, RETURN_LOG_PREFIX};
use meridian_transact::{SignedTransaction, TransactError, TransactionId};
use snafu::Snafu;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Snafu)]
pub enum EngineError {
    /// The group's accumulated cost exceeded the ledger's per-group ceiling.
    /// Retrying without changing the group reproduces the same failure.
    #[snafu(display("Group resource budget exceeded: consumed {consumed} of ceiling {ceiling}"))]
    ResourceBudgetExceeded { consumed: u64, ceiling: u64 },

    /// A call's own assertions failed during a dry run.
    #[snafu(display("Contract logic failed at group index {index}: {diagnostic}"))]
    ContractLogicFailure { index: usize, diagnostic: String },

    /// Transport-level failure; recoverable by caller-directed retry. A timed
    /// out `commit` may still have been applied remotely; re-query to detect.
    #[snafu(display("Ledger service unavailable: {message}"))]
    NetworkUnavailable { message: String },

    /// A referenced contract instance no longer exists or matches.
    #[snafu(display("Stale group reference: application {instance_id} no longer exists"))]
    StaleGroupReference { instance_id: u64 },

    /// A committed group failed and was rolled back in full.
    #[snafu(display("Group execution failed at index {failing_index}: {cause}"))]
    GroupExecutionFailed { failing_index: usize, cause: String },

    #[snafu(display("Signing failed: {message}"))]
    SigningError { message: String },

    /// The ledger refused the submission before executing it.
    #[snafu(display("Submission rejected: {message}"))]
    SubmissionRejected { message: String },

    #[snafu(display("Return value decoding failed: {message}"))]
    ABIDecodingError { message: String },

    #[snafu(display("Unexpected ledger response: {message}"))]
    UnexpectedResponse { message: String },

    #[snafu(display("Meridian transact error: {source}"))]
    TransactError { source: TransactError },
}

impl From<TransactError> for EngineError {
    fn from(source: TransactError) -> Self {
        Self::TransactError { source }
    }
}

fn map_transport_error(error: TransportError) -> EngineError {
    match error {
        TransportError::Unavailable { message } => EngineError::NetworkUnavailable { message },
        TransportError::NotFound { instance_id } => {
            EngineError::StaleGroupReference { instance_id }
        }
        TransportError::Rejected { message } => EngineError::SubmissionRejected { message },
        TransportError::GroupRejected { failure } => match failure {
            GroupFailure::Logic { index, message } => EngineError::GroupExecutionFailed {
                failing_index: index,
                cause: message,
            },
            GroupFailure::BudgetExceeded { consumed, ceiling } => {
                EngineError::ResourceBudgetExceeded { consumed, ceiling }
            }
            GroupFailure::StaleReference { instance_id } => {
                EngineError::StaleGroupReference { instance_id }
            }
        },
    }
}

/// Options for a dry run.
#[derive(Debug, Clone, Default)]
pub struct SimulateParams {
    /// Surface per-call failure indicators in the result instead of failing
    /// the whole operation on the first logic failure.
    pub allow_failures: bool,
    /// Additional budget units granted on top of the standard ceiling.
    pub extra_budget: Option<u64>,
}

/// Executes composed groups against the ledger, either as a non-committing
/// dry run or with persistent effect.
///
/// The engine holds no per-instance locks: concurrent `simulate` calls against
/// the same contract instance race freely, and conflicting `commit` calls are
/// resolved by the ledger's own rules.
#[derive(Clone)]
pub struct SimulationEngine {
    transport: Arc<dyn LedgerTransport>,
    signer_getter: Arc<dyn TxnSignerGetter>,
    timeout: Option<Duration>,
}

impl SimulationEngine {
    pub fn new(transport: Arc<dyn LedgerTransport>, signer_getter: Arc<dyn TxnSignerGetter>) -> Self {
        SimulationEngine {
            transport,
            signer_getter,
            timeout: None,
        }
    }

    /// Bounds every ledger request issued by this engine. On expiry the
    /// operation fails with [`EngineError::NetworkUnavailable`] and no local
    /// state is modified; the remote side effect is not assumed prevented.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn transport_call<T>(
        &self,
        fut: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, EngineError> {
        let result = match self.timeout {
            Some(duration) => tokio::time::timeout(duration, fut).await.map_err(|_| {
                EngineError::NetworkUnavailable {
                    message: format!(
                        "ledger request timed out after {:?}; the remote side effect may still have been applied",
                        duration
                    ),
                }
            })?,
            None => fut.await,
        };
        result.map_err(map_transport_error)
    }

    /// Executes the group in a non-committing mode; no persistent ledger state
    /// changes. `result.call_results[i]` correlates with group atom `i`.
    pub async fn simulate(&self, group: TransactionGroup) -> Result<SimulationResult, EngineError> {
        self.simulate_with(group, SimulateParams::default()).await
    }

    /// Like [`simulate`](Self::simulate), with explicit options.
    pub async fn simulate_with(
        &self,
        group: TransactionGroup,
        params: SimulateParams,
    ) -> Result<SimulationResult, EngineError> {
        let group_len = group.len();
        let signed: Vec<SignedTransaction> = group
            .transactions()
            .iter()
            .map(|txn| SignedTransaction {
                transaction: txn.clone(),
                signature: None,
            })
            .collect();

        let request = SimulateRequest {
            txn_groups: vec![SimulateRequestTransactionGroup { txns: signed }],
            allow_empty_signatures: Some(true),
            extra_budget: params.extra_budget,
        };

        let response = self
            .transport_call(self.transport.simulate(request))
            .await?;

        let group_result =
            response
                .txn_groups
                .first()
                .ok_or_else(|| EngineError::UnexpectedResponse {
                    message: "simulate response contained no transaction groups".to_string(),
                })?;

        let failed_at = match &group_result.failure {
            Some(GroupFailure::BudgetExceeded { consumed, ceiling }) => {
                return Err(EngineError::ResourceBudgetExceeded {
                    consumed: *consumed,
                    ceiling: *ceiling,
                });
            }
            Some(GroupFailure::StaleReference { instance_id }) => {
                return Err(EngineError::StaleGroupReference {
                    instance_id: *instance_id,
                });
            }
            Some(GroupFailure::Logic { index, message }) => {
                if !params.allow_failures {
                    return Err(EngineError::ContractLogicFailure {
                        index: *index,
                        diagnostic: message.clone(),
                    });
                }
                Some((*index, message.clone()))
            }
            None => None,
        };

        let mut call_results = Vec::with_capacity(group_len);
        for index in 0..group_len {
            let txn_result = group_result.txn_results.get(index);
            let logs = txn_result.map(|r| r.logs.clone()).unwrap_or_default();
            let budget_consumed = txn_result.map(|r| r.budget_consumed).unwrap_or(0);
            let instance_id = txn_result.and_then(|r| r.instance_id);

            let outcome = match &failed_at {
                Some((failing_index, diagnostic)) if index == *failing_index => {
                    CallOutcome::Failed {
                        diagnostic: diagnostic.clone(),
                    }
                }
                Some((failing_index, _)) if index > *failing_index => CallOutcome::Skipped,
                _ => decode_call_outcome(group.method_at(index), &logs)?,
            };

            call_results.push(CallResult {
                outcome,
                logs,
                budget_consumed,
                instance_id,
            });
        }

        let raw_trace = serde_json::to_value(&response).unwrap_or(serde_json::Value::Null);

        debug!(
            "Simulated group of {} transactions: {} of {} budget units consumed",
            group_len, group_result.budget_consumed, group_result.budget_ceiling
        );
        if Config::debug() {
            for (index, result) in call_results.iter().enumerate() {
                debug!("txn {} logs: {:?}", index, logs_to_base64(&result.logs));
            }
        }
        Config::events()
            .emit(
                EventType::TxnGroupSimulated,
                EventData::TxnGroupSimulated(TxnGroupSimulatedEventData {
                    simulate_trace: raw_trace.clone(),
                }),
            )
            .await;

        Ok(SimulationResult {
            call_results,
            group_budget_consumed: group_result.budget_consumed,
            group_budget_ceiling: group_result.budget_ceiling,
            last_round: response.last_round,
            raw_trace,
        })
    }

    /// Executes the group with persistent effect. Fails atomically: either
    /// every atom's effect is durably applied or none is.
    pub async fn commit(&self, group: TransactionGroup) -> Result<CommitResult, EngineError> {
        let transactions = group.transactions().to_vec();

        // Resolve a signer for every atom before touching the network.
        let mut signers: Vec<Arc<dyn TxnSigner>> = Vec::with_capacity(transactions.len());
        for (index, txn) in transactions.iter().enumerate() {
            let signer = match group.signer_at(index) {
                Some(signer) => signer,
                None => {
                    let sender = txn.header().sender.clone();
                    self.signer_getter
                        .get_signer(sender.clone())
                        .await
                        .ok_or_else(|| EngineError::SigningError {
                            message: format!(
                                "No signer available for sender {} at group index {}",
                                sender, index
                            ),
                        })?
                }
            };
            signers.push(signer);
        }

        // Group indexes by signer so each signer is invoked once. The pointer
        // map is dropped before signing so the future stays Send.
        let index_groups: Vec<Vec<usize>> = {
            let mut signer_groups: HashMap<*const dyn TxnSigner, Vec<usize>> = HashMap::new();
            for (index, signer) in signers.iter().enumerate() {
                signer_groups
                    .entry(Arc::as_ptr(signer))
                    .or_default()
                    .push(index);
            }
            signer_groups.into_values().collect()
        };

        let mut signed_transactions: Vec<Option<SignedTransaction>> =
            vec![None; transactions.len()];
        for indices in index_groups {
            let signer = &signers[indices[0]];
            let signed = signer
                .sign_txns(&transactions, &indices)
                .await
                .map_err(|message| EngineError::SigningError { message })?;

            if signed.len() != indices.len() {
                return Err(EngineError::SigningError {
                    message: format!(
                        "Signer returned {} transactions for {} requested indexes",
                        signed.len(),
                        indices.len()
                    ),
                });
            }
            for (position, &index) in indices.iter().enumerate() {
                signed_transactions[index] = Some(signed[position].clone());
            }
        }

        let signed_transactions: Vec<SignedTransaction> = signed_transactions
            .into_iter()
            .enumerate()
            .map(|(index, stxn)| {
                stxn.ok_or_else(|| EngineError::SigningError {
                    message: format!("Transaction at index {} was not signed", index),
                })
            })
            .collect::<Result<_, _>>()?;

        let transaction_ids: Vec<String> = signed_transactions
            .iter()
            .map(|stxn| stxn.id())
            .collect::<Result<_, _>>()?;

        let receipt = self
            .transport_call(self.transport.submit(&signed_transactions))
            .await?;

        let mut call_results = Vec::with_capacity(transactions.len());
        let mut group_budget_consumed = 0u64;
        for (index, confirmation) in receipt.confirmations.iter().enumerate() {
            group_budget_consumed += confirmation.budget_consumed;
            let outcome = decode_call_outcome(group.method_at(index), &confirmation.logs)?;
            call_results.push(CallResult {
                outcome,
                logs: confirmation.logs.clone(),
                budget_consumed: confirmation.budget_consumed,
                instance_id: confirmation.instance_id,
            });
        }

        info!(
            "Committed group of {} transactions at round {}",
            transactions.len(),
            receipt.confirmed_round
        );

        Ok(CommitResult {
            group_id: group.group_id(),
            transaction_ids,
            confirmed_round: receipt.confirmed_round,
            call_results,
            group_budget_consumed,
            raw_trace: serde_json::to_value(&receipt).unwrap_or(serde_json::Value::Null),
        })
    }
}

/// Decodes the ABI return value for one atom from its emitted logs.
///
/// Non-void methods log their return value last, behind the return prefix.
fn decode_call_outcome(
    method: Option<&ABIMethod>,
    logs: &[Vec<u8>],
) -> Result<CallOutcome, EngineError> {
    let method = match method {
        Some(method) => method,
        None => return Ok(CallOutcome::Void),
    };
    if method.returns.is_none() {
        return Ok(CallOutcome::Void);
    }

    let last_log = logs
        .last()
        .ok_or_else(|| EngineError::ABIDecodingError {
            message: format!(
                "No logs found for method {} which declares a return type",
                method.name
            ),
        })?;

    if !last_log.starts_with(RETURN_LOG_PREFIX) {
        return Err(EngineError::ABIDecodingError {
            message: format!(
                "Log for method {} does not match the return value format",
                method.name
            ),
        });
    }

    let return_bytes = &last_log[RETURN_LOG_PREFIX.len()..];
    let return_value =
        method
            .decode_return(return_bytes)
            .map_err(|source| EngineError::ABIDecodingError {
                message: source.to_string(),
            })?;

    Ok(CallOutcome::Returned(return_value))
}

/// Renders log entries as base64 for diagnostic output.
fn logs_to_base64(logs: &[Vec<u8>]) -> Vec<String> {
    logs.iter().map(|log| BASE64.encode(log)).collect()
}
