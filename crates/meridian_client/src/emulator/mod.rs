//! A local deterministic emulator of the Meridian ledger.
//!
//! The emulator implements [`LedgerTransport`] entirely in memory: instance
//! ids are allocated sequentially, the round advances only on `submit`, and
//! every group executes against a cloned state that is swapped in only when
//! all of its atoms succeed. Contract behavior is pluggable through
//! [`ContractProgram`]; the emulator itself only reproduces the ledger's
//! rules around a call: signature checks, fee and balance accounting, the
//! resource cost model, schema enforcement, and group atomicity.

mod cost;
mod programs;
mod state;

pub use cost::{BUDGET_PER_APP_CALL, CostTable};
pub use programs::{CallContext, ContractProgram, ProgramError};
pub use state::{AppState, LedgerState, StateValue};

use crate::transport::{
    ApplicationInfo, GroupFailure, LedgerTransport, SimulateRequest, SimulateResponse,
    SimulateTransactionGroupResult, SimulateTransactionResult, SubmitResponse,
    TransactionConfirmation, TransportError,
};
use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use meridian_transact::{
    Address, CanonicalMsgpack, MAX_TX_GROUP_SIZE, SignedTransaction, Transaction, TransactionId,
    compute_group_id,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const EMULATOR_NETWORK_ID: &str = "emunet-v1";

struct TxnOutput {
    txn_id: String,
    logs: Vec<Vec<u8>>,
    budget_consumed: u64,
    instance_id: Option<u64>,
}

struct GroupExecution {
    results: Vec<TxnOutput>,
    failure: Option<GroupFailure>,
    budget_consumed: u64,
    budget_ceiling: u64,
    confirmed_round: u64,
}

/// The in-memory ledger emulator.
pub struct Emulator {
    state: Mutex<LedgerState>,
    programs: Mutex<HashMap<Vec<u8>, Arc<dyn ContractProgram>>>,
    cost_table: CostTable,
    network_id: String,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_cost_table(CostTable::default())
    }

    pub fn with_cost_table(cost_table: CostTable) -> Self {
        Emulator {
            state: Mutex::new(LedgerState::default()),
            programs: Mutex::new(HashMap::new()),
            cost_table,
            network_id: EMULATOR_NETWORK_ID.to_string(),
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Registers the behavior executed for applications deployed with the
    /// given approval program bytes.
    pub fn register_program(
        &self,
        approval_program: impl Into<Vec<u8>>,
        program: Arc<dyn ContractProgram>,
    ) {
        self.programs
            .lock()
            .expect("program registry poisoned")
            .insert(approval_program.into(), program);
    }

    /// Credits an account balance, as a genesis-style faucet for tests.
    pub fn fund(&self, address: &Address, amount: u64) {
        let mut state = self.state.lock().expect("ledger state poisoned");
        *state.balances.entry(address.clone()).or_insert(0) += amount;
    }

    pub fn balance(&self, address: &Address) -> u64 {
        let state = self.state.lock().expect("ledger state poisoned");
        state.balances.get(address).copied().unwrap_or(0)
    }

    /// Reads a committed global state slot of an instance.
    pub fn global_state(&self, instance_id: u64, key: &str) -> Option<StateValue> {
        let state = self.state.lock().expect("ledger state poisoned");
        state
            .apps
            .get(&instance_id)
            .and_then(|app| app.global_state.get(key).cloned())
    }

    pub fn round(&self) -> u64 {
        self.state.lock().expect("ledger state poisoned").round
    }

    fn verify_signature(stxn: &SignedTransaction, index: usize) -> Result<(), TransportError> {
        let signature_bytes =
            stxn.signature
                .ok_or_else(|| TransportError::Rejected {
                    message: format!("transaction {} is not signed", index),
                })?;
        let message = stxn
            .transaction
            .encode()
            .map_err(|e| TransportError::Rejected {
                message: format!("failed to encode transaction {}: {}", index, e),
            })?;
        let verifying_key = VerifyingKey::from_bytes(stxn.transaction.header().sender.as_bytes())
            .map_err(|_| TransportError::Rejected {
                message: format!("transaction {} sender is not a valid public key", index),
            })?;
        let signature = Signature::from_bytes(&signature_bytes);
        verifying_key
            .verify(&message, &signature)
            .map_err(|_| TransportError::Rejected {
                message: format!("signature verification failed for transaction {}", index),
            })
    }

    fn validate_group(
        txns: &[SignedTransaction],
        check_signatures: bool,
    ) -> Result<(), TransportError> {
        if txns.is_empty() {
            return Err(TransportError::Rejected {
                message: "cannot execute an empty transaction group".to_string(),
            });
        }
        if txns.len() > MAX_TX_GROUP_SIZE {
            return Err(TransportError::Rejected {
                message: format!(
                    "transaction group size {} exceeds the limit of {}",
                    txns.len(),
                    MAX_TX_GROUP_SIZE
                ),
            });
        }

        if txns.len() > 1 {
            // Group ids are computed over the ungrouped encodings
            let ungrouped: Vec<Transaction> = txns
                .iter()
                .map(|stxn| {
                    let mut txn = stxn.transaction.clone();
                    txn.header_mut().group = None;
                    txn
                })
                .collect();
            let expected = compute_group_id(&ungrouped).map_err(|e| TransportError::Rejected {
                message: format!("failed to compute group id: {}", e),
            })?;
            for (index, stxn) in txns.iter().enumerate() {
                if stxn.transaction.header().group != Some(expected) {
                    return Err(TransportError::Rejected {
                        message: format!("transaction {} carries a mismatched group id", index),
                    });
                }
            }
        }

        if check_signatures {
            for (index, stxn) in txns.iter().enumerate() {
                Self::verify_signature(stxn, index)?;
            }
        }

        Ok(())
    }

    fn debit(
        work: &mut LedgerState,
        account: &Address,
        amount: u64,
        index: usize,
    ) -> Result<(), GroupFailure> {
        let balance = work.balances.entry(account.clone()).or_insert(0);
        if *balance < amount {
            return Err(GroupFailure::Logic {
                index,
                message: format!(
                    "overspend: account {} holds {} microMER, needs {}",
                    account, balance, amount
                ),
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn apply_transaction(
        &self,
        work: &mut LedgerState,
        txn: &Transaction,
        txn_id: String,
        index: usize,
        consumed: &mut u64,
        round: u64,
    ) -> Result<TxnOutput, GroupFailure> {
        let fee = txn.header().fee.unwrap_or(0);
        let sender = txn.header().sender.clone();
        Self::debit(work, &sender, fee, index)?;

        match txn {
            Transaction::Payment(fields) => {
                Self::debit(work, &sender, fields.amount, index)?;
                *work.balances.entry(fields.receiver.clone()).or_insert(0) += fields.amount;
                Ok(TxnOutput {
                    txn_id,
                    logs: Vec::new(),
                    budget_consumed: 0,
                    instance_id: None,
                })
            }
            Transaction::AppCreate(fields) => {
                *consumed += self.cost_table.call_base;
                let instance_id = work.next_instance_id;
                work.next_instance_id += 1;
                work.apps.insert(
                    instance_id,
                    AppState {
                        creator: sender,
                        approval_program: fields.approval_program.clone(),
                        clear_state_program: fields.clear_state_program.clone(),
                        global_schema: fields.global_schema,
                        local_schema: fields.local_schema,
                        global_state: Default::default(),
                        version: 1,
                        created_round: round,
                        updated_round: round,
                    },
                );
                Ok(TxnOutput {
                    txn_id,
                    logs: Vec::new(),
                    budget_consumed: self.cost_table.call_base,
                    instance_id: Some(instance_id),
                })
            }
            Transaction::AppUpdate(fields) => {
                *consumed += self.cost_table.call_base;
                let app = work.apps.get_mut(&fields.instance_id).ok_or(
                    GroupFailure::StaleReference {
                        instance_id: fields.instance_id,
                    },
                )?;

                if let Some(global_schema) = fields.global_schema {
                    if !global_schema.is_superset_of(&app.global_schema) {
                        return Err(GroupFailure::Logic {
                            index,
                            message: format!(
                                "application update would shrink the global schema from {} to {}",
                                app.global_schema, global_schema
                            ),
                        });
                    }
                    app.global_schema = global_schema;
                }
                if let Some(local_schema) = fields.local_schema {
                    if !local_schema.is_superset_of(&app.local_schema) {
                        return Err(GroupFailure::Logic {
                            index,
                            message: format!(
                                "application update would shrink the local schema from {} to {}",
                                app.local_schema, local_schema
                            ),
                        });
                    }
                    app.local_schema = local_schema;
                }

                app.approval_program = fields.approval_program.clone();
                app.clear_state_program = fields.clear_state_program.clone();
                app.version += 1;
                app.updated_round = round;

                Ok(TxnOutput {
                    txn_id,
                    logs: Vec::new(),
                    budget_consumed: self.cost_table.call_base,
                    instance_id: None,
                })
            }
            Transaction::AppCall(fields) => {
                let consumed_before = *consumed;
                *consumed += self.cost_table.call_base;

                let app = work.apps.get_mut(&fields.instance_id).ok_or(
                    GroupFailure::StaleReference {
                        instance_id: fields.instance_id,
                    },
                )?;

                let program = {
                    let programs = self.programs.lock().expect("program registry poisoned");
                    programs.get(&app.approval_program).cloned()
                };
                let program = program.ok_or_else(|| GroupFailure::Logic {
                    index,
                    message: format!(
                        "no program behavior registered for application {}",
                        fields.instance_id
                    ),
                })?;

                let mut ctx = CallContext {
                    sender,
                    instance_id: fields.instance_id,
                    args: &fields.app_args,
                    app,
                    cost_table: &self.cost_table,
                    consumed: &mut *consumed,
                    logs: Vec::new(),
                };

                program.invoke(&mut ctx).map_err(|e| GroupFailure::Logic {
                    index,
                    message: e.to_string(),
                })?;

                let logs = ctx.logs;
                Ok(TxnOutput {
                    txn_id,
                    logs,
                    budget_consumed: *consumed - consumed_before,
                    instance_id: None,
                })
            }
        }
    }

    fn execute_group(
        &self,
        txns: &[SignedTransaction],
        commit: bool,
        check_signatures: bool,
        extra_budget: u64,
    ) -> Result<GroupExecution, TransportError> {
        Self::validate_group(txns, check_signatures)?;

        let mut guard = self.state.lock().expect("ledger state poisoned");
        let mut work = guard.clone();
        let execution_round = work.round + 1;

        let app_call_count = txns
            .iter()
            .filter(|stxn| !matches!(stxn.transaction, Transaction::Payment(_)))
            .count() as u64;
        let budget_ceiling = BUDGET_PER_APP_CALL * app_call_count + extra_budget;

        let mut consumed = 0u64;
        let mut results = Vec::with_capacity(txns.len());
        let mut failure = None;

        for (index, stxn) in txns.iter().enumerate() {
            let txn_id = stxn
                .transaction
                .id()
                .map_err(|e| TransportError::Rejected {
                    message: format!("failed to compute transaction id: {}", e),
                })?;

            match self.apply_transaction(
                &mut work,
                &stxn.transaction,
                txn_id.clone(),
                index,
                &mut consumed,
                execution_round,
            ) {
                Ok(output) => {
                    if consumed > budget_ceiling {
                        results.push(output);
                        failure = Some(GroupFailure::BudgetExceeded {
                            consumed,
                            ceiling: budget_ceiling,
                        });
                        break;
                    }
                    results.push(output);
                }
                Err(group_failure) => {
                    results.push(TxnOutput {
                        txn_id,
                        logs: Vec::new(),
                        budget_consumed: 0,
                        instance_id: None,
                    });
                    failure = Some(group_failure);
                    break;
                }
            }
        }

        if commit && failure.is_none() {
            work.round = execution_round;
            *guard = work;
        }

        Ok(GroupExecution {
            results,
            failure,
            budget_consumed: consumed,
            budget_ceiling,
            confirmed_round: execution_round,
        })
    }
}

#[async_trait]
impl LedgerTransport for Emulator {
    async fn submit(&self, group: &[SignedTransaction]) -> Result<SubmitResponse, TransportError> {
        let execution = self.execute_group(group, true, true, 0)?;

        if let Some(failure) = execution.failure {
            return Err(TransportError::GroupRejected { failure });
        }

        let confirmations = execution
            .results
            .into_iter()
            .map(|output| TransactionConfirmation {
                txn_id: output.txn_id,
                confirmed_round: execution.confirmed_round,
                instance_id: output.instance_id,
                logs: output.logs,
                budget_consumed: output.budget_consumed,
            })
            .collect();

        Ok(SubmitResponse {
            confirmed_round: execution.confirmed_round,
            confirmations,
        })
    }

    async fn simulate(&self, request: SimulateRequest) -> Result<SimulateResponse, TransportError> {
        let check_signatures = !request.allow_empty_signatures.unwrap_or(false);
        let extra_budget = request.extra_budget.unwrap_or(0);

        let mut txn_groups = Vec::with_capacity(request.txn_groups.len());
        for group in &request.txn_groups {
            let execution =
                self.execute_group(&group.txns, false, check_signatures, extra_budget)?;

            txn_groups.push(SimulateTransactionGroupResult {
                txn_results: execution
                    .results
                    .into_iter()
                    .map(|output| SimulateTransactionResult {
                        txn_id: output.txn_id,
                        logs: output.logs,
                        budget_consumed: output.budget_consumed,
                        instance_id: output.instance_id,
                    })
                    .collect(),
                failure: execution.failure,
                budget_consumed: execution.budget_consumed,
                budget_ceiling: execution.budget_ceiling,
            });
        }

        Ok(SimulateResponse {
            last_round: self.round(),
            txn_groups,
        })
    }

    async fn get_application_info(
        &self,
        instance_id: u64,
    ) -> Result<ApplicationInfo, TransportError> {
        let state = self.state.lock().expect("ledger state poisoned");
        let app = state
            .apps
            .get(&instance_id)
            .ok_or(TransportError::NotFound { instance_id })?;

        Ok(ApplicationInfo {
            instance_id,
            creator: app.creator.clone(),
            approval_program: app.approval_program.clone(),
            clear_state_program: app.clear_state_program.clone(),
            global_schema: app.global_schema,
            local_schema: app.local_schema,
            version: app.version,
            created_round: app.created_round,
            updated_round: app.updated_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_transact::{
        AppCreateTransactionFields, PaymentTransactionFields, StateSchema, TransactionHeader,
        Transactions,
    };

    fn unsigned(txn: Transaction) -> SignedTransaction {
        SignedTransaction {
            transaction: txn,
            signature: None,
        }
    }

    fn header(sender: &Address) -> TransactionHeader {
        TransactionHeader {
            sender: sender.clone(),
            fee: Some(1000),
            first_valid: 0,
            last_valid: 0,
            network_id: Some(EMULATOR_NETWORK_ID.to_string()),
            note: None,
            group: None,
        }
    }

    fn simulate_request(txns: Vec<SignedTransaction>) -> SimulateRequest {
        SimulateRequest {
            txn_groups: vec![crate::transport::SimulateRequestTransactionGroup { txns }],
            allow_empty_signatures: Some(true),
            extra_budget: None,
        }
    }

    #[tokio::test]
    async fn test_simulate_does_not_persist_balances() {
        let emulator = Emulator::new();
        let sender = Address([1; 32]);
        let receiver = Address([2; 32]);
        emulator.fund(&sender, 1_000_000);

        let txn = Transaction::Payment(PaymentTransactionFields {
            header: header(&sender),
            receiver: receiver.clone(),
            amount: 500_000,
        });

        let response = emulator
            .simulate(simulate_request(vec![unsigned(txn)]))
            .await
            .unwrap();
        assert!(response.txn_groups[0].failure.is_none());

        assert_eq!(emulator.balance(&sender), 1_000_000);
        assert_eq!(emulator.balance(&receiver), 0);
        assert_eq!(emulator.round(), 0);
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_ids() {
        let emulator = Emulator::new();
        let sender = Address([1; 32]);
        emulator.fund(&sender, 1_000_000);

        let create = |_: u64| {
            Transaction::AppCreate(AppCreateTransactionFields {
                header: header(&sender),
                approval_program: b"prog".to_vec(),
                clear_state_program: b"clear".to_vec(),
                global_schema: StateSchema::new(1, 1),
                local_schema: StateSchema::default(),
            })
        };

        let first = emulator.submit(&[unsigned(create(0))]).await.unwrap();
        let second = emulator.submit(&[unsigned(create(1))]).await.unwrap();
        // Sequential allocation keeps replays deterministic

        let first_id = first.confirmations[0].instance_id.unwrap();
        let second_id = second.confirmations[0].instance_id.unwrap();
        assert_eq!(second_id, first_id + 1);
        assert_eq!(first.confirmed_round + 1, second.confirmed_round);
    }

    #[tokio::test]
    async fn test_failed_group_rolls_back_all_effects() {
        let emulator = Emulator::new();
        let sender = Address([1; 32]);
        let receiver = Address([2; 32]);
        // Enough for the first payment but not the second
        emulator.fund(&sender, 600_000 + 2000);

        let first = Transaction::Payment(PaymentTransactionFields {
            header: header(&sender),
            receiver: receiver.clone(),
            amount: 500_000,
        });
        let second = Transaction::Payment(PaymentTransactionFields {
            header: header(&sender),
            receiver: receiver.clone(),
            amount: 500_000,
        });
        let grouped = [first, second].as_slice().assign_group().unwrap();
        let txns: Vec<SignedTransaction> = grouped.into_iter().map(unsigned).collect();

        let response = emulator.simulate(simulate_request(txns)).await.unwrap();
        match &response.txn_groups[0].failure {
            Some(GroupFailure::Logic { index, .. }) => assert_eq!(*index, 1),
            other => panic!("Expected a logic failure, got {:?}", other),
        }

        assert_eq!(emulator.balance(&receiver), 0);
    }

    #[tokio::test]
    async fn test_submit_requires_valid_signature() {
        let emulator = Emulator::new();
        let sender = Address([1; 32]);
        emulator.fund(&sender, 1_000_000);

        let txn = Transaction::Payment(PaymentTransactionFields {
            header: header(&sender),
            receiver: Address([2; 32]),
            amount: 1,
        });

        let result = emulator.submit(&[unsigned(txn)]).await;
        assert!(matches!(result, Err(TransportError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_get_application_info_not_found() {
        let emulator = Emulator::new();
        let result = emulator.get_application_info(4242).await;
        assert!(matches!(
            result,
            Err(TransportError::NotFound { instance_id: 4242 })
        ));
    }
}
