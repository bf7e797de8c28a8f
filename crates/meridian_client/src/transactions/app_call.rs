use super::common::CommonParams;
use super::composer::ComposerError;
use crate::applications::ContractInstance;
use meridian_abi::{ABIMethod, ABIValue};
use meridian_transact::{
    AppCallTransactionFields, AppCreateTransactionFields, AppUpdateTransactionFields, MAX_APP_ARGS,
    MAX_ARGS_SIZE, StateSchema, Transaction, TransactionHeader,
};

/// Parameters for a typed method call against a deployed contract instance.
#[derive(Debug, Clone)]
pub struct MethodCallParams {
    pub common_params: CommonParams,
    /// The target instance, held read-only; only the deployer mutates instances.
    pub instance: ContractInstance,
    pub method: ABIMethod,
    /// Bound argument values, one per declared parameter.
    pub args: Vec<ABIValue>,
}

/// Parameters for deploying a new contract instance.
#[derive(Debug, Default, Clone)]
pub struct AppCreateParams {
    pub common_params: CommonParams,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
}

/// Parameters for replacing the programs of an existing contract instance.
#[derive(Debug, Default, Clone)]
pub struct AppUpdateParams {
    pub common_params: CommonParams,
    pub instance_id: u64,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    /// Widened global schema; `None` keeps the deployed layout.
    pub global_schema: Option<StateSchema>,
    /// Widened per-account schema; `None` keeps the deployed layout.
    pub local_schema: Option<StateSchema>,
}

pub(crate) fn build_method_call(
    params: &MethodCallParams,
    header: TransactionHeader,
) -> Result<Transaction, ComposerError> {
    let selector = params.method.selector()?;
    let encoded_args = params.method.encode_args(&params.args)?;

    let mut app_args = Vec::with_capacity(1 + encoded_args.len());
    app_args.push(selector);
    app_args.extend(encoded_args);

    if app_args.len() > MAX_APP_ARGS {
        return Err(ComposerError::TransactionError {
            message: format!(
                "Method call has {} application arguments, maximum is {}",
                app_args.len(),
                MAX_APP_ARGS
            ),
        });
    }
    let args_size: usize = app_args.iter().map(|a| a.len()).sum();
    if args_size > MAX_ARGS_SIZE {
        return Err(ComposerError::TransactionError {
            message: format!(
                "Method call arguments occupy {} bytes, maximum is {}",
                args_size, MAX_ARGS_SIZE
            ),
        });
    }

    Ok(Transaction::AppCall(AppCallTransactionFields {
        header,
        instance_id: params.instance.instance_id,
        app_args,
    }))
}

pub(crate) fn build_app_create(params: &AppCreateParams, header: TransactionHeader) -> Transaction {
    Transaction::AppCreate(AppCreateTransactionFields {
        header,
        approval_program: params.approval_program.clone(),
        clear_state_program: params.clear_state_program.clone(),
        global_schema: params.global_schema,
        local_schema: params.local_schema,
    })
}

pub(crate) fn build_app_update(params: &AppUpdateParams, header: TransactionHeader) -> Transaction {
    Transaction::AppUpdate(AppUpdateTransactionFields {
        header,
        instance_id: params.instance_id,
        approval_program: params.approval_program.clone(),
        clear_state_program: params.clear_state_program.clone(),
        global_schema: params.global_schema,
        local_schema: params.local_schema,
    })
}
