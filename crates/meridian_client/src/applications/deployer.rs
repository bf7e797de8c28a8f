use super::ContractInstance;
use crate::config::{AppDeployedEventData, Config, EventData, EventType};
use crate::simulation::{EngineError, SimulationEngine};
use crate::transactions::{
    AppCreateParams, AppUpdateParams, CommonParams, Composer, ComposerError, TxnSigner,
};
use crate::transport::{ApplicationInfo, LedgerTransport, TransportError};
use derive_more::Debug;
use log::{debug, info, warn};
use meridian_transact::{Address, StateSchema};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

/// What action to perform when a redeploy would break the deployed state schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeploymentPolicy {
    /// Fail the deployment (default).
    #[default]
    Fail,
    /// Attempt an in-place program replacement retaining existing state; only
    /// valid when the new schema does not narrow the deployed one.
    UpdateInPlace,
    /// Deploy a fresh instance under a new identity, leaving the old instance
    /// untouched.
    CreateNewVersion,
    /// Always create a new instance regardless of compatibility; for
    /// test/ephemeral environments that do not care about state continuity.
    AppendInstance,
}

/// Declared global and per-account schemas for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSchemas {
    pub global: StateSchema,
    pub local: StateSchema,
}

impl Display for AppSchemas {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "global {}, local {}", self.global, self.local)
    }
}

/// Derived, transient comparison of a declared schema against the deployed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaComparison {
    /// Identical slot counts.
    Equal,
    /// Strictly more slots somewhere, fewer nowhere; existing state fits.
    Superset,
    /// Fewer slots somewhere than deployed state requires; a schema break.
    Incompatible,
}

impl SchemaComparison {
    pub fn compare(requested: &AppSchemas, deployed: &AppSchemas) -> Self {
        if requested == deployed {
            SchemaComparison::Equal
        } else if requested.global.is_superset_of(&deployed.global)
            && requested.local.is_superset_of(&deployed.local)
        {
            SchemaComparison::Superset
        } else {
            SchemaComparison::Incompatible
        }
    }
}

/// The parameters to idempotently deploy a contract.
#[derive(Debug, Clone)]
pub struct DeployParams {
    /// The deployment name; the identity deployments resolve under.
    pub name: String,
    /// The creator account.
    pub sender: Address,
    /// Signer override for the deployment transactions.
    #[debug(skip)]
    pub signer: Option<Arc<dyn TxnSigner>>,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub schemas: AppSchemas,
    /// What to do when the requested schema breaks the deployed one.
    pub on_schema_break: DeploymentPolicy,
}

/// The terminal outcome of a deployment resolution. Every variant carries the
/// concrete [`ContractInstance`] to construct method calls against.
#[derive(Debug)]
pub enum AppDeployResult {
    /// A new instance was created (no instance existed, or the append policy
    /// forced a fresh one).
    Create { app: ContractInstance },
    /// The existing instance was updated in place.
    Update { app: ContractInstance },
    /// A fresh instance was created under a new identity; the superseded
    /// instance remains on the ledger untouched.
    NewVersion {
        app: ContractInstance,
        superseded: ContractInstance,
    },
    /// Program and schema already match; no network write was performed.
    NoOp { app: ContractInstance },
}

impl AppDeployResult {
    /// The resolved instance, regardless of which action produced it.
    pub fn app(&self) -> &ContractInstance {
        match self {
            AppDeployResult::Create { app }
            | AppDeployResult::Update { app }
            | AppDeployResult::NewVersion { app, .. }
            | AppDeployResult::NoOp { app } => app,
        }
    }

    fn action(&self) -> &'static str {
        match self {
            AppDeployResult::Create { .. } => "create",
            AppDeployResult::Update { .. } => "update",
            AppDeployResult::NewVersion { .. } => "new_version",
            AppDeployResult::NoOp { .. } => "no_op",
        }
    }
}

/// Errors that can occur during deployment resolution.
#[derive(Debug, Snafu)]
pub enum DeployError {
    /// The requested schema narrows the deployed one and the configured policy
    /// does not permit abandoning existing state.
    #[snafu(display("Schema break detected: deployed {existing}, requested {requested}"))]
    SchemaBreakError {
        existing: AppSchemas,
        requested: AppSchemas,
    },

    #[snafu(display("Engine error: {source}"))]
    EngineError { source: EngineError },

    #[snafu(display("Transport error: {source}"))]
    TransportError { source: TransportError },

    #[snafu(display("Composer error: {source}"))]
    ComposerError { source: ComposerError },

    #[snafu(display("Deployment failed: {message}"))]
    DeploymentFailed { message: String },
}

impl From<EngineError> for DeployError {
    fn from(source: EngineError) -> Self {
        Self::EngineError { source }
    }
}

impl From<TransportError> for DeployError {
    fn from(source: TransportError) -> Self {
        Self::TransportError { source }
    }
}

impl From<ComposerError> for DeployError {
    fn from(source: ComposerError) -> Self {
        Self::ComposerError { source }
    }
}

/// Resolves contract deployments against the ledger.
///
/// The deployer is the sole writer of instance identity and schema. Its
/// create/update decisions are serialized per deployment name: the identity
/// lock is acquired before the Absent/Present observation and released after
/// the transition, so two concurrent callers cannot both observe Absent and
/// both create.
#[derive(Clone)]
pub struct ContractDeployer {
    transport: Arc<dyn LedgerTransport>,
    engine: SimulationEngine,
    network_id: String,
    registry: Arc<Mutex<HashMap<String, u64>>>,
    identity_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ContractDeployer {
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        engine: SimulationEngine,
        network_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            engine,
            network_id: network_id.into(),
            registry: Arc::new(Mutex::new(HashMap::new())),
            identity_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn identity_lock(&self, name: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.identity_locks.lock().expect("identity lock map poisoned");
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn known_instance_id(&self, name: &str) -> Option<u64> {
        self.registry
            .lock()
            .expect("deployment registry poisoned")
            .get(name)
            .copied()
    }

    fn record_instance(&self, name: &str, instance_id: u64) {
        self.registry
            .lock()
            .expect("deployment registry poisoned")
            .insert(name.to_string(), instance_id);
    }

    /// Looks up the currently resolved instance for a deployment name.
    pub async fn resolve_instance(&self, name: &str) -> Option<ContractInstance> {
        let instance_id = self.known_instance_id(name)?;
        let info = self.transport.get_application_info(instance_id).await.ok()?;
        Some(self.instance_from_info(name, &info))
    }

    /// Idempotently deploys a contract under the given name, applying the
    /// configured schema-break policy. The terminal outcome is always a
    /// concrete [`ContractInstance`].
    pub async fn deploy(&self, params: DeployParams) -> Result<AppDeployResult, DeployError> {
        let lock = self.identity_lock(&params.name);
        let _guard = lock.lock().await;

        info!(
            "Resolving deployment of app \"{}\" for creator {} with {} bytes of approval program",
            params.name,
            params.sender,
            params.approval_program.len()
        );

        let existing = match self.known_instance_id(&params.name) {
            Some(instance_id) => match self.transport.get_application_info(instance_id).await {
                Ok(info) => Some(info),
                Err(TransportError::NotFound { .. }) => None,
                Err(error) => return Err(error.into()),
            },
            None => None,
        };

        let result = match existing {
            None => {
                info!(
                    "App {} not found in instances created by {}; deploying a new instance",
                    params.name, params.sender
                );
                let app = self.create_instance(&params).await?;
                AppDeployResult::Create { app }
            }
            Some(existing) => self.resolve_against_existing(&params, existing).await?,
        };

        Config::events()
            .emit(
                EventType::AppDeployed,
                EventData::AppDeployed(AppDeployedEventData {
                    name: params.name.clone(),
                    instance_id: result.app().instance_id,
                    action: result.action().to_string(),
                }),
            )
            .await;

        Ok(result)
    }

    async fn resolve_against_existing(
        &self,
        params: &DeployParams,
        existing: ApplicationInfo,
    ) -> Result<AppDeployResult, DeployError> {
        info!(
            "Existing app {} found with instance id {} and version {}",
            params.name, existing.instance_id, existing.version
        );

        if params.on_schema_break == DeploymentPolicy::AppendInstance {
            info!(
                "Executing the append strategy for {}; creating a new instance",
                params.name
            );
            let app = self.create_instance(params).await?;
            return Ok(AppDeployResult::Create { app });
        }

        let deployed = AppSchemas {
            global: existing.global_schema,
            local: existing.local_schema,
        };
        let program_changed = existing.approval_program != params.approval_program
            || existing.clear_state_program != params.clear_state_program;

        match SchemaComparison::compare(&params.schemas, &deployed) {
            SchemaComparison::Equal if !program_changed => {
                debug!("No detected changes in app {}, nothing to do", params.name);
                Ok(AppDeployResult::NoOp {
                    app: self.instance_from_info(&params.name, &existing),
                })
            }
            SchemaComparison::Equal => {
                info!("Detected a program change in app {}; updating in place", params.name);
                let app = self.update_instance(params, &existing, false).await?;
                Ok(AppDeployResult::Update { app })
            }
            SchemaComparison::Superset => {
                info!(
                    "Detected a widened schema in app {}; updating in place and adopting it",
                    params.name
                );
                let app = self.update_instance(params, &existing, true).await?;
                Ok(AppDeployResult::Update { app })
            }
            SchemaComparison::Incompatible => {
                warn!(
                    "Detected a breaking schema change in app {} (instance {})",
                    params.name, existing.instance_id
                );
                match params.on_schema_break {
                    DeploymentPolicy::Fail => Err(DeployError::SchemaBreakError {
                        existing: deployed,
                        requested: params.schemas,
                    }),
                    // An in-place update cannot retain state across a narrowing.
                    DeploymentPolicy::UpdateInPlace => Err(DeployError::SchemaBreakError {
                        existing: deployed,
                        requested: params.schemas,
                    }),
                    DeploymentPolicy::CreateNewVersion => {
                        info!(
                            "Executing the new-version strategy for {}; the previous instance {} is left untouched",
                            params.name, existing.instance_id
                        );
                        let superseded = self.instance_from_info(&params.name, &existing);
                        let app = self.create_instance(params).await?;
                        Ok(AppDeployResult::NewVersion { app, superseded })
                    }
                    DeploymentPolicy::AppendInstance => {
                        let app = self.create_instance(params).await?;
                        Ok(AppDeployResult::Create { app })
                    }
                }
            }
        }
    }

    async fn create_instance(&self, params: &DeployParams) -> Result<ContractInstance, DeployError> {
        let mut composer = Composer::new();
        composer.add_app_create(AppCreateParams {
            common_params: CommonParams {
                sender: params.sender.clone(),
                signer: params.signer.clone(),
                ..Default::default()
            },
            approval_program: params.approval_program.clone(),
            clear_state_program: params.clear_state_program.clone(),
            global_schema: params.schemas.global,
            local_schema: params.schemas.local,
        })?;
        let group = composer.build()?;

        let result = self.engine.commit(group).await?;
        let instance_id = result
            .call_results
            .last()
            .and_then(|r| r.instance_id)
            .ok_or_else(|| DeployError::DeploymentFailed {
                message: "App creation confirmation is missing the allocated instance id"
                    .to_string(),
            })?;

        self.record_instance(&params.name, instance_id);
        info!(
            "Created app {} with instance id {} at round {}",
            params.name, instance_id, result.confirmed_round
        );

        Ok(ContractInstance {
            instance_id,
            name: params.name.clone(),
            version: 1,
            creator: params.sender.clone(),
            approval_program: params.approval_program.clone(),
            clear_state_program: params.clear_state_program.clone(),
            global_schema: params.schemas.global,
            local_schema: params.schemas.local,
            network_id: self.network_id.clone(),
            created_round: result.confirmed_round,
            updated_round: result.confirmed_round,
        })
    }

    async fn update_instance(
        &self,
        params: &DeployParams,
        existing: &ApplicationInfo,
        widen_schema: bool,
    ) -> Result<ContractInstance, DeployError> {
        let mut composer = Composer::new();
        composer.add_app_update(AppUpdateParams {
            common_params: CommonParams {
                sender: params.sender.clone(),
                signer: params.signer.clone(),
                ..Default::default()
            },
            instance_id: existing.instance_id,
            approval_program: params.approval_program.clone(),
            clear_state_program: params.clear_state_program.clone(),
            global_schema: widen_schema.then_some(params.schemas.global),
            local_schema: widen_schema.then_some(params.schemas.local),
        })?;
        let group = composer.build()?;

        let result = self.engine.commit(group).await?;
        self.record_instance(&params.name, existing.instance_id);
        info!(
            "Updated app {} (instance {}) to version {} at round {}",
            params.name,
            existing.instance_id,
            existing.version + 1,
            result.confirmed_round
        );

        let schemas = if widen_schema {
            params.schemas
        } else {
            AppSchemas {
                global: existing.global_schema,
                local: existing.local_schema,
            }
        };

        Ok(ContractInstance {
            instance_id: existing.instance_id,
            name: params.name.clone(),
            version: existing.version + 1,
            creator: existing.creator.clone(),
            approval_program: params.approval_program.clone(),
            clear_state_program: params.clear_state_program.clone(),
            global_schema: schemas.global,
            local_schema: schemas.local,
            network_id: self.network_id.clone(),
            created_round: existing.created_round,
            updated_round: result.confirmed_round,
        })
    }

    fn instance_from_info(&self, name: &str, info: &ApplicationInfo) -> ContractInstance {
        ContractInstance {
            instance_id: info.instance_id,
            name: name.to_string(),
            version: info.version,
            creator: info.creator.clone(),
            approval_program: info.approval_program.clone(),
            clear_state_program: info.clear_state_program.clone(),
            global_schema: info.global_schema,
            local_schema: info.local_schema,
            network_id: self.network_id.clone(),
            created_round: info.created_round,
            updated_round: info.updated_round,
        }
    }
}
