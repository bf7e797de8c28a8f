mod deployer;

pub use deployer::{
    AppDeployResult, AppSchemas, ContractDeployer, DeployError, DeployParams, DeploymentPolicy,
    SchemaComparison,
};

use meridian_transact::{Address, StateSchema};

/// A deployed contract instance as known to this client.
///
/// Identity and schema are written only by the deployer; every other component
/// holds instances read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractInstance {
    /// The stable identifier naming this deployed instance, distinct from its
    /// program version.
    pub instance_id: u64,
    /// The deployment name this instance resolves under.
    pub name: String,
    /// Program version counter, bumped on every in-place update.
    pub version: u64,
    /// The account that created the instance.
    pub creator: Address,
    pub approval_program: Vec<u8>,
    pub clear_state_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    /// The network this instance is reachable under.
    pub network_id: String,
    pub created_round: u64,
    pub updated_round: u64,
}

impl ContractInstance {
    /// The ledger-held account address associated with this instance.
    pub fn instance_address(&self) -> Address {
        Address::from_instance_id(&self.instance_id)
    }
}
