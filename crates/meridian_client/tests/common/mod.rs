use meridian_abi::ABIValue;
use meridian_client::testing::EmulatorFixture;
use meridian_client::{
    AppSchemas, CommonParams, ContractInstance, DeployParams, DeploymentPolicy, MethodCallParams,
};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Deploys a program under the given name with the default fail-on-break policy.
pub async fn deploy(
    fixture: &EmulatorFixture,
    name: &str,
    approval_program: &[u8],
    clear_state_program: &[u8],
    schemas: AppSchemas,
) -> ContractInstance {
    fixture
        .deployer
        .deploy(DeployParams {
            name: name.to_string(),
            sender: fixture.test_account.address(),
            signer: None,
            approval_program: approval_program.to_vec(),
            clear_state_program: clear_state_program.to_vec(),
            schemas,
            on_schema_break: DeploymentPolicy::Fail,
        })
        .await
        .expect("Failed to deploy application")
        .app()
        .clone()
}

/// Builds method call params against an instance, sent by the fixture account.
pub fn method_call(
    fixture: &EmulatorFixture,
    instance: &ContractInstance,
    signature: &str,
    args: Vec<ABIValue>,
) -> MethodCallParams {
    MethodCallParams {
        common_params: CommonParams {
            sender: fixture.test_account.address(),
            ..Default::default()
        },
        instance: instance.clone(),
        method: signature.parse().expect("Invalid method signature"),
        args,
    }
}
