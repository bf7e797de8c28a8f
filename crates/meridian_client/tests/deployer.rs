mod common;

use common::{deploy, init_test_logging, method_call};
use meridian_abi::ABIValue;
use meridian_client::testing::{CounterProgram, GreeterProgram, emulator_fixture};
use meridian_client::{
    AppDeployResult, AppSchemas, DeployError, DeployParams, DeploymentPolicy, LedgerTransport,
    StateValue,
};
use meridian_transact::StateSchema;
use std::sync::Arc;

fn deploy_params(
    fixture: &meridian_client::testing::EmulatorFixture,
    name: &str,
    approval_program: &[u8],
    schemas: AppSchemas,
    on_schema_break: DeploymentPolicy,
) -> DeployParams {
    DeployParams {
        name: name.to_string(),
        sender: fixture.test_account.address(),
        signer: None,
        approval_program: approval_program.to_vec(),
        clear_state_program: GreeterProgram::CLEAR.to_vec(),
        schemas,
        on_schema_break,
    }
}

fn one_int_schema() -> AppSchemas {
    AppSchemas {
        global: StateSchema::new(1, 0),
        local: StateSchema::default(),
    }
}

#[tokio::test]
async fn test_deploy_absent_creates_instance() {
    init_test_logging();
    let fixture = emulator_fixture();

    let result = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::Fail,
        ))
        .await
        .expect("Deployment should succeed");

    match &result {
        AppDeployResult::Create { app } => {
            assert_eq!(app.name, "app");
            assert_eq!(app.version, 1);
            assert_eq!(app.network_id, fixture.emulator.network_id());
            assert!(
                fixture
                    .emulator
                    .get_application_info(app.instance_id)
                    .await
                    .is_ok()
            );
        }
        other => panic!("Expected a create outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redeploy_identical_is_a_no_op() {
    init_test_logging();
    let fixture = emulator_fixture();

    let first = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::Fail,
        ))
        .await
        .expect("Deployment should succeed");
    let round_after_create = fixture.emulator.round();

    let second = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::Fail,
        ))
        .await
        .expect("Redeployment should succeed");

    match &second {
        AppDeployResult::NoOp { app } => {
            assert_eq!(app.instance_id, first.app().instance_id);
            assert_eq!(app.version, 1);
        }
        other => panic!("Expected a no-op outcome, got {:?}", other),
    }
    // Idempotent resolution performs no redundant network write
    assert_eq!(fixture.emulator.round(), round_after_create);
}

#[tokio::test]
async fn test_program_change_updates_in_place_retaining_state() {
    init_test_logging();
    let fixture = emulator_fixture();
    fixture
        .emulator
        .register_program(CounterProgram::APPROVAL, Arc::new(CounterProgram));
    fixture
        .emulator
        .register_program(b"counter-approval-v2".as_slice(), Arc::new(CounterProgram));

    let instance = deploy(
        &fixture,
        "counter",
        CounterProgram::APPROVAL,
        CounterProgram::CLEAR,
        one_int_schema(),
    )
    .await;

    // Establish state under the first program version
    let mut composer = fixture.new_composer();
    composer
        .add_method_call(method_call(&fixture, &instance, CounterProgram::BUMP, vec![]))
        .expect("Failed to add call");
    fixture
        .engine
        .commit(composer.build().expect("Failed to build group"))
        .await
        .expect("Commit should succeed");

    let result = fixture
        .deployer
        .deploy(DeployParams {
            name: "counter".to_string(),
            sender: fixture.test_account.address(),
            signer: None,
            approval_program: b"counter-approval-v2".to_vec(),
            clear_state_program: CounterProgram::CLEAR.to_vec(),
            schemas: one_int_schema(),
            on_schema_break: DeploymentPolicy::Fail,
        })
        .await
        .expect("Redeployment should succeed");

    let updated = match &result {
        AppDeployResult::Update { app } => app.clone(),
        other => panic!("Expected an update outcome, got {:?}", other),
    };
    assert_eq!(updated.instance_id, instance.instance_id);
    assert_eq!(updated.version, 2);

    // Existing state survives the in-place program replacement
    assert_eq!(
        fixture
            .emulator
            .global_state(instance.instance_id, CounterProgram::COUNT_KEY),
        Some(StateValue::Uint(1))
    );
    let mut composer = fixture.new_composer();
    composer
        .add_method_call(method_call(&fixture, &updated, CounterProgram::BUMP, vec![]))
        .expect("Failed to add call");
    let result = fixture
        .engine
        .commit(composer.build().expect("Failed to build group"))
        .await
        .expect("Commit should succeed");
    assert_eq!(result.return_value(0), Some(&ABIValue::from(2u64)));
}

#[tokio::test]
async fn test_widened_schema_updates_in_place() {
    init_test_logging();
    let fixture = emulator_fixture();

    deploy(
        &fixture,
        "app",
        GreeterProgram::APPROVAL,
        GreeterProgram::CLEAR,
        one_int_schema(),
    )
    .await;

    let result = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas {
                global: StateSchema::new(2, 1),
                local: StateSchema::default(),
            },
            DeploymentPolicy::Fail,
        ))
        .await
        .expect("Redeployment should succeed");

    match &result {
        AppDeployResult::Update { app } => {
            assert_eq!(app.global_schema, StateSchema::new(2, 1));
            let info = fixture
                .emulator
                .get_application_info(app.instance_id)
                .await
                .expect("Instance should exist");
            assert_eq!(info.global_schema, StateSchema::new(2, 1));
        }
        other => panic!("Expected an update outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_schema_break_fails_under_fail_policy() {
    init_test_logging();
    let fixture = emulator_fixture();

    deploy(
        &fixture,
        "app",
        GreeterProgram::APPROVAL,
        GreeterProgram::CLEAR,
        one_int_schema(),
    )
    .await;

    let result = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::Fail,
        ))
        .await;

    match result {
        Err(DeployError::SchemaBreakError {
            existing,
            requested,
        }) => {
            assert_eq!(existing.global, StateSchema::new(1, 0));
            assert_eq!(requested.global, StateSchema::default());
        }
        other => panic!("Expected a schema break error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_schema_break_fails_under_update_in_place_policy() {
    init_test_logging();
    let fixture = emulator_fixture();

    deploy(
        &fixture,
        "app",
        GreeterProgram::APPROVAL,
        GreeterProgram::CLEAR,
        one_int_schema(),
    )
    .await;

    // An in-place update cannot retain state across a narrowing
    let result = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::UpdateInPlace,
        ))
        .await;

    assert!(matches!(result, Err(DeployError::SchemaBreakError { .. })));
}

#[tokio::test]
async fn test_schema_break_creates_new_version() {
    init_test_logging();
    let fixture = emulator_fixture();

    let first = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            one_int_schema(),
            DeploymentPolicy::Fail,
        ))
        .await
        .expect("Deployment should succeed");
    let first_id = first.app().instance_id;

    let result = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::CreateNewVersion,
        ))
        .await
        .expect("Redeployment should succeed");

    match &result {
        AppDeployResult::NewVersion { app, superseded } => {
            assert_ne!(app.instance_id, first_id);
            assert_eq!(superseded.instance_id, first_id);
        }
        other => panic!("Expected a new-version outcome, got {:?}", other),
    }

    // The previous instance remains on the ledger, untouched
    let old_info = fixture
        .emulator
        .get_application_info(first_id)
        .await
        .expect("Superseded instance should remain queryable");
    assert_eq!(old_info.global_schema, StateSchema::new(1, 0));
}

#[tokio::test]
async fn test_append_instance_always_creates() {
    init_test_logging();
    let fixture = emulator_fixture();

    let first = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            one_int_schema(),
            DeploymentPolicy::AppendInstance,
        ))
        .await
        .expect("Deployment should succeed");

    // Identical program and schema, but the append policy still creates fresh
    let second = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            one_int_schema(),
            DeploymentPolicy::AppendInstance,
        ))
        .await
        .expect("Redeployment should succeed");

    let first_id = first.app().instance_id;
    let second_id = second.app().instance_id;
    assert_ne!(first_id, second_id);
    assert!(matches!(second, AppDeployResult::Create { .. }));

    let old_info = fixture
        .emulator
        .get_application_info(first_id)
        .await
        .expect("Original instance should remain queryable");
    assert_eq!(old_info.global_schema, StateSchema::new(1, 0));
}

#[tokio::test]
async fn test_append_instance_on_schema_break() {
    init_test_logging();
    let fixture = emulator_fixture();

    let first = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            one_int_schema(),
            DeploymentPolicy::Fail,
        ))
        .await
        .expect("Deployment should succeed");

    // Shrinking schema under the append policy yields a distinct instance
    let second = fixture
        .deployer
        .deploy(deploy_params(
            &fixture,
            "app",
            GreeterProgram::APPROVAL,
            AppSchemas::default(),
            DeploymentPolicy::AppendInstance,
        ))
        .await
        .expect("Redeployment should succeed");

    assert_ne!(first.app().instance_id, second.app().instance_id);
}

#[tokio::test]
async fn test_concurrent_deploys_create_once() {
    init_test_logging();
    let fixture = emulator_fixture();

    let deployer_one = fixture.deployer.clone();
    let deployer_two = fixture.deployer.clone();
    let params_one = deploy_params(
        &fixture,
        "app",
        GreeterProgram::APPROVAL,
        AppSchemas::default(),
        DeploymentPolicy::Fail,
    );
    let params_two = params_one.clone();

    let (first, second) = tokio::join!(
        tokio::spawn(async move { deployer_one.deploy(params_one).await }),
        tokio::spawn(async move { deployer_two.deploy(params_two).await }),
    );
    let first = first.expect("task panicked").expect("Deployment should succeed");
    let second = second.expect("task panicked").expect("Deployment should succeed");

    // The identity lock serializes the decision: one creates, the other
    // observes the existing instance
    assert_eq!(first.app().instance_id, second.app().instance_id);
    let creates = usize::from(matches!(first, AppDeployResult::Create { .. }))
        + usize::from(matches!(second, AppDeployResult::Create { .. }));
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn test_distinct_names_resolve_independently() {
    init_test_logging();
    let fixture = emulator_fixture();

    let one = deploy(
        &fixture,
        "one",
        GreeterProgram::APPROVAL,
        GreeterProgram::CLEAR,
        AppSchemas::default(),
    )
    .await;
    let two = deploy(
        &fixture,
        "two",
        GreeterProgram::APPROVAL,
        GreeterProgram::CLEAR,
        AppSchemas::default(),
    )
    .await;

    assert_ne!(one.instance_id, two.instance_id);
    assert_eq!(
        fixture
            .deployer
            .resolve_instance("one")
            .await
            .map(|app| app.instance_id),
        Some(one.instance_id)
    );
}
