mod common;

use common::{deploy, init_test_logging, method_call};
use meridian_abi::ABIValue;
use meridian_client::testing::{CounterProgram, GreeterProgram, RejectingProgram, emulator_fixture};
use meridian_client::{AppSchemas, CommonParams, EmptySigner, EngineError, PaymentParams, StateValue};
use meridian_transact::StateSchema;
use std::sync::Arc;

#[tokio::test]
async fn test_commit_greet_matches_simulation_cost() {
    init_test_logging();
    let fixture = emulator_fixture();
    fixture
        .emulator
        .register_program(GreeterProgram::APPROVAL, Arc::new(GreeterProgram));

    let instance = deploy(
        &fixture,
        "greeter",
        GreeterProgram::APPROVAL,
        GreeterProgram::CLEAR,
        AppSchemas::default(),
    )
    .await;

    let mut composer = fixture.new_composer();
    composer
        .add_method_call(method_call(
            &fixture,
            &instance,
            GreeterProgram::GREET,
            vec![ABIValue::from("World")],
        ))
        .expect("Failed to add call");
    let simulated = fixture
        .engine
        .simulate(composer.build().expect("Failed to build group"))
        .await
        .expect("Simulation should succeed");

    let mut composer = fixture.new_composer();
    composer
        .add_method_call(method_call(
            &fixture,
            &instance,
            GreeterProgram::GREET,
            vec![ABIValue::from("World")],
        ))
        .expect("Failed to add call");
    let committed = fixture
        .engine
        .commit(composer.build().expect("Failed to build group"))
        .await
        .expect("Commit should succeed");

    assert_eq!(
        committed.return_value(0),
        Some(&ABIValue::from("Hello, World"))
    );
    assert_eq!(committed.transaction_ids.len(), 1);
    assert!(committed.confirmed_round > 0);

    // Cost assertions made against simulate hold for commit
    assert_eq!(
        committed.group_budget_consumed,
        simulated.group_budget_consumed
    );
}

#[tokio::test]
async fn test_commit_group_id_spans_all_transactions() {
    init_test_logging();
    let fixture = emulator_fixture();
    fixture
        .emulator
        .register_program(CounterProgram::APPROVAL, Arc::new(CounterProgram));

    let counter = deploy(
        &fixture,
        "counter",
        CounterProgram::APPROVAL,
        CounterProgram::CLEAR,
        AppSchemas {
            global: StateSchema::new(1, 0),
            local: StateSchema::default(),
        },
    )
    .await;

    let mut composer = fixture.new_composer();
    composer
        .add_method_call(method_call(&fixture, &counter, CounterProgram::BUMP, vec![]))
        .expect("Failed to add call");
    composer
        .add_method_call(method_call(&fixture, &counter, CounterProgram::BUMP, vec![]))
        .expect("Failed to add call");
    let group = composer.build().expect("Failed to build group");
    assert!(group.group_id().is_some());

    let result = fixture.engine.commit(group).await.expect("Commit should succeed");
    assert_eq!(result.transaction_ids.len(), 2);
    assert_eq!(result.return_value(0), Some(&ABIValue::from(1u64)));
    assert_eq!(result.return_value(1), Some(&ABIValue::from(2u64)));

    assert_eq!(
        fixture
            .emulator
            .global_state(counter.instance_id, CounterProgram::COUNT_KEY),
        Some(StateValue::Uint(2))
    );
}

#[tokio::test]
async fn test_failed_commit_rolls_back_every_effect() {
    init_test_logging();
    let fixture = emulator_fixture();
    fixture
        .emulator
        .register_program(CounterProgram::APPROVAL, Arc::new(CounterProgram));
    fixture.emulator.register_program(
        RejectingProgram::APPROVAL,
        Arc::new(RejectingProgram::new("second call is engineered to fail")),
    );

    let counter = deploy(
        &fixture,
        "counter",
        CounterProgram::APPROVAL,
        CounterProgram::CLEAR,
        AppSchemas {
            global: StateSchema::new(1, 0),
            local: StateSchema::default(),
        },
    )
    .await;
    let rejecting = deploy(
        &fixture,
        "rejecting",
        RejectingProgram::APPROVAL,
        RejectingProgram::CLEAR,
        AppSchemas::default(),
    )
    .await;

    let round_before = fixture.emulator.round();

    let mut composer = fixture.new_composer();
    composer
        .add_method_call(method_call(&fixture, &counter, CounterProgram::BUMP, vec![]))
        .expect("Failed to add call");
    composer
        .add_method_call(method_call(&fixture, &rejecting, RejectingProgram::FAIL, vec![]))
        .expect("Failed to add call");
    let group = composer.build().expect("Failed to build group");

    match fixture.engine.commit(group).await {
        Err(EngineError::GroupExecutionFailed {
            failing_index,
            cause,
        }) => {
            assert_eq!(failing_index, 1);
            assert!(cause.contains("engineered to fail"));
        }
        other => panic!("Expected a group execution failure, got {:?}", other),
    }

    // The first call's effect must not be observable afterwards
    assert_eq!(
        fixture
            .emulator
            .global_state(counter.instance_id, CounterProgram::COUNT_KEY),
        None
    );
    assert_eq!(fixture.emulator.round(), round_before);
}

#[tokio::test]
async fn test_failed_commit_rolls_back_payments() {
    init_test_logging();
    let fixture = emulator_fixture();
    fixture
        .emulator
        .register_program(RejectingProgram::APPROVAL, Arc::new(RejectingProgram::default()));

    let rejecting = deploy(
        &fixture,
        "rejecting",
        RejectingProgram::APPROVAL,
        RejectingProgram::CLEAR,
        AppSchemas::default(),
    )
    .await;

    let receiver = fixture.generate_account(0);

    let mut composer = fixture.new_composer();
    composer
        .add_payment(PaymentParams {
            common_params: CommonParams {
                sender: fixture.test_account.address(),
                ..Default::default()
            },
            receiver: receiver.address(),
            amount: 1_000_000,
        })
        .expect("Failed to add payment");
    composer
        .add_method_call(method_call(&fixture, &rejecting, RejectingProgram::FAIL, vec![]))
        .expect("Failed to add call");
    let group = composer.build().expect("Failed to build group");

    let sender_balance_before = fixture.emulator.balance(&fixture.test_account.address());

    assert!(matches!(
        fixture.engine.commit(group).await,
        Err(EngineError::GroupExecutionFailed { failing_index: 1, .. })
    ));

    assert_eq!(fixture.emulator.balance(&receiver.address()), 0);
    assert_eq!(
        fixture.emulator.balance(&fixture.test_account.address()),
        sender_balance_before
    );
}

#[tokio::test]
async fn test_commit_without_signer_fails() {
    init_test_logging();
    let fixture = emulator_fixture();
    let stranger = fixture.generate_account(1_000_000);

    let mut composer = fixture.new_composer();
    composer
        .add_payment(PaymentParams {
            common_params: CommonParams {
                sender: stranger.address(),
                ..Default::default()
            },
            receiver: fixture.test_account.address(),
            amount: 1,
        })
        .expect("Failed to add payment");
    let group = composer.build().expect("Failed to build group");

    // The fixture's signer getter only answers for the fixture account
    assert!(matches!(
        fixture.engine.commit(group).await,
        Err(EngineError::SigningError { .. })
    ));
}

#[tokio::test]
async fn test_commit_rejects_invalid_signatures() {
    init_test_logging();
    let fixture = emulator_fixture();

    let mut composer = fixture.new_composer();
    composer
        .add_payment(PaymentParams {
            common_params: CommonParams {
                sender: fixture.test_account.address(),
                signer: Some(Arc::new(EmptySigner {})),
                ..Default::default()
            },
            receiver: fixture.test_account.address(),
            amount: 1,
        })
        .expect("Failed to add payment");
    let group = composer.build().expect("Failed to build group");

    assert!(matches!(
        fixture.engine.commit(group).await,
        Err(EngineError::SubmissionRejected { .. })
    ));
}
