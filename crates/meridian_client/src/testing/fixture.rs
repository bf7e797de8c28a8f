use super::account::SigningAccount;
use crate::applications::ContractDeployer;
use crate::emulator::Emulator;
use crate::simulation::SimulationEngine;
use crate::transactions::Composer;
use crate::transport::LedgerTransport;
use std::sync::Arc;

const DEFAULT_TEST_FUNDS: u64 = 10_000_000_000;

/// An ephemeral per-test execution context: a fresh emulator, a funded test
/// account wired up as the engine's signer, and a deployer bound to the
/// emulator's network.
///
/// Every fixture owns its own emulator, so state is discarded on every exit
/// path and never shared across tests.
pub struct EmulatorFixture {
    pub emulator: Arc<Emulator>,
    pub test_account: SigningAccount,
    pub engine: SimulationEngine,
    pub deployer: ContractDeployer,
}

impl EmulatorFixture {
    pub fn new() -> Self {
        let emulator = Arc::new(Emulator::new());
        Self::with_emulator(emulator)
    }

    pub fn with_emulator(emulator: Arc<Emulator>) -> Self {
        let test_account = SigningAccount::generate();
        emulator.fund(&test_account.address(), DEFAULT_TEST_FUNDS);

        let transport: Arc<dyn LedgerTransport> = emulator.clone();
        let engine = SimulationEngine::new(transport.clone(), Arc::new(test_account.clone()));
        let deployer = ContractDeployer::new(transport, engine.clone(), emulator.network_id());

        EmulatorFixture {
            emulator,
            test_account,
            engine,
            deployer,
        }
    }

    pub fn new_composer(&self) -> Composer {
        Composer::new()
    }

    /// Generates and funds an additional account on this fixture's emulator.
    pub fn generate_account(&self, initial_funds: u64) -> SigningAccount {
        let account = SigningAccount::generate();
        self.emulator.fund(&account.address(), initial_funds);
        account
    }
}

impl Default for EmulatorFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a fresh scoped fixture.
pub fn emulator_fixture() -> EmulatorFixture {
    EmulatorFixture::new()
}
