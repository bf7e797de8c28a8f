mod account;
mod fixture;
mod generators;
mod programs;

pub use account::SigningAccount;
pub use fixture::{EmulatorFixture, emulator_fixture};
pub use generators::ValueGenerator;
pub use programs::{CounterProgram, GreeterProgram, HeavyProgram, RejectingProgram};
