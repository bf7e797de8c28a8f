mod engine;
mod results;

pub use engine::{EngineError, SimulateParams, SimulationEngine};
pub use results::{CallOutcome, CallResult, CommitResult, SimulationResult};
