//! Reference contract programs for exercising the client against the emulator.

use crate::emulator::{CallContext, ContractProgram, ProgramError, StateValue};
use meridian_abi::{ABIMethod, ABIType, ABIValue, BitSize};
use std::str::FromStr;

fn method(signature: &str) -> Result<ABIMethod, ProgramError> {
    ABIMethod::from_str(signature).map_err(|e| ProgramError::Assertion {
        message: e.to_string(),
    })
}

fn selector_of(signature: &str) -> Result<Vec<u8>, ProgramError> {
    method(signature)?
        .selector()
        .map_err(|e| ProgramError::Assertion {
            message: e.to_string(),
        })
}

fn encode(abi_type: &ABIType, value: &ABIValue) -> Result<Vec<u8>, ProgramError> {
    abi_type.encode(value).map_err(|e| ProgramError::Assertion {
        message: e.to_string(),
    })
}

/// Implements `greet(string)->string`, replying `"Hello, {name}"`.
pub struct GreeterProgram;

impl GreeterProgram {
    pub const APPROVAL: &'static [u8] = b"greeter-approval-v1";
    pub const CLEAR: &'static [u8] = b"greeter-clear-v1";
    pub const GREET: &'static str = "greet(string)->string";
}

impl ContractProgram for GreeterProgram {
    fn invoke(&self, ctx: &mut CallContext<'_>) -> Result<(), ProgramError> {
        if ctx.selector()? != selector_of(Self::GREET)?.as_slice() {
            return Err(ProgramError::Assertion {
                message: "unknown method selector".to_string(),
            });
        }

        let raw_name = ctx.arg(0)?.to_vec();
        let name = match ABIType::String.decode(&raw_name) {
            Ok(ABIValue::String(name)) => name,
            _ => {
                return Err(ProgramError::Assertion {
                    message: "malformed string argument".to_string(),
                });
            }
        };

        let reply = ABIValue::String(format!("Hello, {}", name));
        let encoded = encode(&ABIType::String, &reply)?;
        ctx.set_return(encoded);
        Ok(())
    }
}

/// Implements `bump()->uint64`, incrementing a global counter and returning
/// the new value. Requires a schema with at least one global integer slot.
pub struct CounterProgram;

impl CounterProgram {
    pub const APPROVAL: &'static [u8] = b"counter-approval-v1";
    pub const CLEAR: &'static [u8] = b"counter-clear-v1";
    pub const BUMP: &'static str = "bump()->uint64";
    pub const COUNT_KEY: &'static str = "count";
}

impl ContractProgram for CounterProgram {
    fn invoke(&self, ctx: &mut CallContext<'_>) -> Result<(), ProgramError> {
        if ctx.selector()? != selector_of(Self::BUMP)?.as_slice() {
            return Err(ProgramError::Assertion {
                message: "unknown method selector".to_string(),
            });
        }

        let current = match ctx.global_get(Self::COUNT_KEY) {
            Some(StateValue::Uint(value)) => value,
            Some(StateValue::Bytes(_)) => {
                return Err(ProgramError::State {
                    message: format!("key \"{}\" holds bytes, expected uint", Self::COUNT_KEY),
                });
            }
            None => 0,
        };
        let bumped = current + 1;
        ctx.global_put(Self::COUNT_KEY, StateValue::Uint(bumped))?;

        let uint64 = ABIType::Uint(BitSize::new(64).map_err(|e| ProgramError::Assertion {
            message: e.to_string(),
        })?);
        let encoded = encode(&uint64, &ABIValue::from(bumped))?;
        ctx.set_return(encoded);
        Ok(())
    }
}

/// Fails every call with a configurable diagnostic; for atomicity tests.
pub struct RejectingProgram {
    message: String,
}

impl RejectingProgram {
    pub const APPROVAL: &'static [u8] = b"rejecting-approval-v1";
    pub const CLEAR: &'static [u8] = b"rejecting-clear-v1";
    pub const FAIL: &'static str = "fail()";

    pub fn new(message: impl Into<String>) -> Self {
        RejectingProgram {
            message: message.into(),
        }
    }
}

impl Default for RejectingProgram {
    fn default() -> Self {
        Self::new("intentional failure")
    }
}

impl ContractProgram for RejectingProgram {
    fn invoke(&self, _ctx: &mut CallContext<'_>) -> Result<(), ProgramError> {
        Err(ProgramError::Assertion {
            message: self.message.clone(),
        })
    }
}

/// Implements `spin()`, burning budget on SHA-256 rounds; for resource
/// ceiling tests.
pub struct HeavyProgram {
    rounds: u32,
}

impl HeavyProgram {
    pub const APPROVAL: &'static [u8] = b"heavy-approval-v1";
    pub const CLEAR: &'static [u8] = b"heavy-clear-v1";
    pub const SPIN: &'static str = "spin()";

    pub fn new(rounds: u32) -> Self {
        HeavyProgram { rounds }
    }
}

impl ContractProgram for HeavyProgram {
    fn invoke(&self, ctx: &mut CallContext<'_>) -> Result<(), ProgramError> {
        if ctx.selector()? != selector_of(Self::SPIN)?.as_slice() {
            return Err(ProgramError::Assertion {
                message: "unknown method selector".to_string(),
            });
        }

        let mut digest = b"spin".to_vec();
        for _ in 0..self.rounds {
            digest = ctx.sha256(&digest).to_vec();
        }
        Ok(())
    }
}
