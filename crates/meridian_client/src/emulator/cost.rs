/// Budget units granted per application call in a group. The budget pools
/// across the group, so one expensive call can borrow from cheaper siblings.
pub const BUDGET_PER_APP_CALL: u64 = 700;

/// The ledger's resource pricing: a fixed per-call cost plus variable costs
/// for state and cryptographic operations.
///
/// Both `simulate` and `submit` run the same meter, so cost assertions made
/// against a dry run hold for the commit path as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostTable {
    /// Fixed cost charged when a call begins (selector dispatch and routing).
    pub call_base: u64,
    /// Cost per emitted log entry.
    pub log: u64,
    /// Cost per global state read.
    pub state_read: u64,
    /// Cost per global state write.
    pub state_write: u64,
    /// Cost per SHA-256 digest.
    pub sha256: u64,
    /// Cost per ed25519 signature verification performed inside a call.
    pub ed25519_verify: u64,
}

impl Default for CostTable {
    fn default() -> Self {
        CostTable {
            call_base: 15,
            log: 1,
            state_read: 1,
            state_write: 1,
            sha256: 35,
            ed25519_verify: 1900,
        }
    }
}
