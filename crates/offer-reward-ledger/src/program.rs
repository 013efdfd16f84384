//! Contract programs hosted by the in-memory ledger.
//!
//! The real contract is an external collaborator. [`MemoryLedger`] hosts any
//! [`Program`] so tests can run the client against executable contract
//! semantics without a network.
//!
//! [`MemoryLedger`]: crate::memory::MemoryLedger

use offer_reward_core::{Address, Token, U256};
use thiserror::Error;

/// Base cost of any transaction.
pub const BASE_GAS: u64 = 21_000;

/// Cost per positional argument.
pub const ARG_GAS: u64 = 2_000;

/// Cost per byte of string/bytes payload.
pub const BYTE_GAS: u64 = 16;

/// Execution context for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    /// Address the program is deployed at.
    pub contract: Address,
    pub sender: Address,
    /// Value attached to the call.
    pub value: U256,
    pub block_number: u64,
    /// Block timestamp in seconds.
    pub timestamp: u64,
}

/// An event emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    /// Values of the indexed fields, in declaration order.
    pub topics: Vec<Token>,
    pub args: Vec<Token>,
}

/// Effects of a successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub events: Vec<EmittedEvent>,
    /// Payments out of the contract's balance.
    pub transfers: Vec<(Address, U256)>,
}

/// A failed precondition inside the program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Revert(pub String);

impl Revert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Executable contract semantics.
///
/// Programs are cloned per block so the ledger can serve historic reads and
/// roll back on reorganization; keep state cheap to clone.
pub trait Program: Clone + Send + Sync + 'static {
    /// Run a read method. Must not depend on anything but `self` and `env`.
    fn call(&self, env: &Env, method: &str, args: &[Token]) -> Result<Vec<Token>, Revert>;

    /// Run a mutation. On `Err` the ledger discards every change.
    fn execute(&mut self, env: &Env, method: &str, args: &[Token]) -> Result<Outcome, Revert>;

    /// Gas consumed by a mutation.
    fn gas_cost(&self, method: &str, args: &[Token]) -> u64 {
        intrinsic_gas(method, args)
    }
}

/// Size-proportional cost: base + per argument + per payload byte.
pub fn intrinsic_gas(method: &str, args: &[Token]) -> u64 {
    fn payload_len(token: &Token) -> u64 {
        match token {
            Token::String(s) => s.len() as u64,
            Token::Bytes(b) => b.len() as u64,
            Token::Array(items) | Token::Tuple(items) => items.iter().map(payload_len).sum(),
            _ => 0,
        }
    }

    let bytes: u64 = method.len() as u64 + args.iter().map(payload_len).sum::<u64>();
    BASE_GAS + ARG_GAS * args.len() as u64 + BYTE_GAS * bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_gas_grows_with_payload() {
        let short = intrinsic_gas("publishOffer", &[Token::string("t")]);
        let long = intrinsic_gas("publishOffer", &[Token::string("title")]);
        assert_eq!(long - short, 4 * BYTE_GAS);
        assert!(short > BASE_GAS);
    }
}
