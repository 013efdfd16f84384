//! Error types for the ledger boundary.

use offer_reward_core::{Address, CoreError, TxHash, U256};
use thiserror::Error;

/// Errors reported by a ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The contract rejected the call (failed precondition).
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// The sender cannot cover value plus maximum fee.
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: U256, required: U256 },

    /// Transaction nonce does not follow the sender's last one.
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: u64, got: u64 },

    /// Transaction was signed for another network.
    #[error("chain id mismatch: expected {expected}, got {got}")]
    ChainIdMismatch { expected: u64, got: u64 },

    /// Signature, sender or hash did not verify.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] CoreError),

    /// A transaction with this hash was already submitted.
    #[error("transaction already known: {0}")]
    AlreadyKnown(TxHash),

    /// Nothing is deployed at the target address.
    #[error("no contract deployed at {0}")]
    NoContract(Address),

    /// Block number beyond the current tip.
    #[error("unknown block {0}")]
    UnknownBlock(u64),

    /// The ledger could not serve the request.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
