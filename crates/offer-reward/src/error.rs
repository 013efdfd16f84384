//! Error types for the client.

use offer_reward_core::{DecodeError, TxHash};
use offer_reward_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during client operations.
///
/// Every variant raised on behalf of a contract call names the operation,
/// and carries the ledger error as its source where one exists.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No deployment is registered for the network.
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(u64),

    /// The credential cannot reach a ledger.
    #[error("credential has no provider attached")]
    NoProvider,

    /// `address()` was called before a successful `connect`.
    #[error("client is not connected")]
    NotConnected,

    /// A mutation was attempted without a connected write credential.
    #[error("{operation}: no signer")]
    NoSigner { operation: &'static str },

    /// A read or event query was attempted before `connect`.
    #[error("{operation}: no contract")]
    ContractUnavailable { operation: &'static str },

    /// The ledger refused the mutation before inclusion.
    #[error("{operation}: transaction rejected")]
    TransactionRejected {
        operation: &'static str,
        #[source]
        source: LedgerError,
    },

    /// The mutation was submitted but did not reach the requested depth.
    #[error("{operation}: transaction {tx} failed")]
    TransactionFailed {
        operation: &'static str,
        tx: TxHash,
        #[source]
        reason: FailureReason,
    },

    /// The receipt did not contain the event the operation emits.
    #[error("{operation}: no {event} event in transaction {tx}")]
    MissingExpectedEvent {
        operation: &'static str,
        event: &'static str,
        tx: TxHash,
    },

    /// The receipt contained the expected event more than once.
    #[error("{operation}: {count} {event} events in transaction {tx}")]
    AmbiguousEvent {
        operation: &'static str,
        event: &'static str,
        tx: TxHash,
        count: usize,
    },

    /// A single-result event query matched nothing.
    #[error("no {event} event in blocks {from}..={to}")]
    EventNotFound {
        event: &'static str,
        from: u64,
        to: u64,
    },

    /// The ledger returned values of the wrong shape.
    #[error("{operation}: malformed result")]
    Decode {
        operation: &'static str,
        #[source]
        source: DecodeError,
    },

    /// A read call failed at the ledger.
    #[error("{operation}: ledger error")]
    Ledger {
        operation: &'static str,
        #[source]
        source: LedgerError,
    },

    /// Deployment metadata could not be loaded.
    #[error("deployment registry: {0}")]
    Registry(String),
}

/// Why a submitted transaction did not confirm.
#[derive(Debug, Error)]
pub enum FailureReason {
    /// Included, but execution failed.
    #[error("reverted in block {block}")]
    Reverted { block: u64 },

    /// The including block left the canonical chain.
    #[error("dropped by chain reorganization")]
    Dropped,

    /// The ledger failed while confirmations were awaited.
    #[error("ledger error while awaiting confirmations")]
    Ledger(#[source] LedgerError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
