//! Error types for the OfferReward core.

use thiserror::Error;

/// Errors raised while building, encoding or verifying core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("signer {signer} does not match transaction sender {from}")]
    SenderMismatch { signer: String, from: String },

    #[error("transaction hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Errors raised while projecting ledger tokens into typed values.
///
/// These signal a mismatch between what the client expects and what the
/// contract actually returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("integer does not fit in {0}")]
    Overflow(&'static str),

    #[error("missing argument at position {0}")]
    MissingArgument(usize),

    #[error("unexpected trailing arguments: expected {expected}, found {found}")]
    TrailingArguments { expected: usize, found: usize },

    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}
