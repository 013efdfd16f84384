//! # OfferReward Core
//!
//! Pure primitives for the OfferReward client: addresses, hashes, signing
//! identities, contract argument tokens, typed events and transactions.
//!
//! This crate contains no I/O and no networking. Everything here is a value
//! type that the ledger boundary and the client pass around.
//!
//! ## Key Types
//!
//! - [`Address`] - 20-byte account / contract address
//! - [`TxHash`] - Ledger-assigned transaction identifier
//! - [`Token`] - A single positional contract argument or return value
//! - [`ContractEvent`] - Typed projection of an emitted event
//! - [`TransactionRequest`] / [`SignedTransaction`] - What gets submitted
//! - [`Receipt`] / [`Log`] - What the ledger reports back
//!
//! ## Canonicalization
//!
//! Transactions are signed over deterministic CBOR bytes. See [`transaction`].

pub mod crypto;
pub mod error;
pub mod event;
pub mod model;
pub mod receipt;
pub mod token;
pub mod transaction;
pub mod types;

pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{CoreError, DecodeError};
pub use event::{AnswerPublished, ContractEvent, OfferFinished, OfferPublished};
pub use model::{OfferData, PublisherData};
pub use receipt::{Log, LogFilter, Receipt};
pub use token::{decode_single, Token, TokenReader, Tokenizable};
pub use transaction::{CallOverrides, CallRequest, Overrides, SignedTransaction, TransactionRequest};
pub use types::{Address, BlockHash, TxHash};

/// Re-exported so callers can build values without depending on
/// `primitive-types` directly.
pub use primitive_types::U256;
