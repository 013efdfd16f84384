//! Typed projections of the contract's events.
//!
//! Each event record is an immutable value built from one emitted log's
//! positional arguments plus the hash of the transaction that emitted it.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::token::{Token, TokenReader, Tokenizable};
use crate::types::{Address, TxHash};

/// An event kind the client knows how to project.
pub trait ContractEvent: Sized + Send + 'static {
    /// Event name as emitted by the contract.
    const NAME: &'static str;

    /// Project the event's positional arguments.
    fn decode(tx_hash: TxHash, args: Vec<Token>) -> Result<Self, DecodeError>;
}

/// `OfferPublished(uint256 indexed offerId, string title, string content)`.
///
/// Emitted both when an offer is created and when its text is changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferPublished {
    pub hash: TxHash,
    pub offer_id: u64,
    pub title: String,
    pub content: String,
}

impl OfferPublished {
    /// Indexed-field predicates: `[offerId]`.
    pub fn topics(offer_id: Option<u64>) -> Vec<Option<Token>> {
        vec![offer_id.map(Tokenizable::into_token)]
    }
}

impl ContractEvent for OfferPublished {
    const NAME: &'static str = "OfferPublished";

    fn decode(tx_hash: TxHash, args: Vec<Token>) -> Result<Self, DecodeError> {
        let mut reader = TokenReader::new(args);
        let event = Self {
            hash: tx_hash,
            offer_id: reader.next()?,
            title: reader.next()?,
            content: reader.next()?,
        };
        reader.finish()?;
        Ok(event)
    }
}

/// `AnswerPublished(uint256 indexed offerId, address indexed publisher, string content)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPublished {
    pub hash: TxHash,
    pub offer_id: u64,
    pub publisher: Address,
    pub content: String,
}

impl AnswerPublished {
    /// Indexed-field predicates: `[offerId, publisher]`.
    pub fn topics(offer_id: Option<u64>, publisher: Option<Address>) -> Vec<Option<Token>> {
        vec![
            offer_id.map(Tokenizable::into_token),
            publisher.map(Tokenizable::into_token),
        ]
    }
}

impl ContractEvent for AnswerPublished {
    const NAME: &'static str = "AnswerPublished";

    fn decode(tx_hash: TxHash, args: Vec<Token>) -> Result<Self, DecodeError> {
        let mut reader = TokenReader::new(args);
        let event = Self {
            hash: tx_hash,
            offer_id: reader.next()?,
            publisher: reader.next()?,
            content: reader.next()?,
        };
        reader.finish()?;
        Ok(event)
    }
}

/// `OfferFinished(uint256 indexed offerId, address indexed rewarder, uint256 value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferFinished {
    pub hash: TxHash,
    pub offer_id: u64,
    pub rewarder: Address,
    pub value: U256,
}

impl OfferFinished {
    /// Indexed-field predicates: `[offerId, rewarder]`.
    pub fn topics(offer_id: Option<u64>, rewarder: Option<Address>) -> Vec<Option<Token>> {
        vec![
            offer_id.map(Tokenizable::into_token),
            rewarder.map(Tokenizable::into_token),
        ]
    }
}

impl ContractEvent for OfferFinished {
    const NAME: &'static str = "OfferFinished";

    fn decode(tx_hash: TxHash, args: Vec<Token>) -> Result<Self, DecodeError> {
        let mut reader = TokenReader::new(args);
        let event = Self {
            hash: tx_hash,
            offer_id: reader.next()?,
            rewarder: reader.next()?,
            value: reader.next()?,
        };
        reader.finish()?;
        Ok(event)
    }
}
