//! Read-side views returned by the contract.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::token::{Token, TokenReader, Tokenizable};
use crate::types::Address;

/// Summary of one offer, as returned by `getOfferData`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OfferData {
    pub value: U256,
    pub offer_block: u64,
    pub finish_time: u64,
    pub publisher: Address,
    pub finish_block: u64,
    pub answer_block_list_length: u64,
    pub answer_amount: u64,
}

impl OfferData {
    /// An offer is finished once a finish block has been recorded.
    pub fn is_finished(&self) -> bool {
        self.finish_block != 0
    }
}

impl Tokenizable for OfferData {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        let mut reader = TokenReader::from_tuple(token)?;
        let data = Self {
            value: reader.next()?,
            offer_block: reader.next()?,
            finish_time: reader.next()?,
            publisher: reader.next()?,
            finish_block: reader.next()?,
            answer_block_list_length: reader.next()?,
            answer_amount: reader.next()?,
        };
        reader.finish()?;
        Ok(data)
    }

    fn into_token(self) -> Token {
        Token::Tuple(vec![
            self.value.into_token(),
            self.offer_block.into_token(),
            self.finish_time.into_token(),
            self.publisher.into_token(),
            self.finish_block.into_token(),
            self.answer_block_list_length.into_token(),
            self.answer_amount.into_token(),
        ])
    }
}

/// Per-account statistics, as returned by `getPublisherData`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublisherData {
    pub offer_id_list_length: u64,
    pub reward_offer_id_list_length: u64,
    pub publish_offer_amount: u64,
    pub reward_offer_amount: u64,
    pub publish_answer_amount: u64,
    pub reward_answer_amount: u64,
    pub publish_offer_value: U256,
    pub reward_offer_value: U256,
    pub reward_answer_value: U256,
}

impl Tokenizable for PublisherData {
    fn from_token(token: Token) -> Result<Self, DecodeError> {
        let mut reader = TokenReader::from_tuple(token)?;
        let data = Self {
            offer_id_list_length: reader.next()?,
            reward_offer_id_list_length: reader.next()?,
            publish_offer_amount: reader.next()?,
            reward_offer_amount: reader.next()?,
            publish_answer_amount: reader.next()?,
            reward_answer_amount: reader.next()?,
            publish_offer_value: reader.next()?,
            reward_offer_value: reader.next()?,
            reward_answer_value: reader.next()?,
        };
        reader.finish()?;
        Ok(data)
    }

    fn into_token(self) -> Token {
        Token::Tuple(vec![
            self.offer_id_list_length.into_token(),
            self.reward_offer_id_list_length.into_token(),
            self.publish_offer_amount.into_token(),
            self.reward_offer_amount.into_token(),
            self.publish_answer_amount.into_token(),
            self.reward_answer_amount.into_token(),
            self.publish_offer_value.into_token(),
            self.reward_offer_value.into_token(),
            self.reward_answer_value.into_token(),
        ])
    }
}
