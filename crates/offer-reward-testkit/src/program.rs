//! An executable OfferReward contract for the in-memory ledger.
//!
//! Implements the contract's observable interface closely enough to drive
//! the client end to end: configuration getters, offer and publisher
//! records, paginated id lists, value transfers and the three events.

use std::collections::HashMap;

use offer_reward_core::{Address, OfferData, PublisherData, Token, TokenReader, Tokenizable, U256};
use offer_reward_ledger::{EmittedEvent, Env, Outcome, Program, Revert};

/// Contract parameters, fixed at deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    pub wait_time: u64,
    pub min_finish_time: u64,
    /// Per mille of the offer value kept as fee.
    pub fee_rate: u64,
    pub fee_address: Address,
    pub min_offer_value: U256,
    pub answer_fee: U256,
    pub block_skip: u64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            wait_time: 7 * 24 * 3600,
            min_finish_time: 3600,
            fee_rate: 20,
            fee_address: Address::from_bytes([0xfe; 20]),
            min_offer_value: U256::from(1_000u64),
            answer_fee: U256::zero(),
            block_skip: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Offer {
    data: OfferData,
    answer_blocks: Vec<u64>,
    answerers: Vec<Address>,
}

#[derive(Debug, Clone, Default)]
struct Publisher {
    data: PublisherData,
    offer_ids: Vec<u64>,
    reward_offer_ids: Vec<u64>,
}

/// The OfferReward contract.
#[derive(Debug, Clone, Default)]
pub struct OfferRewardProgram {
    config: ProgramConfig,
    offers: Vec<Offer>,
    publishers: HashMap<Address, Publisher>,
}

/// Ids `[start, start + length)` of `list`, clamped to its bounds.
fn page(list: &[u64], start: u64, length: u64) -> Vec<u64> {
    let len = list.len() as u64;
    let from = start.min(len);
    let to = start.saturating_add(length).min(len);
    list[from as usize..to as usize].to_vec()
}

fn args(args: &[Token]) -> TokenReader {
    TokenReader::new(args.to_vec())
}

fn bad_args(err: offer_reward_core::DecodeError) -> Revert {
    Revert::new(format!("bad arguments: {err}"))
}

fn event(name: &str, topics: Vec<Token>, args: Vec<Token>) -> EmittedEvent {
    EmittedEvent {
        name: name.to_string(),
        topics,
        args,
    }
}

impl OfferRewardProgram {
    pub fn new(config: ProgramConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn offer_count(&self) -> usize {
        self.offers.len()
    }

    fn offer_data(&self, offer_id: u64) -> OfferData {
        self.offers
            .get(offer_id as usize)
            .map(|offer| offer.data.clone())
            .unwrap_or_default()
    }

    fn publisher_data(&self, publisher: &Address) -> PublisherData {
        self.publishers
            .get(publisher)
            .map(|p| p.data.clone())
            .unwrap_or_default()
    }

    /// An existing, unfinished offer.
    fn open_offer(&mut self, offer_id: u64) -> Result<&mut Offer, Revert> {
        let offer = self
            .offers
            .get_mut(offer_id as usize)
            .ok_or_else(|| Revert::new("offer does not exist"))?;
        if offer.data.is_finished() {
            return Err(Revert::new("offer is finished"));
        }
        Ok(offer)
    }

    /// An open offer `sender` published.
    fn own_offer(&mut self, offer_id: u64, sender: &Address) -> Result<&mut Offer, Revert> {
        let offer = self.open_offer(offer_id)?;
        if &offer.data.publisher != sender {
            return Err(Revert::new("not the publisher"));
        }
        Ok(offer)
    }

    fn publish_offer(&mut self, env: &Env, tokens: &[Token]) -> Result<Outcome, Revert> {
        let mut reader = args(tokens);
        let title: String = reader.next().map_err(bad_args)?;
        let content: String = reader.next().map_err(bad_args)?;
        let finish_time: u64 = reader.next().map_err(bad_args)?;
        reader.finish().map_err(bad_args)?;

        if env.value < self.config.min_offer_value {
            return Err(Revert::new("offer value too low"));
        }
        if finish_time < env.timestamp.saturating_add(self.config.min_finish_time) {
            return Err(Revert::new("finish time too early"));
        }

        let offer_id = self.offers.len() as u64;
        self.offers.push(Offer {
            data: OfferData {
                value: env.value,
                offer_block: env.block_number,
                finish_time,
                publisher: env.sender,
                ..Default::default()
            },
            ..Default::default()
        });

        let publisher = self.publishers.entry(env.sender).or_default();
        publisher.offer_ids.push(offer_id);
        publisher.data.offer_id_list_length += 1;
        publisher.data.publish_offer_amount += 1;
        publisher.data.publish_offer_value += env.value;

        Ok(Outcome {
            events: vec![event(
                "OfferPublished",
                vec![offer_id.into_token()],
                vec![
                    offer_id.into_token(),
                    Token::String(title),
                    Token::String(content),
                ],
            )],
            transfers: vec![],
        })
    }

    fn publish_answer(&mut self, env: &Env, tokens: &[Token]) -> Result<Outcome, Revert> {
        let mut reader = args(tokens);
        let offer_id: u64 = reader.next().map_err(bad_args)?;
        let content: String = reader.next().map_err(bad_args)?;
        reader.finish().map_err(bad_args)?;

        if env.value < self.config.answer_fee {
            return Err(Revert::new("answer fee not paid"));
        }

        let offer = self.open_offer(offer_id)?;
        if offer.answer_blocks.last() != Some(&env.block_number) {
            offer.answer_blocks.push(env.block_number);
            offer.data.answer_block_list_length += 1;
        }
        if !offer.answerers.contains(&env.sender) {
            offer.answerers.push(env.sender);
        }
        offer.data.answer_amount += 1;

        self.publishers
            .entry(env.sender)
            .or_default()
            .data
            .publish_answer_amount += 1;

        let mut transfers = vec![];
        if !env.value.is_zero() {
            transfers.push((self.config.fee_address, env.value));
        }

        Ok(Outcome {
            events: vec![event(
                "AnswerPublished",
                vec![offer_id.into_token(), env.sender.into_token()],
                vec![
                    offer_id.into_token(),
                    env.sender.into_token(),
                    Token::String(content),
                ],
            )],
            transfers,
        })
    }

    fn finish_offer(&mut self, env: &Env, tokens: &[Token]) -> Result<Outcome, Revert> {
        let mut reader = args(tokens);
        let offer_id: u64 = reader.next().map_err(bad_args)?;
        let rewarder: Address = reader.next().map_err(bad_args)?;
        reader.finish().map_err(bad_args)?;

        let fee_rate = self.config.fee_rate;
        let fee_address = self.config.fee_address;

        let offer = self.own_offer(offer_id, &env.sender)?;
        if rewarder != offer.data.publisher && !offer.answerers.contains(&rewarder) {
            return Err(Revert::new("rewarder did not answer"));
        }
        offer.data.finish_block = env.block_number;
        let value = offer.data.value;
        let publisher = offer.data.publisher;

        let fee = value.saturating_mul(U256::from(fee_rate)) / U256::from(1_000u64);
        let reward = value.saturating_sub(fee);

        if rewarder != publisher {
            let publisher = self.publishers.entry(publisher).or_default();
            publisher.data.reward_offer_amount += 1;
            publisher.data.reward_offer_value += value;

            let answerer = self.publishers.entry(rewarder).or_default();
            answerer.reward_offer_ids.push(offer_id);
            answerer.data.reward_offer_id_list_length += 1;
            answerer.data.reward_answer_amount += 1;
            answerer.data.reward_answer_value += reward;
        }

        let transfers = [(rewarder, reward), (fee_address, fee)]
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .collect();

        Ok(Outcome {
            events: vec![event(
                "OfferFinished",
                vec![offer_id.into_token(), rewarder.into_token()],
                vec![
                    offer_id.into_token(),
                    rewarder.into_token(),
                    value.into_token(),
                ],
            )],
            transfers,
        })
    }

    fn change_offer_data(&mut self, env: &Env, tokens: &[Token]) -> Result<Outcome, Revert> {
        let mut reader = args(tokens);
        let offer_id: u64 = reader.next().map_err(bad_args)?;
        let title: String = reader.next().map_err(bad_args)?;
        let content: String = reader.next().map_err(bad_args)?;
        reader.finish().map_err(bad_args)?;

        self.own_offer(offer_id, &env.sender)?;

        Ok(Outcome {
            events: vec![event(
                "OfferPublished",
                vec![offer_id.into_token()],
                vec![
                    offer_id.into_token(),
                    Token::String(title),
                    Token::String(content),
                ],
            )],
            transfers: vec![],
        })
    }

    fn change_offer_value(&mut self, env: &Env, tokens: &[Token]) -> Result<Outcome, Revert> {
        let mut reader = args(tokens);
        let offer_id: u64 = reader.next().map_err(bad_args)?;
        let finish_time: u64 = reader.next().map_err(bad_args)?;
        reader.finish().map_err(bad_args)?;

        let offer = self.own_offer(offer_id, &env.sender)?;
        if finish_time < offer.data.finish_time {
            return Err(Revert::new("finish time cannot move earlier"));
        }
        offer.data.finish_time = finish_time;
        offer.data.value += env.value;

        self.publishers
            .entry(env.sender)
            .or_default()
            .data
            .publish_offer_value += env.value;

        Ok(Outcome::default())
    }
}

impl Program for OfferRewardProgram {
    fn call(&self, _env: &Env, method: &str, tokens: &[Token]) -> Result<Vec<Token>, Revert> {
        let value = match method {
            "waitTime" => self.config.wait_time.into_token(),
            "minFinishTime" => self.config.min_finish_time.into_token(),
            "feeRate" => self.config.fee_rate.into_token(),
            "feeAddress" => self.config.fee_address.into_token(),
            "minOfferValue" => self.config.min_offer_value.into_token(),
            "answerFee" => self.config.answer_fee.into_token(),
            "blockSkip" => self.config.block_skip.into_token(),
            "offerLength" => (self.offers.len() as u64).into_token(),
            "getOfferData" => {
                let mut reader = args(tokens);
                let offer_id: u64 = reader.next().map_err(bad_args)?;
                reader.finish().map_err(bad_args)?;
                self.offer_data(offer_id).into_token()
            }
            "getPublisherData" => {
                let mut reader = args(tokens);
                let publisher: Address = reader.next().map_err(bad_args)?;
                reader.finish().map_err(bad_args)?;
                self.publisher_data(&publisher).into_token()
            }
            "getOfferDataList" => {
                let mut reader = args(tokens);
                let ids: Vec<u64> = reader.next().map_err(bad_args)?;
                reader.finish().map_err(bad_args)?;
                ids.into_iter()
                    .map(|id| self.offer_data(id))
                    .collect::<Vec<_>>()
                    .into_token()
            }
            "getPublisherDataList" => {
                let mut reader = args(tokens);
                let publishers: Vec<Address> = reader.next().map_err(bad_args)?;
                reader.finish().map_err(bad_args)?;
                publishers
                    .iter()
                    .map(|p| self.publisher_data(p))
                    .collect::<Vec<_>>()
                    .into_token()
            }
            "getAnswerBlockListByOffer" => {
                let mut reader = args(tokens);
                let offer_id: u64 = reader.next().map_err(bad_args)?;
                let start: u64 = reader.next().map_err(bad_args)?;
                let length: u64 = reader.next().map_err(bad_args)?;
                reader.finish().map_err(bad_args)?;
                let blocks = self
                    .offers
                    .get(offer_id as usize)
                    .map(|o| page(&o.answer_blocks, start, length))
                    .unwrap_or_default();
                blocks.into_token()
            }
            "getOfferIdListByPublisher" | "getRewardOfferIdListByPublisher" => {
                let mut reader = args(tokens);
                let publisher: Address = reader.next().map_err(bad_args)?;
                let start: u64 = reader.next().map_err(bad_args)?;
                let length: u64 = reader.next().map_err(bad_args)?;
                reader.finish().map_err(bad_args)?;
                let ids = self
                    .publishers
                    .get(&publisher)
                    .map(|p| {
                        if method == "getOfferIdListByPublisher" {
                            page(&p.offer_ids, start, length)
                        } else {
                            page(&p.reward_offer_ids, start, length)
                        }
                    })
                    .unwrap_or_default();
                ids.into_token()
            }
            other => return Err(Revert::new(format!("unknown read method {other}"))),
        };
        Ok(vec![value])
    }

    fn execute(&mut self, env: &Env, method: &str, tokens: &[Token]) -> Result<Outcome, Revert> {
        match method {
            "publishOffer" => self.publish_offer(env, tokens),
            "publishAnswer" => self.publish_answer(env, tokens),
            "finishOffer" => self.finish_offer(env, tokens),
            "changeOfferData" => self.change_offer_data(env, tokens),
            "changeOfferValue" => self.change_offer_value(env, tokens),
            other => Err(Revert::new(format!("unknown mutation {other}"))),
        }
    }
}
