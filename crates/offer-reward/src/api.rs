//! The caller-facing contract interface.

use async_trait::async_trait;
use offer_reward_core::{
    Address, AnswerPublished, CallOverrides, OfferData, OfferFinished, OfferPublished,
    PublisherData, Token, Tokenizable, U256,
};

use crate::connection::ConnectionHandle;
use crate::error::Result;
use crate::operation::Operation;
use crate::pipeline::{MutationCall, MutationRequest};
use crate::query::BlockRange;

/// Capability interface of the OfferReward contract.
///
/// Reads return decoded values. Mutations return an unsent [`MutationCall`];
/// attach [`Overrides`](offer_reward_core::Overrides) (e.g. the offer value
/// for `publish_offer`), then `execute` it or `send` and `confirm` it.
#[async_trait]
pub trait OfferReward: Send + Sync {
    /// The bound contract address.
    fn address(&self) -> Result<Address>;

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Seconds an offer stays open after its finish time before anyone may
    /// finish it.
    async fn wait_time(&self, overrides: CallOverrides) -> Result<u64>;

    /// Minimum seconds between publishing and the finish time.
    async fn min_finish_time(&self, overrides: CallOverrides) -> Result<u64>;

    /// Fee taken from rewards, in thousandths.
    async fn fee_rate(&self, overrides: CallOverrides) -> Result<u64>;

    /// Recipient of fees.
    async fn fee_address(&self, overrides: CallOverrides) -> Result<Address>;

    async fn min_offer_value(&self, overrides: CallOverrides) -> Result<U256>;

    /// Value an answer must carry.
    async fn answer_fee(&self, overrides: CallOverrides) -> Result<U256>;

    async fn block_skip(&self, overrides: CallOverrides) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of offers ever published.
    async fn offer_length(&self, overrides: CallOverrides) -> Result<u64>;

    async fn offer_data(&self, offer_id: u64, overrides: CallOverrides) -> Result<OfferData>;

    async fn publisher_data(
        &self,
        publisher: Address,
        overrides: CallOverrides,
    ) -> Result<PublisherData>;

    /// One entry per id, in input order.
    async fn offer_data_list(
        &self,
        offer_ids: &[u64],
        overrides: CallOverrides,
    ) -> Result<Vec<OfferData>>;

    /// One entry per publisher, in input order.
    async fn publisher_data_list(
        &self,
        publishers: &[Address],
        overrides: CallOverrides,
    ) -> Result<Vec<PublisherData>>;

    /// Blocks in which answers to `offer_id` were published.
    async fn answer_block_list_by_offer(
        &self,
        offer_id: u64,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>>;

    /// Offers published by `publisher`.
    async fn offer_id_list_by_publisher(
        &self,
        publisher: Address,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>>;

    /// Offers in which `publisher` was rewarded.
    async fn reward_offer_id_list_by_publisher(
        &self,
        publisher: Address,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish an offer. The attached value is the reward.
    fn publish_offer(
        &self,
        title: &str,
        content: &str,
        finish_time: u64,
    ) -> MutationCall<OfferPublished>;

    /// Answer an open offer. Must carry the answer fee.
    fn publish_answer(&self, offer_id: u64, content: &str) -> MutationCall<AnswerPublished>;

    /// Close an offer, paying its value to `rewarder`.
    fn finish_offer(&self, offer_id: u64, rewarder: Address) -> MutationCall<OfferFinished>;

    /// Replace an offer's text. Emits a fresh `OfferPublished`.
    fn change_offer_data(
        &self,
        offer_id: u64,
        title: &str,
        content: &str,
    ) -> MutationCall<OfferPublished>;

    /// Add the attached value to an offer and move its finish time.
    fn change_offer_value(&self, offer_id: u64, finish_time: u64) -> MutationCall<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    async fn offer_published_event(
        &self,
        offer_id: Option<u64>,
        range: BlockRange,
    ) -> Result<OfferPublished>;

    async fn offer_published_events(
        &self,
        offer_id: Option<u64>,
        range: BlockRange,
    ) -> Result<Vec<OfferPublished>>;

    async fn answer_published_events(
        &self,
        offer_id: Option<u64>,
        publisher: Option<Address>,
        range: BlockRange,
    ) -> Result<Vec<AnswerPublished>>;

    async fn offer_finished_event(
        &self,
        offer_id: Option<u64>,
        rewarder: Option<Address>,
        range: BlockRange,
    ) -> Result<OfferFinished>;

    async fn offer_finished_events(
        &self,
        offer_id: Option<u64>,
        rewarder: Option<Address>,
        range: BlockRange,
    ) -> Result<Vec<OfferFinished>>;
}

impl ConnectionHandle {
    fn mutation<E>(&self, operation: Operation, args: Vec<Token>) -> MutationCall<E>
    where
        E: crate::pipeline::Expected,
    {
        MutationCall::new(self.bound().cloned(), MutationRequest::new(operation, args))
    }
}

#[async_trait]
impl OfferReward for ConnectionHandle {
    fn address(&self) -> Result<Address> {
        ConnectionHandle::address(self)
    }

    async fn wait_time(&self, overrides: CallOverrides) -> Result<u64> {
        self.query(Operation::WaitTime, vec![], overrides).await
    }

    async fn min_finish_time(&self, overrides: CallOverrides) -> Result<u64> {
        self.query(Operation::MinFinishTime, vec![], overrides)
            .await
    }

    async fn fee_rate(&self, overrides: CallOverrides) -> Result<u64> {
        self.query(Operation::FeeRate, vec![], overrides).await
    }

    async fn fee_address(&self, overrides: CallOverrides) -> Result<Address> {
        self.query(Operation::FeeAddress, vec![], overrides).await
    }

    async fn min_offer_value(&self, overrides: CallOverrides) -> Result<U256> {
        self.query(Operation::MinOfferValue, vec![], overrides)
            .await
    }

    async fn answer_fee(&self, overrides: CallOverrides) -> Result<U256> {
        self.query(Operation::AnswerFee, vec![], overrides).await
    }

    async fn block_skip(&self, overrides: CallOverrides) -> Result<u64> {
        self.query(Operation::BlockSkip, vec![], overrides).await
    }

    async fn offer_length(&self, overrides: CallOverrides) -> Result<u64> {
        self.query(Operation::OfferLength, vec![], overrides).await
    }

    async fn offer_data(&self, offer_id: u64, overrides: CallOverrides) -> Result<OfferData> {
        self.query(Operation::OfferData, vec![offer_id.into_token()], overrides)
            .await
    }

    async fn publisher_data(
        &self,
        publisher: Address,
        overrides: CallOverrides,
    ) -> Result<PublisherData> {
        self.query(Operation::PublisherData, vec![publisher.into_token()], overrides)
            .await
    }

    async fn offer_data_list(
        &self,
        offer_ids: &[u64],
        overrides: CallOverrides,
    ) -> Result<Vec<OfferData>> {
        self.query_batch(Operation::OfferDataList, offer_ids.to_vec(), overrides)
            .await
    }

    async fn publisher_data_list(
        &self,
        publishers: &[Address],
        overrides: CallOverrides,
    ) -> Result<Vec<PublisherData>> {
        self.query_batch(Operation::PublisherDataList, publishers.to_vec(), overrides)
            .await
    }

    async fn answer_block_list_by_offer(
        &self,
        offer_id: u64,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>> {
        self.list_ids(
            Operation::AnswerBlockListByOffer,
            offer_id.into_token(),
            start,
            length,
            overrides,
        )
        .await
    }

    async fn offer_id_list_by_publisher(
        &self,
        publisher: Address,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>> {
        self.list_ids(
            Operation::OfferIdListByPublisher,
            publisher.into_token(),
            start,
            length,
            overrides,
        )
        .await
    }

    async fn reward_offer_id_list_by_publisher(
        &self,
        publisher: Address,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>> {
        self.list_ids(
            Operation::RewardOfferIdListByPublisher,
            publisher.into_token(),
            start,
            length,
            overrides,
        )
        .await
    }

    fn publish_offer(
        &self,
        title: &str,
        content: &str,
        finish_time: u64,
    ) -> MutationCall<OfferPublished> {
        self.mutation(
            Operation::PublishOffer,
            vec![
                Token::string(title),
                Token::string(content),
                finish_time.into_token(),
            ],
        )
    }

    fn publish_answer(&self, offer_id: u64, content: &str) -> MutationCall<AnswerPublished> {
        self.mutation(
            Operation::PublishAnswer,
            vec![offer_id.into_token(), Token::string(content)],
        )
    }

    fn finish_offer(&self, offer_id: u64, rewarder: Address) -> MutationCall<OfferFinished> {
        self.mutation(
            Operation::FinishOffer,
            vec![offer_id.into_token(), rewarder.into_token()],
        )
    }

    fn change_offer_data(
        &self,
        offer_id: u64,
        title: &str,
        content: &str,
    ) -> MutationCall<OfferPublished> {
        self.mutation(
            Operation::ChangeOfferData,
            vec![
                offer_id.into_token(),
                Token::string(title),
                Token::string(content),
            ],
        )
    }

    fn change_offer_value(&self, offer_id: u64, finish_time: u64) -> MutationCall<()> {
        self.mutation(
            Operation::ChangeOfferValue,
            vec![offer_id.into_token(), finish_time.into_token()],
        )
    }

    async fn offer_published_event(
        &self,
        offer_id: Option<u64>,
        range: BlockRange,
    ) -> Result<OfferPublished> {
        self.query_event(OfferPublished::topics(offer_id), range)
            .await
    }

    async fn offer_published_events(
        &self,
        offer_id: Option<u64>,
        range: BlockRange,
    ) -> Result<Vec<OfferPublished>> {
        self.query_events(OfferPublished::topics(offer_id), range)
            .await
    }

    async fn answer_published_events(
        &self,
        offer_id: Option<u64>,
        publisher: Option<Address>,
        range: BlockRange,
    ) -> Result<Vec<AnswerPublished>> {
        self.query_events(AnswerPublished::topics(offer_id, publisher), range)
            .await
    }

    async fn offer_finished_event(
        &self,
        offer_id: Option<u64>,
        rewarder: Option<Address>,
        range: BlockRange,
    ) -> Result<OfferFinished> {
        self.query_event(OfferFinished::topics(offer_id, rewarder), range)
            .await
    }

    async fn offer_finished_events(
        &self,
        offer_id: Option<u64>,
        rewarder: Option<Address>,
        range: BlockRange,
    ) -> Result<Vec<OfferFinished>> {
        self.query_events(OfferFinished::topics(offer_id, rewarder), range)
            .await
    }
}
