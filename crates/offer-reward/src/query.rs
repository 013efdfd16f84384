//! The query layer: direct, batched and paginated reads, plus historical
//! event scans.

use offer_reward_core::{
    CallOverrides, CallRequest, ContractEvent, DecodeError, LogFilter, Token, Tokenizable,
};
use tracing::{debug, warn};

use crate::connection::{ConnectionHandle, Contract};
use crate::error::{ClientError, Result};
use crate::operation::{ContractVersion, Operation};

/// Inclusive block range of an event scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }
}

impl ConnectionHandle {
    fn read_contract(&self, operation: Operation) -> Result<&Contract> {
        self.contract(ContractVersion::LATEST.method(operation))
    }

    async fn call_raw(
        &self,
        operation: Operation,
        args: Vec<Token>,
        overrides: CallOverrides,
    ) -> Result<(&'static str, Vec<Token>)> {
        debug_assert!(!operation.is_mutation(), "{operation} changes state");
        let contract = self.read_contract(operation)?;
        let method = contract.method(operation);
        let ledger = contract.ledger()?;

        let tokens = ledger
            .call(
                &contract.address(),
                &CallRequest::new(method, args),
                &contract.call_overrides(overrides),
            )
            .await
            .map_err(|source| ClientError::Ledger {
                operation: method,
                source,
            })?;
        Ok((method, tokens))
    }

    /// Invoke a read method and decode its single return value.
    pub async fn query<T: Tokenizable>(
        &self,
        operation: Operation,
        args: Vec<Token>,
        overrides: CallOverrides,
    ) -> Result<T> {
        let (method, tokens) = self.call_raw(operation, args, overrides).await?;
        offer_reward_core::decode_single(tokens)
            .map_err(|source| ClientError::Decode { operation: method, source })
    }

    /// Invoke a list-taking read method. The result has one entry per input,
    /// in input order.
    pub async fn query_batch<I, T>(
        &self,
        operation: Operation,
        inputs: Vec<I>,
        overrides: CallOverrides,
    ) -> Result<Vec<T>>
    where
        I: Tokenizable + Send,
        T: Tokenizable,
    {
        let expected = inputs.len();
        let (method, tokens) = self
            .call_raw(operation, vec![inputs.into_token()], overrides)
            .await?;
        let decode = |source| ClientError::Decode { operation: method, source };

        let results: Vec<T> = offer_reward_core::decode_single(tokens).map_err(decode)?;
        if results.len() != expected {
            return Err(decode(DecodeError::LengthMismatch {
                expected,
                found: results.len(),
            }));
        }
        Ok(results)
    }

    /// Invoke a paginated id-list read: `length` ids of `owner`'s list
    /// starting at zero-based `start`. Short or empty past the end.
    pub async fn list_ids(
        &self,
        operation: Operation,
        owner: Token,
        start: u64,
        length: u64,
        overrides: CallOverrides,
    ) -> Result<Vec<u64>> {
        let args = vec![owner, start.into_token(), length.into_token()];
        let mut ids: Vec<u64> = self.query(operation, args, overrides).await?;

        let bound = usize::try_from(length).unwrap_or(usize::MAX);
        if ids.len() > bound {
            debug!(%operation, returned = ids.len(), length, "truncating oversized page");
            ids.truncate(bound);
        }
        Ok(ids)
    }

    /// Every `E` the contract emitted in `range` whose indexed fields match
    /// `topics`, ordered by block number then log index.
    pub async fn query_events<E: ContractEvent>(
        &self,
        topics: Vec<Option<Token>>,
        range: BlockRange,
    ) -> Result<Vec<E>> {
        let contract = self.contract(E::NAME)?;
        let ledger = contract.ledger()?;
        let filter = LogFilter::new(contract.address(), E::NAME)
            .topics(topics)
            .range(range.from, range.to);

        let mut logs = ledger
            .get_logs(&filter)
            .await
            .map_err(|source| ClientError::Ledger {
                operation: E::NAME,
                source,
            })?;
        logs.sort_by_key(|log| log.position());

        logs.into_iter()
            .map(|log| {
                E::decode(log.tx_hash, log.args).map_err(|source| ClientError::Decode {
                    operation: E::NAME,
                    source,
                })
            })
            .collect()
    }

    /// The first `E` in ledger order matching `topics` in `range`.
    pub async fn query_event<E: ContractEvent>(
        &self,
        topics: Vec<Option<Token>>,
        range: BlockRange,
    ) -> Result<E> {
        let events = self.query_events::<E>(topics, range).await?;
        if events.len() > 1 {
            warn!(
                event = E::NAME,
                matches = events.len(),
                from = range.from,
                to = range.to,
                "several events match a single-result query, using the first"
            );
        }
        events.into_iter().next().ok_or(ClientError::EventNotFound {
            event: E::NAME,
            from: range.from,
            to: range.to,
        })
    }
}
