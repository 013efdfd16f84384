//! What the ledger reports back: receipts, logs and log filters.

use serde::{Deserialize, Serialize};

use crate::token::Token;
use crate::types::{Address, BlockHash, TxHash};

/// One emitted event, as recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract that emitted the event.
    pub address: Address,
    /// Event name.
    pub event: String,
    /// Values of the event's indexed fields, in declaration order.
    pub topics: Vec<Token>,
    /// All positional arguments, indexed ones included.
    pub args: Vec<Token>,
    pub block_number: u64,
    pub block_hash: BlockHash,
    /// Position of the log within its block.
    pub log_index: u64,
    pub tx_hash: TxHash,
}

impl Log {
    /// Ledger order key: block number, then position within the block.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}

/// The finalized outcome of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub block_hash: BlockHash,
    pub from: Address,
    pub to: Address,
    /// `false` when the transaction was included but failed.
    pub status: bool,
    pub gas_used: u64,
    /// Emitted events. `None` when the ledger reported no event list at all.
    pub logs: Option<Vec<Log>>,
}

impl Receipt {
    /// Blocks built on top of the including block at chain tip `tip`.
    pub fn confirmations(&self, tip: u64) -> u64 {
        tip.saturating_sub(self.block_number)
    }

    /// Logs named `event` emitted by `contract`.
    pub fn logs_named<'a>(
        &'a self,
        contract: &'a Address,
        event: &'a str,
    ) -> impl Iterator<Item = &'a Log> + 'a {
        self.logs
            .iter()
            .flatten()
            .filter(move |log| &log.address == contract && log.event == event)
    }
}

/// Historical log query.
///
/// A `None` predicate matches any value at that indexed position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub address: Option<Address>,
    pub event: Option<String>,
    pub topics: Vec<Option<Token>>,
    pub from_block: u64,
    /// Inclusive upper bound; `None` means the current tip.
    pub to_block: Option<u64>,
}

impl LogFilter {
    pub fn new(address: Address, event: impl Into<String>) -> Self {
        Self {
            address: Some(address),
            event: Some(event.into()),
            ..Default::default()
        }
    }

    pub fn topics(mut self, topics: Vec<Option<Token>>) -> Self {
        self.topics = topics;
        self
    }

    pub fn range(mut self, from_block: u64, to_block: u64) -> Self {
        self.from_block = from_block;
        self.to_block = Some(to_block);
        self
    }

    /// Whether `log` satisfies every predicate of this filter.
    pub fn matches(&self, log: &Log) -> bool {
        if self.address.as_ref().is_some_and(|a| a != &log.address) {
            return false;
        }
        if self.event.as_deref().is_some_and(|e| e != log.event) {
            return false;
        }
        if log.block_number < self.from_block {
            return false;
        }
        if self.to_block.is_some_and(|to| log.block_number > to) {
            return false;
        }
        self.topics.iter().enumerate().all(|(i, wanted)| match wanted {
            None => true,
            Some(value) => log.topics.get(i) == Some(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(block_number: u64, offer_id: u64) -> Log {
        Log {
            address: Address::from_bytes([0xaa; 20]),
            event: "OfferPublished".into(),
            topics: vec![Token::uint(offer_id)],
            args: vec![Token::uint(offer_id), Token::string("t"), Token::string("c")],
            block_number,
            block_hash: BlockHash::ZERO,
            log_index: 0,
            tx_hash: TxHash::ZERO,
        }
    }

    #[test]
    fn test_confirmations_count_blocks_beyond_inclusion() {
        let receipt = Receipt {
            tx_hash: TxHash::ZERO,
            block_number: 10,
            block_hash: BlockHash::ZERO,
            from: Address::ZERO,
            to: Address::ZERO,
            status: true,
            gas_used: 0,
            logs: None,
        };
        assert_eq!(receipt.confirmations(9), 0);
        assert_eq!(receipt.confirmations(10), 0);
        assert_eq!(receipt.confirmations(11), 1);
        assert_eq!(receipt.confirmations(13), 3);
    }

    #[test]
    fn test_filter_matches_topics_and_range() {
        let contract = Address::from_bytes([0xaa; 20]);
        let filter = LogFilter::new(contract, "OfferPublished")
            .topics(vec![Some(Token::uint(1u64))])
            .range(5, 10);

        assert!(filter.matches(&log(5, 1)));
        assert!(filter.matches(&log(10, 1)));
        assert!(!filter.matches(&log(11, 1)));
        assert!(!filter.matches(&log(4, 1)));
        assert!(!filter.matches(&log(7, 2)));
    }

    #[test]
    fn test_filter_absent_predicate_matches_any() {
        let contract = Address::from_bytes([0xaa; 20]);
        let filter = LogFilter::new(contract, "OfferPublished").topics(vec![None]);
        assert!(filter.matches(&log(1, 1)));
        assert!(filter.matches(&log(1, 2)));
    }

    #[test]
    fn test_filter_other_contract_excluded() {
        let filter = LogFilter::new(Address::from_bytes([0xbb; 20]), "OfferPublished");
        assert!(!filter.matches(&log(1, 1)));
    }
}
