//! Scripted ledger for exercising client error paths.
//!
//! Unlike [`MemoryLedger`](crate::memory::MemoryLedger) there is no contract
//! behind it: every answer comes from a [`StubScript`]. Each `block_number`
//! call advances the tip by one so confirmation polling always progresses.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use offer_reward_core::{
    Address, BlockHash, CallOverrides, CallRequest, Log, LogFilter, Overrides, Receipt,
    SignedTransaction, Token, TxHash, U256,
};

use crate::error::{LedgerError, Result};
use crate::traits::Ledger;

/// Canned responses.
#[derive(Debug, Clone)]
pub struct StubScript {
    pub chain_id: u64,
    /// `Err(reason)` makes estimation revert.
    pub estimate: std::result::Result<u64, String>,
    /// Reject every submission with this reason.
    pub send_error: Option<String>,
    pub receipt_status: bool,
    /// Logs attached to every receipt. Block and tx fields are filled in.
    pub receipt_logs: Option<Vec<Log>>,
    /// Historic logs, returned in this order.
    pub logs: Vec<Log>,
    /// Read results keyed by method name.
    pub call_results: HashMap<String, Vec<Token>>,
}

impl Default for StubScript {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            estimate: Ok(50_000),
            send_error: None,
            receipt_status: true,
            receipt_logs: Some(Vec::new()),
            logs: Vec::new(),
            call_results: HashMap::new(),
        }
    }
}

#[derive(Default)]
struct StubState {
    tip: u64,
    submitted: Vec<SignedTransaction>,
    receipts: HashMap<TxHash, Receipt>,
    calls: Vec<(CallRequest, CallOverrides)>,
    estimates: Vec<Overrides>,
}

/// A ledger that replays a [`StubScript`] and records what it was sent.
pub struct StubLedger {
    script: StubScript,
    state: Mutex<StubState>,
}

impl StubLedger {
    pub fn new(script: StubScript) -> Self {
        Self {
            script,
            state: Mutex::new(StubState::default()),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, StubState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("stub state poisoned".into()))
    }

    /// Transactions accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state()
            .map(|s| s.submitted.clone())
            .unwrap_or_default()
    }

    /// Overrides each estimation was asked with.
    pub fn estimates(&self) -> Vec<Overrides> {
        self.state()
            .map(|s| s.estimates.clone())
            .unwrap_or_default()
    }

    /// Read calls received so far.
    pub fn calls(&self) -> Vec<(CallRequest, CallOverrides)> {
        self.state().map(|s| s.calls.clone()).unwrap_or_default()
    }
}

fn stub_block_hash(number: u64) -> BlockHash {
    BlockHash::digest(&number.to_be_bytes())
}

#[async_trait]
impl Ledger for StubLedger {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.script.chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        let mut state = self.state()?;
        state.tip += 1;
        Ok(state.tip)
    }

    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>> {
        let state = self.state()?;
        Ok((number <= state.tip).then(|| stub_block_hash(number)))
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(U256::one())
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64> {
        let state = self.state()?;
        Ok(state
            .submitted
            .iter()
            .filter(|tx| &tx.request.from == account)
            .count() as u64)
    }

    async fn balance(&self, _account: &Address) -> Result<U256> {
        Ok(U256::MAX)
    }

    async fn call(
        &self,
        _to: &Address,
        call: &CallRequest,
        overrides: &CallOverrides,
    ) -> Result<Vec<Token>> {
        self.state()?.calls.push((call.clone(), *overrides));
        self.script
            .call_results
            .get(&call.method)
            .cloned()
            .ok_or_else(|| {
                LedgerError::Reverted(format!("no result scripted for {}", call.method))
            })
    }

    async fn estimate_gas(
        &self,
        _from: &Address,
        _to: &Address,
        _call: &CallRequest,
        overrides: &Overrides,
    ) -> Result<u64> {
        self.state()?.estimates.push(*overrides);
        self.script.estimate.clone().map_err(LedgerError::Reverted)
    }

    async fn send_transaction(&self, tx: SignedTransaction) -> Result<TxHash> {
        if let Some(reason) = &self.script.send_error {
            return Err(LedgerError::Unavailable(reason.clone()));
        }

        let mut state = self.state()?;
        let block_number = state.tip + 1;
        let block_hash = stub_block_hash(block_number);
        let hash = tx.hash;

        let logs = self.script.receipt_logs.clone().map(|logs| {
            logs.into_iter()
                .map(|log| Log {
                    block_number,
                    block_hash,
                    tx_hash: hash,
                    ..log
                })
                .collect()
        });

        state.receipts.insert(
            hash,
            Receipt {
                tx_hash: hash,
                block_number,
                block_hash,
                from: tx.request.from,
                to: tx.request.to,
                status: self.script.receipt_status,
                gas_used: tx.request.gas_limit,
                logs,
            },
        );
        state.submitted.push(tx);
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        Ok(self.state()?.receipts.get(hash).cloned())
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        Ok(self
            .script
            .logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tip_advances_per_query() {
        let ledger = StubLedger::new(StubScript::default());
        assert_eq!(ledger.block_number().await.unwrap(), 1);
        assert_eq!(ledger.block_number().await.unwrap(), 2);
        assert!(ledger.block_hash(2).await.unwrap().is_some());
        assert!(ledger.block_hash(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scripted_estimate_error() {
        let ledger = StubLedger::new(StubScript {
            estimate: Err("nope".into()),
            ..Default::default()
        });
        let err = ledger
            .estimate_gas(
                &Address::ZERO,
                &Address::ZERO,
                &CallRequest::new("m", vec![]),
                &Overrides::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(reason) if reason == "nope"));
    }

    #[tokio::test]
    async fn test_call_records_overrides() {
        let mut call_results = HashMap::new();
        call_results.insert("waitTime".to_string(), vec![Token::uint(60u64)]);
        let ledger = StubLedger::new(StubScript {
            call_results,
            ..Default::default()
        });

        let result = ledger
            .call(
                &Address::ZERO,
                &CallRequest::new("waitTime", vec![]),
                &CallOverrides::at_block(4),
            )
            .await
            .unwrap();
        assert_eq!(result, vec![Token::uint(60u64)]);
        assert_eq!(ledger.calls()[0].1.block, Some(4));
    }
}
