//! Ledger trait: the request/response boundary to the remote ledger.
//!
//! The client is ledger-agnostic. Implementations include an in-memory
//! chain (for tests and local development) and a scripted stub.

use async_trait::async_trait;
use offer_reward_core::{
    Address, BlockHash, CallOverrides, CallRequest, Log, LogFilter, Overrides, Receipt,
    SignedTransaction, Token, TxHash, U256,
};

use crate::error::Result;

/// The Ledger trait: async primitives the client pipeline is built on.
///
/// # Design Notes
///
/// - **Read calls** never change state and may target a historic block.
/// - **Estimation** executes against the tip without committing.
/// - **Submission** returns as soon as the transaction is accepted into the
///   pending pool; inclusion is observed via [`Ledger::transaction_receipt`].
/// - **Logs** may be returned in any order; callers sort them.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Network Metadata
    // ─────────────────────────────────────────────────────────────────────────

    /// Network identifier.
    async fn chain_id(&self) -> Result<u64>;

    /// Current tip height.
    async fn block_number(&self) -> Result<u64>;

    /// Hash of the canonical block at `number`, if it exists.
    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>>;

    /// Suggested gas price.
    async fn gas_price(&self) -> Result<U256>;

    // ─────────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Next nonce for `account`, counting pending transactions.
    async fn transaction_count(&self, account: &Address) -> Result<u64>;

    /// Balance of `account` at the tip.
    async fn balance(&self, account: &Address) -> Result<U256>;

    // ─────────────────────────────────────────────────────────────────────────
    // Contract Calls
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a read method of the contract at `to`.
    async fn call(
        &self,
        to: &Address,
        call: &CallRequest,
        overrides: &CallOverrides,
    ) -> Result<Vec<Token>>;

    /// Gas a mutation from `from` would consume. Whatever `overrides` pins
    /// (value, gas price, gas limit, nonce) is checked as it would be on
    /// submission.
    async fn estimate_gas(
        &self,
        from: &Address,
        to: &Address,
        call: &CallRequest,
        overrides: &Overrides,
    ) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a signed transaction.
    async fn send_transaction(&self, tx: SignedTransaction) -> Result<TxHash>;

    /// Receipt of an included transaction, or `None` while pending/unknown.
    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Logs
    // ─────────────────────────────────────────────────────────────────────────

    /// Logs matching `filter` on the canonical chain.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>>;
}
