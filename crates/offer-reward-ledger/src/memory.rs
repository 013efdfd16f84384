//! In-memory implementation of the Ledger trait.
//!
//! A single-node chain hosting one [`Program`]. It has the same observable
//! semantics as a remote ledger (nonces, fees, receipts, logs, confirmation
//! depth) but keeps everything in memory with no persistence.
//!
//! Every block stores a snapshot of the world state after it, which serves
//! historic reads and lets [`MemoryLedger::reorg`] roll back.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use offer_reward_core::{
    Address, BlockHash, CallOverrides, CallRequest, Log, LogFilter, Overrides, Receipt,
    SignedTransaction, Token, TxHash, U256,
};
use tracing::{debug, warn};

use crate::error::{LedgerError, Result};
use crate::program::{Env, Outcome, Program};
use crate::traits::Ledger;

/// Configuration for the in-memory ledger.
#[derive(Debug, Clone)]
pub struct MemoryLedgerConfig {
    /// Network identifier reported by `chain_id`.
    pub chain_id: u64,
    /// Gas price quoted to clients.
    pub gas_price: U256,
    /// Seconds between consecutive blocks.
    pub block_time: u64,
    /// Timestamp of block 0.
    pub genesis_timestamp: u64,
    /// Mine a block as soon as a transaction is accepted.
    pub automine: bool,
}

impl Default for MemoryLedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            gas_price: U256::one(),
            block_time: 12,
            genesis_timestamp: 1_700_000_000,
            automine: true,
        }
    }
}

#[derive(Clone)]
struct WorldState<P> {
    program: P,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
}

impl<P> WorldState<P> {
    fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or(0)
    }

    fn credit(&mut self, account: Address, amount: U256) {
        let balance = self.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn debit(&mut self, account: Address, amount: U256) {
        let balance = self.balances.entry(account).or_default();
        *balance = balance.saturating_sub(amount);
    }
}

struct Block<P> {
    number: u64,
    hash: BlockHash,
    receipts: Vec<Receipt>,
    state: WorldState<P>,
}

/// Fields every transaction in a block shares.
struct BlockContext {
    number: u64,
    hash: BlockHash,
    timestamp: u64,
}

struct Chain<P> {
    /// Canonical blocks; index == block number, genesis always present.
    blocks: Vec<Block<P>>,
    pending: Vec<SignedTransaction>,
    automine: bool,
    /// Bumped on every reorg so re-mined heights get fresh hashes.
    forks: u64,
}

impl<P: Program> Chain<P> {
    fn tip(&self) -> &Block<P> {
        // genesis is never removed
        &self.blocks[self.blocks.len() - 1]
    }

    fn tip_mut(&mut self) -> &mut Block<P> {
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    fn block(&self, number: u64) -> Option<&Block<P>> {
        self.blocks.get(usize::try_from(number).ok()?)
    }

    fn pending_nonce(&self, account: &Address) -> u64 {
        let queued = self
            .pending
            .iter()
            .filter(|tx| &tx.request.from == account)
            .count() as u64;
        self.tip().state.nonce(account) + queued
    }

    fn find_receipt(&self, hash: &TxHash) -> Option<&Receipt> {
        self.blocks
            .iter()
            .rev()
            .flat_map(|b| b.receipts.iter())
            .find(|r| &r.tx_hash == hash)
    }

    fn knows(&self, hash: &TxHash) -> bool {
        self.pending.iter().any(|tx| &tx.hash == hash) || self.find_receipt(hash).is_some()
    }

    fn mine_block(&mut self, config: &MemoryLedgerConfig) {
        let (parent_number, parent_hash, mut state) = {
            let parent = self.tip();
            (parent.number, parent.hash, parent.state.clone())
        };
        let txs = std::mem::take(&mut self.pending);

        let number = parent_number + 1;
        let mut preimage = Vec::with_capacity(48 + 32 * txs.len());
        preimage.extend_from_slice(parent_hash.as_bytes());
        preimage.extend_from_slice(&number.to_be_bytes());
        preimage.extend_from_slice(&self.forks.to_be_bytes());
        for tx in &txs {
            preimage.extend_from_slice(tx.hash.as_bytes());
        }

        let ctx = BlockContext {
            number,
            hash: BlockHash::digest(&preimage),
            timestamp: config.genesis_timestamp + number * config.block_time,
        };

        let mut log_index = 0u64;
        let receipts = txs
            .iter()
            .map(|tx| apply_transaction(&mut state, tx, &ctx, &mut log_index))
            .collect::<Vec<_>>();

        debug!(
            block = number,
            transactions = receipts.len(),
            "mined block"
        );

        self.blocks.push(Block {
            number,
            hash: ctx.hash,
            receipts,
            state,
        });
    }
}

/// `gas * price`, or `None` on overflow.
fn fee(gas: u64, price: U256) -> Option<U256> {
    price.checked_mul(U256::from(gas))
}

fn total_payout(outcome: &Outcome) -> Option<U256> {
    outcome
        .transfers
        .iter()
        .try_fold(U256::zero(), |acc, (_, amount)| acc.checked_add(*amount))
}

/// Execute one transaction against `state`, always producing a receipt.
fn apply_transaction<P: Program>(
    state: &mut WorldState<P>,
    tx: &SignedTransaction,
    ctx: &BlockContext,
    log_index: &mut u64,
) -> Receipt {
    let req = &tx.request;
    *state.nonces.entry(req.from).or_insert(0) += 1;

    let mut receipt = Receipt {
        tx_hash: tx.hash,
        block_number: ctx.number,
        block_hash: ctx.hash,
        from: req.from,
        to: req.to,
        status: false,
        gas_used: 0,
        logs: Some(Vec::new()),
    };

    let upfront = fee(req.gas_limit, req.gas_price).and_then(|f| f.checked_add(req.value));
    match upfront {
        Some(required) if required <= state.balance(&req.from) => {}
        _ => {
            warn!(tx = %tx.hash, "sender can no longer cover transaction at inclusion");
            return receipt;
        }
    }

    let cost = state.program.gas_cost(&req.call.method, &req.call.args);
    if req.gas_limit < cost {
        debug!(tx = %tx.hash, limit = req.gas_limit, cost, "out of gas");
        state.debit(req.from, fee(req.gas_limit, req.gas_price).unwrap_or_default());
        receipt.gas_used = req.gas_limit;
        return receipt;
    }

    // cost <= gas_limit, so this cannot overflow where the upfront check did not
    let charged = fee(cost, req.gas_price).unwrap_or_default();
    receipt.gas_used = cost;

    let env = Env {
        contract: req.to,
        sender: req.from,
        value: req.value,
        block_number: ctx.number,
        timestamp: ctx.timestamp,
    };

    let mut program = state.program.clone();
    let outcome = match program.execute(&env, &req.call.method, &req.call.args) {
        Ok(outcome) => outcome,
        Err(revert) => {
            debug!(tx = %tx.hash, reason = %revert, "transaction reverted");
            state.debit(req.from, charged);
            return receipt;
        }
    };

    let available = state.balance(&req.to).saturating_add(req.value);
    match total_payout(&outcome) {
        Some(payout) if payout <= available => {}
        _ => {
            debug!(tx = %tx.hash, "payout exceeds contract balance");
            state.debit(req.from, charged);
            return receipt;
        }
    }

    state.program = program;
    state.debit(req.from, charged.saturating_add(req.value));
    state.credit(req.to, req.value);
    for (recipient, amount) in &outcome.transfers {
        state.debit(req.to, *amount);
        state.credit(*recipient, *amount);
    }

    let logs = outcome
        .events
        .into_iter()
        .map(|event| {
            let log = Log {
                address: req.to,
                event: event.name,
                topics: event.topics,
                args: event.args,
                block_number: ctx.number,
                block_hash: ctx.hash,
                log_index: *log_index,
                tx_hash: tx.hash,
            };
            *log_index += 1;
            log
        })
        .collect();

    receipt.status = true;
    receipt.logs = Some(logs);
    receipt
}

/// In-memory ledger hosting a single program.
///
/// All data is lost when the ledger is dropped. Thread-safe via Mutex.
pub struct MemoryLedger<P: Program> {
    config: MemoryLedgerConfig,
    contract: Address,
    chain: Mutex<Chain<P>>,
}

impl<P: Program> MemoryLedger<P> {
    /// Create a chain with `program` deployed at `contract` in genesis.
    pub fn new(config: MemoryLedgerConfig, contract: Address, program: P) -> Self {
        let mut seed = b"offer-reward/genesis".to_vec();
        seed.extend_from_slice(&config.chain_id.to_be_bytes());

        let genesis = Block {
            number: 0,
            hash: BlockHash::digest(&seed),
            receipts: Vec::new(),
            state: WorldState {
                program,
                balances: HashMap::new(),
                nonces: HashMap::new(),
            },
        };

        Self {
            chain: Mutex::new(Chain {
                blocks: vec![genesis],
                pending: Vec::new(),
                automine: config.automine,
                forks: 0,
            }),
            config,
            contract,
        }
    }

    /// Address the program is deployed at.
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    pub fn config(&self) -> &MemoryLedgerConfig {
        &self.config
    }

    fn chain(&self) -> Result<MutexGuard<'_, Chain<P>>> {
        self.chain
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger state poisoned".into()))
    }

    fn ensure_contract(&self, to: &Address) -> Result<()> {
        if to != &self.contract {
            return Err(LedgerError::NoContract(*to));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Test Controls
    // ─────────────────────────────────────────────────────────────────────────

    /// Credit `amount` to `account` at the current tip.
    pub fn fund(&self, account: Address, amount: U256) -> Result<()> {
        let mut chain = self.chain()?;
        chain.tip_mut().state.credit(account, amount);
        Ok(())
    }

    /// Mine `count` blocks, the first including every pending transaction.
    ///
    /// Returns the new tip height.
    pub fn mine(&self, count: u64) -> Result<u64> {
        let mut chain = self.chain()?;
        for _ in 0..count {
            chain.mine_block(&self.config);
        }
        Ok(chain.tip().number)
    }

    /// Drop the last `depth` blocks. Their transactions are discarded, not
    /// re-queued. Genesis is never dropped.
    ///
    /// Returns the hashes of the discarded transactions.
    pub fn reorg(&self, depth: u64) -> Result<Vec<TxHash>> {
        let mut chain = self.chain()?;
        let removable = chain.blocks.len() - 1;
        let depth = usize::try_from(depth).unwrap_or(usize::MAX).min(removable);
        let keep = chain.blocks.len() - depth;

        let dropped: Vec<TxHash> = chain
            .blocks
            .drain(keep..)
            .flat_map(|b| b.receipts.into_iter().map(|r| r.tx_hash))
            .collect();
        chain.forks += 1;

        warn!(depth, dropped = dropped.len(), "chain reorganized");
        Ok(dropped)
    }

    /// Toggle mining on submission.
    pub fn set_automine(&self, automine: bool) -> Result<()> {
        self.chain()?.automine = automine;
        Ok(())
    }

    /// Number of accepted but not yet included transactions.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.chain()?.pending.len())
    }

    /// Inspect the program state at the tip.
    pub fn with_program<R>(&self, f: impl FnOnce(&P) -> R) -> Result<R> {
        let chain = self.chain()?;
        Ok(f(&chain.tip().state.program))
    }
}

#[async_trait]
impl<P: Program> Ledger for MemoryLedger<P> {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.config.chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.chain()?.tip().number)
    }

    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>> {
        Ok(self.chain()?.block(number).map(|b| b.hash))
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(self.config.gas_price)
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64> {
        Ok(self.chain()?.pending_nonce(account))
    }

    async fn balance(&self, account: &Address) -> Result<U256> {
        Ok(self.chain()?.tip().state.balance(account))
    }

    async fn call(
        &self,
        to: &Address,
        call: &CallRequest,
        overrides: &CallOverrides,
    ) -> Result<Vec<Token>> {
        self.ensure_contract(to)?;
        let chain = self.chain()?;

        let block = match overrides.block {
            Some(number) => chain.block(number).ok_or(LedgerError::UnknownBlock(number))?,
            None => chain.tip(),
        };
        let env = Env {
            contract: *to,
            sender: overrides.from.unwrap_or(Address::ZERO),
            value: U256::zero(),
            block_number: block.number,
            timestamp: self.config.genesis_timestamp + block.number * self.config.block_time,
        };

        block
            .state
            .program
            .call(&env, &call.method, &call.args)
            .map_err(|revert| LedgerError::Reverted(revert.0))
    }

    async fn estimate_gas(
        &self,
        from: &Address,
        to: &Address,
        call: &CallRequest,
        overrides: &Overrides,
    ) -> Result<u64> {
        self.ensure_contract(to)?;
        let chain = self.chain()?;
        let tip = chain.tip();

        if let Some(nonce) = overrides.nonce {
            let expected = chain.pending_nonce(from);
            if nonce != expected {
                return Err(LedgerError::NonceMismatch {
                    expected,
                    got: nonce,
                });
            }
        }

        let value = overrides.value.unwrap_or_default();
        let cost = tip.state.program.gas_cost(&call.method, &call.args);
        // fees only count once the caller pins a price
        let required = match overrides.gas_price {
            Some(price) => fee(overrides.gas_limit.unwrap_or(cost), price)
                .and_then(|f| f.checked_add(value)),
            None => Some(value),
        };
        let balance = tip.state.balance(from);
        match required {
            Some(required) if required <= balance => {}
            required => {
                return Err(LedgerError::InsufficientFunds {
                    balance,
                    required: required.unwrap_or(U256::MAX),
                })
            }
        }

        let number = tip.number + 1;
        let env = Env {
            contract: *to,
            sender: *from,
            value,
            block_number: number,
            timestamp: self.config.genesis_timestamp + number * self.config.block_time,
        };

        let mut program = tip.state.program.clone();
        let outcome = program
            .execute(&env, &call.method, &call.args)
            .map_err(|revert| LedgerError::Reverted(revert.0))?;

        let available = tip.state.balance(to).saturating_add(value);
        match total_payout(&outcome) {
            Some(payout) if payout <= available => {}
            _ => return Err(LedgerError::Reverted("payout exceeds contract balance".into())),
        }

        Ok(cost)
    }

    async fn send_transaction(&self, tx: SignedTransaction) -> Result<TxHash> {
        tx.verify()?;

        let mut chain = self.chain()?;
        let req = &tx.request;

        if req.chain_id != self.config.chain_id {
            return Err(LedgerError::ChainIdMismatch {
                expected: self.config.chain_id,
                got: req.chain_id,
            });
        }
        self.ensure_contract(&req.to)?;

        if chain.knows(&tx.hash) {
            return Err(LedgerError::AlreadyKnown(tx.hash));
        }

        let expected = chain.pending_nonce(&req.from);
        if req.nonce != expected {
            return Err(LedgerError::NonceMismatch {
                expected,
                got: req.nonce,
            });
        }

        let balance = chain.tip().state.balance(&req.from);
        let upfront = fee(req.gas_limit, req.gas_price).and_then(|f| f.checked_add(req.value));
        match upfront {
            Some(required) if required <= balance => {}
            Some(required) => return Err(LedgerError::InsufficientFunds { balance, required }),
            None => {
                return Err(LedgerError::InsufficientFunds {
                    balance,
                    required: U256::MAX,
                })
            }
        }

        let hash = tx.hash;
        debug!(tx = %hash, method = %req.call.method, nonce = req.nonce, "transaction accepted");
        chain.pending.push(tx);

        if chain.automine {
            chain.mine_block(&self.config);
        }

        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        Ok(self.chain()?.find_receipt(hash).cloned())
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        let chain = self.chain()?;
        let tip = chain.tip().number;
        let to = filter.to_block.map_or(tip, |to| to.min(tip));

        Ok(chain
            .blocks
            .iter()
            .filter(|b| b.number >= filter.from_block && b.number <= to)
            .flat_map(|b| b.receipts.iter())
            .flat_map(|r| r.logs.iter().flatten())
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }
}
