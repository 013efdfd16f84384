//! The mutation pipeline.
//!
//! Every state-changing call runs the same sequence:
//!
//! 1. Estimate gas for the call from the signer's address, under the
//!    caller's overrides
//! 2. Apply a 30% safety margin, then layer the caller's overrides on top
//! 3. Sign and submit ([`MutationCall::send`] returns here)
//! 4. Poll until the configured number of blocks sits on top of the
//!    including block
//! 5. Extract exactly one expected event from the receipt
//!    ([`PendingMutation::confirm`] returns here)
//!
//! Failures before inclusion surface as `TransactionRejected`, failures
//! after as `TransactionFailed`. Nothing is retried.

use std::marker::PhantomData;

use offer_reward_core::{
    Address, AnswerPublished, BlockHash, CallRequest, ContractEvent, OfferFinished,
    OfferPublished, Overrides, Receipt, SignedTransaction, Token, TransactionRequest, TxHash,
};
use offer_reward_ledger::LedgerError;
use tracing::{debug, info};

use crate::connection::Contract;
use crate::error::{ClientError, FailureReason, Result};
use crate::operation::{ContractVersion, Operation};

/// Gas limit derived from an estimate: `estimated * 13 / 10`, truncating.
pub fn gas_margin(estimated: u64) -> u64 {
    let adjusted = u128::from(estimated) * 13 / 10;
    u64::try_from(adjusted).unwrap_or(u64::MAX)
}

/// An operation, its ordered arguments and caller overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    pub operation: Operation,
    pub args: Vec<Token>,
    pub overrides: Overrides,
}

impl MutationRequest {
    pub fn new(operation: Operation, args: Vec<Token>) -> Self {
        debug_assert!(operation.is_mutation(), "{operation} is a read");
        Self {
            operation,
            args,
            overrides: Overrides::default(),
        }
    }
}

/// What a mutation yields once confirmed.
///
/// Implemented for every event a mutation can emit, and for `()` for
/// mutations that emit nothing the caller needs.
pub trait Expected: Sized + Send + 'static {
    fn from_receipt(
        receipt: &Receipt,
        contract: &Address,
        operation: &'static str,
    ) -> Result<Self>;
}

impl Expected for () {
    fn from_receipt(_: &Receipt, _: &Address, _: &'static str) -> Result<Self> {
        Ok(())
    }
}

macro_rules! expected_event {
    ($($event:ty),* $(,)?) => {
        $(
            impl Expected for $event {
                fn from_receipt(
                    receipt: &Receipt,
                    contract: &Address,
                    operation: &'static str,
                ) -> Result<Self> {
                    extract_event(receipt, contract, operation)
                }
            }
        )*
    };
}

expected_event!(OfferPublished, AnswerPublished, OfferFinished);

/// Project the single `E` log `contract` emitted in `receipt`.
///
/// A receipt without a log list counts as zero matches.
pub fn extract_event<E: ContractEvent>(
    receipt: &Receipt,
    contract: &Address,
    operation: &'static str,
) -> Result<E> {
    let mut matches = receipt.logs_named(contract, E::NAME);

    let log = matches.next().ok_or(ClientError::MissingExpectedEvent {
        operation,
        event: E::NAME,
        tx: receipt.tx_hash,
    })?;

    let extra = matches.count();
    if extra > 0 {
        return Err(ClientError::AmbiguousEvent {
            operation,
            event: E::NAME,
            tx: receipt.tx_hash,
            count: extra + 1,
        });
    }

    E::decode(receipt.tx_hash, log.args.clone())
        .map_err(|source| ClientError::Decode { operation, source })
}

/// A mutation ready to be sent.
///
/// Built unsent; call [`send`](Self::send) for the submitted stage or
/// [`execute`](Self::execute) to run the whole pipeline.
#[must_use = "a mutation does nothing until sent"]
#[derive(Debug)]
pub struct MutationCall<E> {
    contract: Option<Contract>,
    request: MutationRequest,
    _expected: PhantomData<fn() -> E>,
}

impl<E: Expected> MutationCall<E> {
    pub(crate) fn new(contract: Option<Contract>, request: MutationRequest) -> Self {
        Self {
            contract,
            request,
            _expected: PhantomData,
        }
    }

    /// Pin fee, value or nonce parameters. Fields set here win over the
    /// pipeline's defaults.
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.request.overrides = overrides;
        self
    }

    pub fn request(&self) -> &MutationRequest {
        &self.request
    }

    /// Estimate, sign and submit. Returns once the ledger accepted the
    /// transaction.
    pub async fn send(self) -> Result<PendingMutation<E>> {
        let operation = self.request.operation;
        let contract = match self.contract {
            Some(contract) if contract.signer().is_some() => contract,
            Some(contract) => {
                return Err(ClientError::NoSigner {
                    operation: contract.method(operation),
                })
            }
            None => {
                return Err(ClientError::NoSigner {
                    operation: ContractVersion::LATEST.method(operation),
                })
            }
        };
        let method = contract.method(operation);
        let rejected = |source: LedgerError| ClientError::TransactionRejected {
            operation: method,
            source,
        };

        let ledger = contract.ledger()?;
        let signer = contract
            .signer()
            .ok_or(ClientError::NoSigner { operation: method })?;
        let from = signer.address();
        let to = contract.address();
        let caller = &self.request.overrides;
        let call = CallRequest::new(method, self.request.args);
        let value = caller.value.unwrap_or_default();

        let estimated = ledger
            .estimate_gas(&from, &to, &call, caller)
            .await
            .map_err(rejected)?;
        let adjusted = gas_margin(estimated);
        let merged = Overrides {
            gas_limit: Some(adjusted),
            ..Default::default()
        }
        .merge(caller);
        debug!(
            operation = method,
            estimated,
            gas_limit = ?merged.gas_limit,
            "estimated gas"
        );

        let gas_price = match merged.gas_price {
            Some(price) => price,
            None => ledger.gas_price().await.map_err(rejected)?,
        };
        let nonce = match merged.nonce {
            Some(nonce) => nonce,
            None => ledger.transaction_count(&from).await.map_err(rejected)?,
        };
        let chain_id = ledger.chain_id().await.map_err(rejected)?;

        let transaction = TransactionRequest {
            chain_id,
            from,
            to,
            nonce,
            gas_limit: merged.gas_limit.unwrap_or(adjusted),
            gas_price,
            value,
            call,
        }
        .sign(signer.keypair())
        .map_err(|e| rejected(e.into()))?;

        let hash = ledger
            .send_transaction(transaction.clone())
            .await
            .map_err(rejected)?;
        debug!(operation = method, tx = %hash, nonce, "submitted");

        Ok(PendingMutation {
            contract,
            operation: method,
            transaction: PendingTransaction { hash, transaction },
            _expected: PhantomData,
        })
    }

    /// Run the whole pipeline and return the expected event.
    pub async fn execute(self) -> Result<E> {
        Ok(self.send().await?.confirm().await?.event)
    }
}

/// The ledger-assigned handle of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub transaction: SignedTransaction,
}

/// A submitted mutation awaiting confirmation.
///
/// Dropping it does not cancel anything; the transaction stays with the
/// ledger.
#[must_use = "dropping a pending mutation does not cancel it"]
#[derive(Debug)]
pub struct PendingMutation<E> {
    contract: Contract,
    operation: &'static str,
    transaction: PendingTransaction,
    _expected: PhantomData<fn() -> E>,
}

/// A confirmed mutation: the final receipt and the extracted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed<E> {
    pub receipt: Receipt,
    pub event: E,
}

impl<E: Expected> PendingMutation<E> {
    pub fn transaction(&self) -> &PendingTransaction {
        &self.transaction
    }

    pub fn hash(&self) -> TxHash {
        self.transaction.hash
    }

    /// Await confirmation depth, then extract the expected event.
    pub async fn confirm(self) -> Result<Confirmed<E>> {
        let receipt = self.wait().await?;
        let event = E::from_receipt(&receipt, &self.contract.address(), self.operation)?;

        info!(
            operation = self.operation,
            tx = %receipt.tx_hash,
            block = receipt.block_number,
            "mutation confirmed"
        );
        Ok(Confirmed { receipt, event })
    }

    fn failed(&self, reason: FailureReason) -> ClientError {
        ClientError::TransactionFailed {
            operation: self.operation,
            tx: self.transaction.hash,
            reason,
        }
    }

    /// Poll until `depth` canonical blocks are built on top of the receipt's
    /// block.
    async fn wait(&self) -> Result<Receipt> {
        let ledger = self.contract.ledger()?;
        let depth = self.contract.confirmations();
        let hash = &self.transaction.hash;
        let mut included: Option<(u64, BlockHash)> = None;

        loop {
            let receipt = ledger
                .transaction_receipt(hash)
                .await
                .map_err(|e| self.failed(FailureReason::Ledger(e)))?;

            match receipt {
                None if included.is_some() => {
                    return Err(self.failed(FailureReason::Dropped));
                }
                None => {}
                Some(receipt) => {
                    let position = (receipt.block_number, receipt.block_hash);
                    if included.is_some_and(|seen| seen != position) {
                        return Err(self.failed(FailureReason::Dropped));
                    }
                    if included.is_none() {
                        debug!(
                            operation = self.operation,
                            tx = %hash,
                            block = receipt.block_number,
                            "included"
                        );
                    }
                    included = Some(position);

                    if !receipt.status {
                        return Err(self.failed(FailureReason::Reverted {
                            block: receipt.block_number,
                        }));
                    }
                    if depth == 0 {
                        return Ok(receipt);
                    }

                    let tip = ledger
                        .block_number()
                        .await
                        .map_err(|e| self.failed(FailureReason::Ledger(e)))?;
                    let confirmations = receipt.confirmations(tip);
                    debug!(
                        operation = self.operation,
                        tx = %hash,
                        confirmations,
                        depth,
                        "awaiting confirmations"
                    );

                    if confirmations >= depth {
                        let canonical = ledger
                            .block_hash(receipt.block_number)
                            .await
                            .map_err(|e| self.failed(FailureReason::Ledger(e)))?;
                        if canonical != Some(receipt.block_hash) {
                            return Err(self.failed(FailureReason::Dropped));
                        }
                        return Ok(receipt);
                    }
                }
            }

            tokio::time::sleep(self.contract.poll_interval()).await;
        }
    }
}
