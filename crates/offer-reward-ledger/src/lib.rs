//! # OfferReward Ledger
//!
//! The boundary between the OfferReward client and the ledger hosting the
//! contract. The client only talks to the [`Ledger`] trait.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Async primitives: reads, estimation, submission, receipts, logs
//! - [`MemoryLedger`] - Single-node in-memory chain hosting a [`Program`]
//! - [`StubLedger`] - Scripted responses for failure-path tests
//! - [`Program`] - Executable contract semantics for the in-memory chain
//!
//! ## Usage
//!
//! ```rust,ignore
//! use offer_reward_ledger::{MemoryLedger, MemoryLedgerConfig, Ledger};
//!
//! let ledger = MemoryLedger::new(MemoryLedgerConfig::default(), contract, program);
//! ledger.fund(account, 1_000_000u64.into())?;
//! let tip = ledger.block_number().await?;
//! ```
//!
//! ## Design Notes
//!
//! - **Confirmations**: a transaction included at block `b` has `tip - b + 1`
//! - **Reorgs**: [`MemoryLedger::reorg`] drops blocks and their receipts
//! - **Failed transactions** still produce a receipt with `status == false`

pub mod error;
pub mod memory;
pub mod program;
pub mod stub;
pub mod traits;

pub use error::{LedgerError, Result};
pub use memory::{MemoryLedger, MemoryLedgerConfig};
pub use program::{intrinsic_gas, EmittedEvent, Env, Outcome, Program, Revert};
pub use stub::{StubLedger, StubScript};
pub use traits::Ledger;
