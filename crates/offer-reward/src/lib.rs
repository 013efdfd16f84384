//! # OfferReward
//!
//! Client for the OfferReward contract: publishers post offers carrying a
//! value, others answer, and the publisher finishes an offer by rewarding
//! one answerer.
//!
//! ## Overview
//!
//! - **Network resolution**: [`DeploymentRegistry`] maps a network id to the
//!   contract deployed there
//! - **Connection**: [`ConnectionHandle::connect`] binds a read or write
//!   [`Credential`] to that contract
//! - **Mutations**: estimate, add a 30% gas margin, sign, submit, await
//!   confirmations, extract the emitted event
//! - **Queries**: direct, batched and paginated reads, plus event scans
//!   ordered by block and log index
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use offer_reward::{
//!     ClientConfig, ConnectionHandle, DeploymentRegistry, OfferReward, Overrides, Signer,
//! };
//!
//! async fn example(signer: Signer) -> offer_reward::Result<()> {
//!     let registry = Arc::new(DeploymentRegistry::from_path("deployments.json")?);
//!     let mut client = ConnectionHandle::new(registry, ClientConfig::default());
//!     client.connect(signer, None, None).await?;
//!
//!     // Two stages: submitted, then confirmed
//!     let pending = client
//!         .publish_offer("title", "content", 1_800_000_000)
//!         .overrides(Overrides::value(1_000u64))
//!         .send()
//!         .await?;
//!     println!("submitted {}", pending.hash());
//!
//!     let confirmed = pending.confirm().await?;
//!     println!("offer {} in block {}", confirmed.event.offer_id, confirmed.receipt.block_number);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `offer_reward::core` - Value types (addresses, tokens, events, receipts)
//! - `offer_reward::ledger` - The ledger boundary and its implementations

pub mod api;
pub mod config;
pub mod connection;
pub mod credential;
pub mod error;
pub mod operation;
pub mod pipeline;
pub mod query;
pub mod registry;

// Re-export component crates
pub use offer_reward_core as core;
pub use offer_reward_ledger as ledger;

// Re-export main types for convenience
pub use api::OfferReward;
pub use config::ClientConfig;
pub use connection::ConnectionHandle;
pub use credential::{Credential, Provider, Signer};
pub use error::{ClientError, FailureReason, Result};
pub use operation::{ContractVersion, Operation};
pub use pipeline::{
    extract_event, gas_margin, Confirmed, Expected, MutationCall, MutationRequest,
    PendingMutation, PendingTransaction,
};
pub use query::BlockRange;
pub use registry::{Deployment, DeploymentRegistry, CONTRACT_NAME};

// Re-export commonly used core types
pub use offer_reward_core::{
    Address, AnswerPublished, CallOverrides, Keypair, OfferData, OfferFinished, OfferPublished,
    Overrides, PublisherData, Receipt, TxHash, U256,
};
