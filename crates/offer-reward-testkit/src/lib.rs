//! # OfferReward Testkit
//!
//! Testing utilities for the OfferReward client.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Contract emulator**: [`OfferRewardProgram`], an executable contract for
//!   the in-memory ledger
//! - **Fixtures**: [`TestFixture`], a chain with the contract deployed on
//!   network 1337, funded signers and connected handles
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use offer_reward::OfferReward;
//! use offer_reward_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let client = fixture.client(1).await?;
//! let event = client
//!     .publish_offer("t", "c", fixture.finish_time())
//!     .overrides(Overrides::value(1_000u64))
//!     .execute()
//!     .await?;
//! assert_eq!(event.offer_id, 0);
//! ```

pub mod fixtures;
pub mod generators;
pub mod program;

pub use fixtures::{init_tracing, TestFixture, CHAIN_ID, CONTRACT, INITIAL_BALANCE};
pub use program::{OfferRewardProgram, ProgramConfig};
