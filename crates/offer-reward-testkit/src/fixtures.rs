//! Test fixtures and helpers.
//!
//! A [`TestFixture`] is one in-memory chain with the OfferReward contract
//! deployed on network [`CHAIN_ID`] and a registry pointing at it.

use std::sync::{Arc, Once};
use std::time::Duration;

use offer_reward::{
    ClientConfig, ConnectionHandle, ContractVersion, Deployment, DeploymentRegistry, Provider,
    Signer,
};
use offer_reward_core::{Address, Keypair, U256};
use offer_reward_ledger::{LedgerError, MemoryLedger, MemoryLedgerConfig};
use tracing_subscriber::filter::LevelFilter;

use crate::program::{OfferRewardProgram, ProgramConfig};

/// Network the fixture's chain reports.
pub const CHAIN_ID: u64 = 1337;

/// Where the contract is deployed.
pub const CONTRACT: Address = Address([0xaa; 20]);

/// Balance each fixture signer starts with.
pub const INITIAL_BALANCE: u64 = 1_000_000_000_000;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness' captured writer.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(LevelFilter::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// An in-memory chain hosting the contract.
pub struct TestFixture {
    pub ledger: Arc<MemoryLedger<OfferRewardProgram>>,
    pub registry: Arc<DeploymentRegistry>,
    pub config: ClientConfig,
}

impl TestFixture {
    /// Default contract parameters, automining chain.
    pub fn new() -> Self {
        Self::with_config(ProgramConfig::default(), MemoryLedgerConfig::default())
    }

    pub fn with_config(program: ProgramConfig, ledger: MemoryLedgerConfig) -> Self {
        init_tracing();

        let ledger = MemoryLedger::new(
            MemoryLedgerConfig {
                chain_id: CHAIN_ID,
                ..ledger
            },
            CONTRACT,
            OfferRewardProgram::new(program),
        );
        let registry = DeploymentRegistry::new()
            .with(CHAIN_ID, Deployment::new(CONTRACT, ContractVersion::V1));

        Self {
            ledger: Arc::new(ledger),
            registry: Arc::new(registry),
            // automined blocks are final at inclusion
            config: ClientConfig {
                default_confirmations: 0,
                poll_interval: Duration::from_millis(5),
            },
        }
    }

    /// Read access to the chain.
    pub fn provider(&self) -> Provider {
        Provider::new(self.ledger.clone())
    }

    /// A signer with a deterministic key derived from `seed`, funded with
    /// [`INITIAL_BALANCE`] and attached to the chain.
    pub fn signer(&self, seed: u8) -> Result<Signer, LedgerError> {
        let keypair = Keypair::from_seed(&[seed; 32]);
        self.ledger
            .fund(keypair.address(), U256::from(INITIAL_BALANCE))?;
        Ok(Signer::new(keypair).connect(self.provider()))
    }

    /// An unconnected handle using the fixture's registry.
    pub fn handle(&self) -> ConnectionHandle {
        ConnectionHandle::new(self.registry.clone(), self.config.clone())
    }

    /// A signer with a random, unfunded key, attached to the chain.
    pub fn stranger(&self) -> Signer {
        Signer::new(Keypair::generate()).connect(self.provider())
    }

    /// A handle connected with a funded signer.
    pub async fn client(&self, seed: u8) -> offer_reward::Result<ConnectionHandle> {
        let signer = self
            .signer(seed)
            .map_err(|source| offer_reward::ClientError::Ledger {
                operation: "fund",
                source,
            })?;
        let mut handle = self.handle();
        handle.connect(signer, None, None).await?;
        Ok(handle)
    }

    /// A handle connected read-only.
    pub async fn reader(&self) -> offer_reward::Result<ConnectionHandle> {
        let mut handle = self.handle();
        handle.connect(self.provider(), None, None).await?;
        Ok(handle)
    }

    /// A finish time every default-configured offer accepts.
    pub fn finish_time(&self) -> u64 {
        let config = self.ledger.config();
        config.genesis_timestamp + 30 * 24 * 3600
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
