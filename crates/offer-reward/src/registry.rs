//! Network resolver: which contract address serves which network.
//!
//! The registry is loaded once at startup, from the deployment metadata
//! emitted by deployment tooling or built programmatically, and shared
//! immutably as `Arc<DeploymentRegistry>`.
//!
//! Metadata layout:
//!
//! ```json
//! { "1337": { "OfferReward": { "proxyAddress": "0x…", "version": "v1" } } }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use offer_reward_core::Address;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::operation::ContractVersion;

/// Key of this contract's entry in the per-network metadata.
pub const CONTRACT_NAME: &str = "OfferReward";

/// A deployed contract instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub version: ContractVersion,
}

impl Deployment {
    pub fn new(address: Address, version: ContractVersion) -> Self {
        Self { address, version }
    }
}

#[derive(Deserialize)]
struct RawDeployment {
    #[serde(rename = "proxyAddress")]
    proxy_address: Address,
    #[serde(default)]
    version: ContractVersion,
}

/// Network id -> deployment.
#[derive(Debug, Clone, Default)]
pub struct DeploymentRegistry {
    deployments: BTreeMap<u64, Deployment>,
}

impl DeploymentRegistry {
    /// An empty registry; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, network_id: u64, deployment: Deployment) -> Self {
        self.insert(network_id, deployment);
        self
    }

    /// Register `deployment` for `network_id`, replacing any previous entry.
    pub fn insert(&mut self, network_id: u64, deployment: Deployment) {
        self.deployments.insert(network_id, deployment);
    }

    /// Look up the deployment serving `network_id`.
    pub fn resolve(&self, network_id: u64) -> Result<&Deployment> {
        self.deployments
            .get(&network_id)
            .ok_or(ClientError::UnsupportedNetwork(network_id))
    }

    /// Networks with a deployment, ascending.
    pub fn networks(&self) -> impl Iterator<Item = u64> + '_ {
        self.deployments.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }

    /// Parse deployment metadata. Networks without an `OfferReward` entry
    /// are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, RawDeployment>> =
            serde_json::from_str(json).map_err(|e| ClientError::Registry(e.to_string()))?;

        let mut registry = Self::new();
        for (network, mut contracts) in raw {
            let network_id = network
                .parse::<u64>()
                .map_err(|_| ClientError::Registry(format!("invalid network id {network:?}")))?;
            if let Some(entry) = contracts.remove(CONTRACT_NAME) {
                registry.insert(
                    network_id,
                    Deployment::new(entry.proxy_address, entry.version),
                );
            }
        }
        Ok(registry)
    }

    /// Read and parse a deployment metadata file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Registry(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}
