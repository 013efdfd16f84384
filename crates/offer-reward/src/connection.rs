//! The connection handle: a credential bound to a resolved contract.

use std::sync::Arc;
use std::time::Duration;

use offer_reward_core::{Address, CallOverrides};
use offer_reward_ledger::Ledger;
use tracing::info;

use crate::config::ClientConfig;
use crate::credential::{Credential, Signer};
use crate::error::{ClientError, Result};
use crate::operation::{ContractVersion, Operation};
use crate::registry::{Deployment, DeploymentRegistry};

/// A bound contract stub. Immutable and cheap to clone.
#[derive(Debug, Clone)]
pub(crate) struct Contract {
    inner: Arc<ContractInner>,
}

#[derive(Debug)]
struct ContractInner {
    deployment: Deployment,
    credential: Credential,
    confirmations: u64,
    poll_interval: Duration,
}

impl Contract {
    pub(crate) fn address(&self) -> Address {
        self.inner.deployment.address
    }

    pub(crate) fn version(&self) -> ContractVersion {
        self.inner.deployment.version
    }

    pub(crate) fn method(&self, operation: Operation) -> &'static str {
        self.version().method(operation)
    }

    pub(crate) fn confirmations(&self) -> u64 {
        self.inner.confirmations
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    pub(crate) fn signer(&self) -> Option<&Signer> {
        self.inner.credential.signer()
    }

    pub(crate) fn ledger(&self) -> Result<&Arc<dyn Ledger>> {
        Ok(self.inner.credential.provider()?.ledger())
    }

    /// Read overrides with the signer as default caller.
    pub(crate) fn call_overrides(&self, overrides: CallOverrides) -> CallOverrides {
        CallOverrides {
            from: overrides.from.or_else(|| self.signer().map(Signer::address)),
            ..overrides
        }
    }
}

/// Binds a credential to the contract serving its network.
///
/// Clones share the bound contract, so independent calls may run
/// concurrently on clones of one handle.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    registry: Arc<DeploymentRegistry>,
    config: ClientConfig,
    contract: Option<Contract>,
}

impl ConnectionHandle {
    /// An unconnected handle.
    pub fn new(registry: Arc<DeploymentRegistry>, config: ClientConfig) -> Self {
        Self {
            registry,
            config,
            contract: None,
        }
    }

    /// Bind `credential` to the contract.
    ///
    /// Without `address`, the credential's network id is resolved through the
    /// registry. An explicit address is assumed to serve the latest contract
    /// version. `confirmations` overrides the configured default depth.
    ///
    /// Fails with `NoProvider` for a signer without a provider, whichever
    /// way the address is found. A failed connect leaves the previous
    /// binding in place.
    pub async fn connect(
        &mut self,
        credential: impl Into<Credential>,
        address: Option<Address>,
        confirmations: Option<u64>,
    ) -> Result<()> {
        let credential = credential.into();
        credential.provider()?;

        let deployment = match address {
            Some(address) => Deployment::new(address, ContractVersion::LATEST),
            None => {
                let network_id = credential.network_id().await?;
                *self.registry.resolve(network_id)?
            }
        };

        let confirmations = confirmations.unwrap_or(self.config.default_confirmations);
        info!(
            address = %deployment.address,
            version = %deployment.version,
            confirmations,
            writable = credential.signer().is_some(),
            "connected"
        );

        self.contract = Some(Contract {
            inner: Arc::new(ContractInner {
                deployment,
                credential,
                confirmations,
                poll_interval: self.config.poll_interval,
            }),
        });
        Ok(())
    }

    /// The bound contract address.
    pub fn address(&self) -> Result<Address> {
        self.contract
            .as_ref()
            .map(Contract::address)
            .ok_or(ClientError::NotConnected)
    }

    /// Schema version of the bound contract.
    pub fn version(&self) -> Result<ContractVersion> {
        self.contract
            .as_ref()
            .map(Contract::version)
            .ok_or(ClientError::NotConnected)
    }

    /// Confirmation depth mutations wait for.
    pub fn confirmations(&self) -> Result<u64> {
        self.contract
            .as_ref()
            .map(Contract::confirmations)
            .ok_or(ClientError::NotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.contract.is_some()
    }

    pub fn registry(&self) -> &Arc<DeploymentRegistry> {
        &self.registry
    }

    pub(crate) fn bound(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    /// The bound contract, for reads and event queries.
    pub(crate) fn contract(&self, operation: &'static str) -> Result<&Contract> {
        self.contract
            .as_ref()
            .ok_or(ClientError::ContractUnavailable { operation })
    }
}
