//! Credentials a connection handle can be bound with.
//!
//! A [`Provider`] can read; a [`Signer`] can also sign mutations, and reaches
//! the ledger through the provider attached to it.

use std::fmt;
use std::sync::Arc;

use offer_reward_core::{Address, Keypair};
use offer_reward_ledger::Ledger;

use crate::error::{ClientError, Result};

/// Read access to a ledger.
#[derive(Clone)]
pub struct Provider {
    ledger: Arc<dyn Ledger>,
}

impl Provider {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Network id reported by the ledger.
    pub async fn network_id(&self) -> Result<u64> {
        self.ledger
            .chain_id()
            .await
            .map_err(|source| ClientError::Ledger {
                operation: "chainId",
                source,
            })
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider").finish_non_exhaustive()
    }
}

/// An authorized signing identity, optionally attached to a provider.
#[derive(Clone)]
pub struct Signer {
    keypair: Keypair,
    provider: Option<Provider>,
}

impl Signer {
    /// A detached signer. It can sign but not reach a ledger.
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair,
            provider: None,
        }
    }

    /// Attach `provider`, replacing any previous one.
    pub fn connect(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// What a handle is bound with.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Queries only.
    Read(Provider),
    /// Queries and mutations.
    Write(Signer),
}

impl Credential {
    /// The provider used for every ledger request.
    pub fn provider(&self) -> Result<&Provider> {
        match self {
            Self::Read(provider) => Ok(provider),
            Self::Write(signer) => signer.provider().ok_or(ClientError::NoProvider),
        }
    }

    pub fn signer(&self) -> Option<&Signer> {
        match self {
            Self::Read(_) => None,
            Self::Write(signer) => Some(signer),
        }
    }

    /// Network id, asked of the provider.
    pub async fn network_id(&self) -> Result<u64> {
        self.provider()?.network_id().await
    }
}

impl From<Provider> for Credential {
    fn from(provider: Provider) -> Self {
        Self::Read(provider)
    }
}

impl From<Signer> for Credential {
    fn from(signer: Signer) -> Self {
        Self::Write(signer)
    }
}
