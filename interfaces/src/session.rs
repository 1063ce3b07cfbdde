use std::sync::Arc;

use async_trait::async_trait;
use entities::chain::{Address, SessionKey};
use thiserror::Error;

use crate::registry::{AssetRegistry, MarketplaceRegistry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Provider is not available: {0}")]
    Provider(String),
    #[error("Signer is not available: {0}")]
    Signer(String),
    #[error("Invalid registry binding: {0}")]
    Registry(String),
}

/// Identity and registry bindings a synchronization pass works against.
#[derive(Clone)]
pub struct Session {
    pub identity: Address,
    pub asset_registry: Arc<dyn AssetRegistry + Sync + Send>,
    pub marketplace: Arc<dyn MarketplaceRegistry + Sync + Send>,
}

impl Session {
    pub fn key(&self) -> SessionKey {
        SessionKey {
            asset_registry: self.asset_registry.address(),
            marketplace: self.marketplace.address(),
            identity: self.identity,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("key", &self.key()).finish()
    }
}

/// Establishes provider, identity and registry bindings.
#[async_trait]
pub trait SessionConnector {
    async fn connect(&self) -> Result<Session, ConnectionError>;
}
