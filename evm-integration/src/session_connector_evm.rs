use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use entities::chain::Address;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use interfaces::session::{ConnectionError, Session, SessionConnector};
use tracing::info;
use util::config::ChainCfg;
use util::str_util::{mask_creds, mask_url_passwd};

use crate::registry_evm::{EvmAssetRegistry, EvmMarketplace};

/// Connects to a JSON-RPC node with a locally held signing key.
#[derive(Clone)]
pub struct EvmSessionConnector {
    rpc_url: String,
    private_key: Option<String>,
    asset_registry: String,
    marketplace: String,
    confirmations: usize,
}

impl EvmSessionConnector {
    pub fn from_cfg(cfg: &ChainCfg) -> Self {
        EvmSessionConnector {
            rpc_url: cfg.rpc_url.clone(),
            private_key: cfg.private_key.clone(),
            asset_registry: cfg.asset_registry.clone(),
            marketplace: cfg.marketplace.clone(),
            confirmations: cfg.confirmations,
        }
    }
}

impl fmt::Debug for EvmSessionConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmSessionConnector")
            .field("rpc_url", &mask_url_passwd(&self.rpc_url))
            .field("private_key", &self.private_key.as_ref().map(|s| mask_creds(s)))
            .field("asset_registry", &self.asset_registry)
            .field("marketplace", &self.marketplace)
            .finish()
    }
}

#[async_trait]
impl SessionConnector for EvmSessionConnector {
    async fn connect(&self) -> Result<Session, ConnectionError> {
        let asset_registry = parse_address("asset registry", &self.asset_registry)?;
        let marketplace = parse_address("marketplace", &self.marketplace)?;

        let wallet = self
            .private_key
            .as_deref()
            .ok_or_else(|| ConnectionError::Signer("no private key configured".to_string()))?
            .parse::<LocalWallet>()
            .map_err(|e| ConnectionError::Signer(e.to_string()))?;

        let provider = Provider::<Http>::try_from(self.rpc_url.as_str())
            .map_err(|e| ConnectionError::Provider(e.to_string()))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ConnectionError::Provider(e.to_string()))?;

        ensure_deployed(&provider, "asset registry", asset_registry).await?;
        ensure_deployed(&provider, "marketplace", marketplace).await?;

        let identity = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider, wallet.with_chain_id(chain_id.as_u64())));

        info!("Connected to chain '{chain_id}' as '{identity:?}'.");

        Ok(Session {
            identity,
            asset_registry: Arc::new(EvmAssetRegistry::new(asset_registry, client.clone())),
            marketplace: Arc::new(EvmMarketplace::new(marketplace, client, self.confirmations)),
        })
    }
}

fn parse_address(name: &str, value: &str) -> Result<Address, ConnectionError> {
    value
        .parse::<Address>()
        .map_err(|e| ConnectionError::Registry(format!("{name} address '{value}' is invalid: {e}")))
}

async fn ensure_deployed(provider: &Provider<Http>, name: &str, address: Address) -> Result<(), ConnectionError> {
    let code = provider
        .get_code(address, None)
        .await
        .map_err(|e| ConnectionError::Provider(e.to_string()))?;

    if code.as_ref().is_empty() {
        return Err(ConnectionError::Registry(format!("no {name} contract deployed at {address:?}")));
    }
    Ok(())
}
