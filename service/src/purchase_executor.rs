use std::sync::Arc;
use std::time::Duration;

use entities::chain::{Confirmation, TokenId, TxHash};
use interfaces::registry::{ContractError, MarketplaceRegistry};
use thiserror::Error;
use tracing::{error, info};
use util::amount::{parse_amount, AmountError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] AmountError),
    #[error("Not connected to the marketplace")]
    NotConnected,
    #[error("Purchase of token ID {token_id} was rejected: {source}")]
    Rejected { token_id: TokenId, source: ContractError },
    #[error("Purchase of token ID {token_id} failed: {source}")]
    Failed { token_id: TokenId, source: ContractError },
    #[error("Purchase transaction {tx_hash:?} wasn't confirmed within {timeout:?}")]
    Timeout { tx_hash: TxHash, timeout: Duration },
}

/// Buys listed tokens on the marketplace registry.
#[derive(Clone)]
pub struct PurchaseExecutor {
    marketplace: Arc<dyn MarketplaceRegistry + Sync + Send>,
    confirmation_timeout: Duration,
}

impl PurchaseExecutor {
    pub fn new(marketplace: Arc<dyn MarketplaceRegistry + Sync + Send>, confirmation_timeout: Duration) -> Self {
        Self { marketplace, confirmation_timeout }
    }

    /// Submits the purchase carrying `price` as the transferred value and waits for its confirmation.
    /// Nothing should be considered bought unless this returns `Ok`.
    /// ## Args:
    /// * `token_id` - listed token
    /// * `price` - decimal price as displayed in the catalog, e.g. `"0.5"`
    pub async fn purchase(&self, token_id: TokenId, price: &str) -> Result<Confirmation, PurchaseError> {
        let value = parse_amount(price)?;

        info!("Buying token ID {token_id} for {price} ({value} wei).");

        let tx_hash = self
            .marketplace
            .buy_token(token_id, value)
            .await
            .map_err(|source| PurchaseError::Rejected { token_id, source })
            .inspect_err(|e| error!("{e}"))?;

        let confirmation = tokio::time::timeout(self.confirmation_timeout, self.marketplace.wait_for_confirmation(tx_hash))
            .await
            .map_err(|_| PurchaseError::Timeout { tx_hash, timeout: self.confirmation_timeout })
            .and_then(|confirmed| confirmed.map_err(|source| PurchaseError::Failed { token_id, source }))
            .inspect_err(|e| error!("{e}"))?;

        info!("Purchase successful! Token ID {token_id}, transaction {tx_hash:?}.");

        Ok(confirmation)
    }
}
