use std::sync::Arc;

use async_trait::async_trait;
use entities::chain::{Address, Amount, Confirmation, ContentReference, Listing, TokenId, TxHash, U256};
use ethers::providers::{Middleware, PendingTransaction};
use ethers::types::U64;
use interfaces::registry::{AssetRegistry, ContractError, MarketplaceRegistry};
use tracing::{debug, info};

use crate::contracts::{AssetRegistryContract, EvmClient, MarketplaceContract};

pub struct EvmAssetRegistry {
    contract: AssetRegistryContract<EvmClient>,
}

impl EvmAssetRegistry {
    pub fn new(address: Address, client: Arc<EvmClient>) -> Self {
        EvmAssetRegistry { contract: AssetRegistryContract::new(address, client) }
    }
}

#[async_trait]
impl AssetRegistry for EvmAssetRegistry {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<ContentReference, ContractError> {
        self.contract
            .token_uri(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ContractError::call("tokenURI", e))
    }

    async fn tokens_of_owner(&self, owner: Address) -> Result<Vec<TokenId>, ContractError> {
        let ids = self
            .contract
            .tokens_of_owner(owner)
            .call()
            .await
            .map_err(|e| ContractError::call("tokensOfOwner", e))?;

        ids.into_iter().map(to_token_id).collect()
    }
}

pub struct EvmMarketplace {
    contract: MarketplaceContract<EvmClient>,
    client: Arc<EvmClient>,
    confirmations: usize,
}

impl EvmMarketplace {
    /// ## Args:
    /// * `address` - marketplace contract address
    /// * `client` - signing client, purchases are sent from its address
    /// * `confirmations` - number of blocks a purchase has to be buried under
    pub fn new(address: Address, client: Arc<EvmClient>, confirmations: usize) -> Self {
        EvmMarketplace { contract: MarketplaceContract::new(address, client.clone()), client, confirmations }
    }
}

#[async_trait]
impl MarketplaceRegistry for EvmMarketplace {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn listed_token_ids(&self) -> Result<Vec<TokenId>, ContractError> {
        let ids = self
            .contract
            .get_listed_token_ids()
            .call()
            .await
            .map_err(|e| ContractError::call("getListedTokenIds", e))?;

        ids.into_iter().map(to_token_id).collect()
    }

    async fn listing(&self, token_id: TokenId) -> Result<Listing, ContractError> {
        let (seller, price) = self
            .contract
            .listings(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ContractError::call("listings", e))?;

        Ok(Listing { token_id, seller, price })
    }

    async fn buy_token(&self, token_id: TokenId, value: Amount) -> Result<TxHash, ContractError> {
        let call = self.contract.buy_token(U256::from(token_id)).value(value);
        let pending = call
            .send()
            .await
            .map_err(|e| ContractError::Submission(e.to_string()))?;

        let tx_hash = pending.tx_hash();
        info!("Purchase of token ID {token_id} submitted in transaction {tx_hash:?}.");

        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ContractError> {
        debug!("Waiting for {} confirmations of {tx_hash:?}.", self.confirmations);

        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .confirmations(self.confirmations)
            .await
            .map_err(|e| ContractError::Confirmation { tx_hash, reason: e.to_string() })?
            .ok_or(ContractError::Dropped(tx_hash))?;

        if receipt.status == Some(U64::zero()) {
            return Err(ContractError::Reverted(tx_hash));
        }

        Ok(Confirmation { tx_hash, block_number: receipt.block_number.map(|n| n.as_u64()) })
    }
}

/// Registries return identifiers as `uint256`, anything wider than 64 bits is rejected
fn to_token_id(value: U256) -> Result<TokenId, ContractError> {
    if value.bits() > 64 {
        return Err(ContractError::TokenIdOutOfRange(value.to_string()));
    }
    Ok(value.as_u64())
}
