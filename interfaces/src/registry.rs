use async_trait::async_trait;
use entities::chain::{Address, Amount, Confirmation, ContentReference, Listing, TokenId, TxHash};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("Contract call '{method}' failed: {reason}")]
    Call { method: &'static str, reason: String },
    #[error("Token ID {0} doesn't fit into 64 bits")]
    TokenIdOutOfRange(String),
    #[error("Transaction submission failed: {0}")]
    Submission(String),
    #[error("Transaction {0:?} was reverted")]
    Reverted(TxHash),
    #[error("Transaction {0:?} was dropped before confirmation")]
    Dropped(TxHash),
    #[error("Failed to await confirmation of {tx_hash:?}: {reason}")]
    Confirmation { tx_hash: TxHash, reason: String },
}

impl ContractError {
    pub fn call(method: &'static str, reason: impl ToString) -> Self {
        ContractError::Call { method, reason: reason.to_string() }
    }
}

/// Read side of the asset ownership registry.
#[async_trait]
pub trait AssetRegistry {
    /// Address of the registry contract, part of the session key.
    fn address(&self) -> Address;

    /// Content reference of the token's metadata document.
    /// May be a bare locator or a native-scheme reference.
    async fn token_uri(&self, token_id: TokenId) -> Result<ContentReference, ContractError>;

    async fn tokens_of_owner(&self, owner: Address) -> Result<Vec<TokenId>, ContractError>;
}

/// Marketplace listing registry.
#[async_trait]
pub trait MarketplaceRegistry {
    fn address(&self) -> Address;

    async fn listed_token_ids(&self) -> Result<Vec<TokenId>, ContractError>;

    async fn listing(&self, token_id: TokenId) -> Result<Listing, ContractError>;

    /// Submits a purchase of the token carrying `value` as the transferred amount.
    /// Returns as soon as the transaction was accepted for inclusion.
    /// ## Args:
    /// * `token_id` - listed token to buy
    /// * `value` - amount attached to the transaction, should match the listing price
    async fn buy_token(&self, token_id: TokenId, value: Amount) -> Result<TxHash, ContractError>;

    /// Waits until the transaction is confirmed. Reverted and dropped transactions are errors.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ContractError>;
}
