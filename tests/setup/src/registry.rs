use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use entities::chain::{Address, Amount, Confirmation, ContentReference, Listing, TokenId, TxHash};
use interfaces::registry::{AssetRegistry, ContractError, MarketplaceRegistry};
use interfaces::session::{ConnectionError, Session, SessionConnector};

use crate::data_gen::rand_address;

/// In-memory asset registry with injectable failures and latency.
pub struct FakeAssetRegistry {
    address: Address,
    token_uris: Mutex<HashMap<TokenId, Result<ContentReference, ContractError>>>,
    owners: Mutex<HashMap<Address, Vec<TokenId>>>,
    enumeration_error: Mutex<Option<ContractError>>,
    delay: Mutex<Duration>,
}

impl Default for FakeAssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAssetRegistry {
    pub fn new() -> Self {
        Self {
            address: rand_address(),
            token_uris: Default::default(),
            owners: Default::default(),
            enumeration_error: Default::default(),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_token_uri(&self, token_id: TokenId, uri: &str) {
        self.token_uris.lock().unwrap().insert(token_id, Ok(uri.to_string()));
    }

    pub fn fail_token_uri(&self, token_id: TokenId, reason: &str) {
        self.token_uris
            .lock()
            .unwrap()
            .insert(token_id, Err(ContractError::call("tokenURI", reason)));
    }

    pub fn set_owned(&self, owner: Address, token_ids: Vec<TokenId>) {
        self.owners.lock().unwrap().insert(owner, token_ids);
    }

    pub fn fail_enumeration(&self, reason: Option<&str>) {
        *self.enumeration_error.lock().unwrap() = reason.map(|r| ContractError::call("tokensOfOwner", r));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AssetRegistry for FakeAssetRegistry {
    fn address(&self) -> Address {
        self.address
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<ContentReference, ContractError> {
        self.simulate_latency().await;
        self.token_uris
            .lock()
            .unwrap()
            .get(&token_id)
            .cloned()
            .unwrap_or_else(|| Err(ContractError::call("tokenURI", "ERC721: invalid token ID")))
    }

    async fn tokens_of_owner(&self, owner: Address) -> Result<Vec<TokenId>, ContractError> {
        self.simulate_latency().await;
        if let Some(e) = self.enumeration_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.owners.lock().unwrap().get(&owner).cloned().unwrap_or_default())
    }
}

/// How the fake marketplace handles `buyToken`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseBehavior {
    Confirm,
    RejectSubmission(String),
    Revert,
    NeverConfirm,
}

pub struct FakeMarketplace {
    address: Address,
    listed: Mutex<Result<Vec<TokenId>, ContractError>>,
    listings: Mutex<HashMap<TokenId, Result<Listing, ContractError>>>,
    /// Failures served before `listings`, consumed one per call
    listing_failures: Mutex<HashMap<TokenId, Vec<ContractError>>>,
    listing_calls: Mutex<HashMap<TokenId, usize>>,
    behavior: Mutex<PurchaseBehavior>,
    submitted: Mutex<Vec<(TokenId, Amount)>>,
    delay: Mutex<Duration>,
}

impl Default for FakeMarketplace {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeMarketplace {
    pub fn new() -> Self {
        Self {
            address: rand_address(),
            listed: Mutex::new(Ok(Vec::new())),
            listings: Default::default(),
            listing_failures: Default::default(),
            listing_calls: Default::default(),
            behavior: Mutex::new(PurchaseBehavior::Confirm),
            submitted: Default::default(),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_listed(&self, token_ids: Vec<TokenId>) {
        *self.listed.lock().unwrap() = Ok(token_ids);
    }

    pub fn fail_listed(&self, reason: &str) {
        *self.listed.lock().unwrap() = Err(ContractError::call("getListedTokenIds", reason));
    }

    pub fn set_listing(&self, token_id: TokenId, price: Amount) {
        let listing = Listing { token_id, seller: self.address, price };
        self.listings.lock().unwrap().insert(token_id, Ok(listing));
    }

    pub fn fail_listing(&self, token_id: TokenId, reason: &str) {
        self.listings
            .lock()
            .unwrap()
            .insert(token_id, Err(ContractError::call("listings", reason)));
    }

    /// The next `times` listing reads of the token fail, later ones are served as usual
    pub fn fail_listing_times(&self, token_id: TokenId, times: usize, reason: &str) {
        self.listing_failures
            .lock()
            .unwrap()
            .insert(token_id, vec![ContractError::call("listings", reason); times]);
    }

    pub fn listing_calls(&self, token_id: TokenId) -> usize {
        self.listing_calls.lock().unwrap().get(&token_id).copied().unwrap_or(0)
    }

    pub fn set_purchase_behavior(&self, behavior: PurchaseBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Purchases that reached the chain, in submission order
    pub fn submitted_purchases(&self) -> Vec<(TokenId, Amount)> {
        self.submitted.lock().unwrap().clone()
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketplaceRegistry for FakeMarketplace {
    fn address(&self) -> Address {
        self.address
    }

    async fn listed_token_ids(&self) -> Result<Vec<TokenId>, ContractError> {
        self.simulate_latency().await;
        self.listed.lock().unwrap().clone()
    }

    async fn listing(&self, token_id: TokenId) -> Result<Listing, ContractError> {
        *self.listing_calls.lock().unwrap().entry(token_id).or_default() += 1;
        if let Some(e) = self.listing_failures.lock().unwrap().get_mut(&token_id).and_then(Vec::pop) {
            return Err(e);
        }
        self.listings
            .lock()
            .unwrap()
            .get(&token_id)
            .cloned()
            .unwrap_or_else(|| Err(ContractError::call("listings", "token is not listed")))
    }

    async fn buy_token(&self, token_id: TokenId, value: Amount) -> Result<TxHash, ContractError> {
        if let PurchaseBehavior::RejectSubmission(reason) = self.behavior.lock().unwrap().clone() {
            return Err(ContractError::Submission(reason));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((token_id, value));
        Ok(TxHash::from_low_u64_be(submitted.len() as u64))
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ContractError> {
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            PurchaseBehavior::Confirm => Ok(Confirmation { tx_hash, block_number: Some(1) }),
            PurchaseBehavior::Revert => Err(ContractError::Reverted(tx_hash)),
            PurchaseBehavior::NeverConfirm => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ContractError::Dropped(tx_hash))
            }
            PurchaseBehavior::RejectSubmission(reason) => Err(ContractError::Submission(reason)),
        }
    }
}

/// Fake registries bound together with an identity
pub struct FakeChain {
    pub identity: Address,
    pub assets: Arc<FakeAssetRegistry>,
    pub marketplace: Arc<FakeMarketplace>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            identity: rand_address(),
            assets: Arc::new(FakeAssetRegistry::new()),
            marketplace: Arc::new(FakeMarketplace::new()),
        }
    }

    pub fn session(&self) -> Session {
        self.session_for(self.identity)
    }

    pub fn session_for(&self, identity: Address) -> Session {
        Session { identity, asset_registry: self.assets.clone(), marketplace: self.marketplace.clone() }
    }
}

/// Connector that hands out a prepared session or fails
pub struct FakeConnector(pub Result<Session, ConnectionError>);

#[async_trait]
impl SessionConnector for FakeConnector {
    async fn connect(&self) -> Result<Session, ConnectionError> {
        self.0.clone()
    }
}
