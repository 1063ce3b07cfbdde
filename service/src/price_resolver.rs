use std::sync::Arc;

use async_trait::async_trait;
use entities::chain::{DecimalString, TokenId};
use interfaces::registry::{ContractError, MarketplaceRegistry};
use util::amount::format_amount;
use util::retry::RetryPolicy;

use crate::catalog_aggregator::{CatalogError, Enrichment};

/// Looks up listing prices on the marketplace registry.
#[derive(Clone)]
pub struct PriceResolver {
    marketplace: Arc<dyn MarketplaceRegistry + Sync + Send>,
    retry: RetryPolicy,
}

impl PriceResolver {
    pub fn new(marketplace: Arc<dyn MarketplaceRegistry + Sync + Send>, retry: RetryPolicy) -> Self {
        Self { marketplace, retry }
    }

    /// Listing price of the token as a decimal string with up to 18 fractional digits.
    pub async fn price_of(&self, token_id: TokenId) -> Result<DecimalString, ContractError> {
        let listing = self
            .retry
            .run("fetch listing", || self.marketplace.listing(token_id), |_| true)
            .await?;

        Ok(format_amount(listing.price))
    }
}

#[async_trait]
impl Enrichment for PriceResolver {
    type Output = DecimalString;
    const NAME: &'static str = "price";

    async fn enrich(&self, token_id: TokenId) -> Result<DecimalString, CatalogError> {
        Ok(self.price_of(token_id).await?)
    }
}
