use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use entities::chain::TokenId;
use entities::metadata::MetadataRecord;
use futures::future::join_all;
use interfaces::metadata_fetcher::{FetchError, MetadataFetcher};
use interfaces::registry::{AssetRegistry, ContractError};
use thiserror::Error;
use tracing::{debug, warn};
use util::gateway::GatewayResolver;
use util::retry::RetryPolicy;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Step of the per-token pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TokenUri,
    Metadata,
    Enrichment(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub token_id: TokenId,
    pub stage: Stage,
    pub error: CatalogError,
}

impl ItemFailure {
    fn new(token_id: TokenId, stage: Stage, error: impl Into<CatalogError>) -> Self {
        Self { token_id, stage, error: error.into() }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::TokenUri | Stage::Metadata => {
                write!(f, "Error fetching metadata for token ID {}: {}", self.token_id, self.error)
            }
            Stage::Enrichment(what) => write!(f, "Error fetching {what} for token ID {}: {}", self.token_id, self.error),
        }
    }
}

/// Optional per-token step applied after metadata was resolved.
/// Its failure doesn't exclude the token, the token just has no extra data.
#[async_trait]
pub trait Enrichment: Send + Sync {
    type Output: Send;

    /// What the step resolves, used in diagnostics
    const NAME: &'static str;

    async fn enrich(&self, token_id: TokenId) -> Result<Self::Output, CatalogError>;
}

/// Enrichment for catalogs that need metadata only
pub struct NoEnrichment;

#[async_trait]
impl Enrichment for NoEnrichment {
    type Output = ();
    const NAME: &'static str = "nothing";

    async fn enrich(&self, _token_id: TokenId) -> Result<(), CatalogError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem<X> {
    pub token_id: TokenId,
    pub metadata: MetadataRecord,
    /// `None` when the enrichment step failed
    pub extra: Option<X>,
}

/// Result of a batch: resolved tokens in input order plus every failure that happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<X> {
    pub items: Vec<ResolvedItem<X>>,
    pub failures: Vec<ItemFailure>,
}

impl<X> BatchOutcome<X> {
    pub fn last_failure(&self) -> Option<&ItemFailure> {
        self.failures.last()
    }
}

impl<X> Default for BatchOutcome<X> {
    fn default() -> Self {
        Self { items: Vec::new(), failures: Vec::new() }
    }
}

/// Resolves token identifiers into metadata records.
#[derive(Clone)]
pub struct CatalogAggregator {
    resolver: GatewayResolver,
    fetcher: Arc<dyn MetadataFetcher + Sync + Send>,
    retry: RetryPolicy,
}

impl CatalogAggregator {
    pub fn new(resolver: GatewayResolver, fetcher: Arc<dyn MetadataFetcher + Sync + Send>, retry: RetryPolicy) -> Self {
        Self { resolver, fetcher, retry }
    }

    /// Runs the pipeline for all the tokens at once and waits until every one of them settles.
    /// A failing token never affects its siblings, it is left out of the result instead.
    /// ## Args:
    /// * `token_ids` - tokens to resolve, the order is kept in the result
    /// * `registry` - registry the token URIs are read from
    /// * `enrichment` - extra step for every successfully resolved token
    pub async fn aggregate<E: Enrichment>(
        &self,
        token_ids: &[TokenId],
        registry: &(dyn AssetRegistry + Sync + Send),
        enrichment: &E,
    ) -> BatchOutcome<E::Output> {
        let pipelines = token_ids
            .iter()
            .map(|&token_id| self.resolve_token(token_id, registry, enrichment));

        let mut outcome = BatchOutcome::default();

        for settled in join_all(pipelines).await {
            match settled {
                Ok((item, enrichment_failure)) => {
                    outcome.items.push(item);
                    outcome.failures.extend(enrichment_failure);
                }
                Err(failure) => outcome.failures.push(failure),
            }
        }

        debug!(
            "Aggregated {} of {} tokens, {} failures.",
            outcome.items.len(),
            token_ids.len(),
            outcome.failures.len()
        );

        outcome
    }

    async fn resolve_token<E: Enrichment>(
        &self,
        token_id: TokenId,
        registry: &(dyn AssetRegistry + Sync + Send),
        enrichment: &E,
    ) -> Result<(ResolvedItem<E::Output>, Option<ItemFailure>), ItemFailure> {
        let metadata = self
            .fetch_metadata(token_id, registry)
            .await
            .inspect_err(|failure| warn!("{failure}"))?;

        let (extra, failure) = match enrichment.enrich(token_id).await {
            Ok(extra) => (Some(extra), None),
            Err(e) => {
                let failure = ItemFailure::new(token_id, Stage::Enrichment(E::NAME), e);
                warn!("{failure}");
                (None, Some(failure))
            }
        };

        Ok((ResolvedItem { token_id, metadata, extra }, failure))
    }

    async fn fetch_metadata(
        &self,
        token_id: TokenId,
        registry: &(dyn AssetRegistry + Sync + Send),
    ) -> Result<MetadataRecord, ItemFailure> {
        let reference = registry
            .token_uri(token_id)
            .await
            .map_err(|e| ItemFailure::new(token_id, Stage::TokenUri, e))?;

        let url = self.resolver.resolve(&reference);

        self.retry
            .run("fetch metadata", || self.fetcher.fetch(&url), FetchError::is_transient)
            .await
            .map_err(|e| ItemFailure::new(token_id, Stage::Metadata, e))
    }
}
