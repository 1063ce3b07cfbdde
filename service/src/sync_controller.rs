//! Keeps the listed and owned catalogs in sync with the session.
//!
//! Every change of the session key (registries + identity) starts a new synchronization
//! pass with its own generation number. A pass rebuilds both catalogs from scratch and
//! publishes them together. Passes that were superseded by a session change are dropped,
//! so readers only ever see catalogs produced by one pass of the current session.
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use entities::catalog::{CatalogItem, CatalogSnapshot, OwnedItem};
use entities::chain::{Address, Confirmation, DecimalString, SessionKey, TokenId};
use interfaces::registry::ContractError;
use interfaces::session::{ConnectionError, Session, SessionConnector};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use util::retry::RetryPolicy;

use crate::catalog_aggregator::{BatchOutcome, CatalogAggregator, ItemFailure, NoEnrichment};
use crate::diagnostics::LastError;
use crate::price_resolver::PriceResolver;
use crate::purchase_executor::{PurchaseError, PurchaseExecutor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SyncState {
    Uninitialized,
    Connecting,
    Ready,
    Syncing,
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Not connected, no session to synchronize")]
    NotConnected,
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Summary of one catalog within a pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    pub resolved: usize,
    pub failed: usize,
    /// Set when the identifiers couldn't be enumerated, the catalog is left as it was
    pub enumeration_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub generation: u64,
    /// `false` if a newer session superseded the pass before it finished
    pub published: bool,
    pub listed: CatalogReport,
    pub owned: CatalogReport,
    #[serde(skip)]
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The session key didn't change, nothing to do
    Unchanged,
    Synced(SyncReport),
}

type CatalogResult<X> = Result<BatchOutcome<X>, ContractError>;

/// Decrements the in-flight counter even if the pass future is dropped midway
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct SyncController {
    aggregator: CatalogAggregator,
    retry: RetryPolicy,
    confirmation_timeout: Duration,
    session: RwLock<Option<Session>>,
    phase: RwLock<SyncState>,
    in_flight: AtomicUsize,
    generation: AtomicU64,
    published: RwLock<CatalogSnapshot>,
    last_error: LastError,
}

impl SyncController {
    pub fn new(aggregator: CatalogAggregator, retry: RetryPolicy, confirmation_timeout: Duration) -> Self {
        Self {
            aggregator,
            retry,
            confirmation_timeout,
            session: RwLock::new(None),
            phase: RwLock::new(SyncState::Uninitialized),
            in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            published: RwLock::new(CatalogSnapshot::default()),
            last_error: LastError::default(),
        }
    }

    /// Establishes the session and runs the first pass.
    /// A failed connection moves the controller to [`SyncState::Failed`] and drops the current session,
    /// the catalogs published so far are kept.
    pub async fn connect(&self, connector: &(dyn SessionConnector + Sync + Send)) -> Result<SyncOutcome, SyncError> {
        *self.phase.write().await = SyncState::Connecting;

        match connector.connect().await {
            Ok(session) => {
                info!("Connected: {:?}.", session.key());
                *self.phase.write().await = SyncState::Ready;
                Ok(self.trigger(session).await)
            }
            Err(e) => {
                error!("Error connecting to provider: {e}");
                self.session.write().await.take();
                *self.phase.write().await = SyncState::Failed(e.to_string());
                self.last_error
                    .record(self.generation(), format!("Error connecting to provider: {e}"))
                    .await;
                Err(e.into())
            }
        }
    }

    /// Adopts the session and synchronizes if its key differs from the current one.
    pub async fn trigger(&self, session: Session) -> SyncOutcome {
        let key = session.key();
        {
            let mut current = self.session.write().await;
            if current.as_ref().map(Session::key) == Some(key) {
                debug!("Session {key:?} didn't change, skipping synchronization.");
                return SyncOutcome::Unchanged;
            }
            *current = Some(session.clone());
            // a bound session is ready regardless of how it was obtained
            *self.phase.write().await = SyncState::Ready;
        }

        SyncOutcome::Synced(self.run_pass(session).await)
    }

    /// Runs a new pass for the current session regardless of whether anything changed.
    pub async fn resync(&self) -> Result<SyncReport, SyncError> {
        let session = self.session.read().await.clone().ok_or(SyncError::NotConnected)?;
        Ok(self.run_pass(session).await)
    }

    /// Buys the token against the current session's marketplace.
    /// Catalogs aren't touched, call [`SyncController::resync`] to see the effect.
    pub async fn buy(&self, token_id: TokenId, price: &str) -> Result<Confirmation, PurchaseError> {
        let marketplace = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.marketplace.clone())
            .ok_or(PurchaseError::NotConnected)?;

        let executor = PurchaseExecutor::new(marketplace, self.confirmation_timeout);

        match executor.purchase(token_id, price).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                self.last_error
                    .record(self.generation(), format!("Error during purchase: {e}"))
                    .await;
                Err(e)
            }
        }
    }

    /// A pass in flight reports [`SyncState::Syncing`], also while a reconnection is under way.
    /// A failed connection is reported as is, since its session is gone and the pass won't publish.
    pub async fn state(&self) -> SyncState {
        let phase = self.phase.read().await.clone();
        match phase {
            SyncState::Failed(_) => phase,
            _ if self.in_flight.load(Ordering::SeqCst) > 0 => SyncState::Syncing,
            _ => phase,
        }
    }

    pub async fn listed_catalog(&self) -> Vec<CatalogItem> {
        self.published.read().await.listed.clone()
    }

    pub async fn owned_catalog(&self) -> Vec<OwnedItem> {
        self.published.read().await.owned.clone()
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.published.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.get().await
    }

    pub async fn identity(&self) -> Option<Address> {
        self.session.read().await.as_ref().map(|s| s.identity)
    }

    /// Generation of the most recently started pass
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn run_pass(&self, session: Session) -> SyncReport {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.in_flight);

        info!("Synchronization pass #{generation} started for {:?}.", session.key());

        let (listed, owned) = tokio::join!(self.sync_listed(&session), self.sync_owned(&session));

        self.publish(generation, session.key(), listed, owned).await
    }

    async fn sync_listed(&self, session: &Session) -> CatalogResult<DecimalString> {
        let token_ids = session.marketplace.listed_token_ids().await?;
        let prices = PriceResolver::new(session.marketplace.clone(), self.retry);

        Ok(self
            .aggregator
            .aggregate(&token_ids, session.asset_registry.as_ref(), &prices)
            .await)
    }

    async fn sync_owned(&self, session: &Session) -> CatalogResult<()> {
        let token_ids = session.asset_registry.tokens_of_owner(session.identity).await?;

        Ok(self
            .aggregator
            .aggregate(&token_ids, session.asset_registry.as_ref(), &NoEnrichment)
            .await)
    }

    async fn publish(
        &self,
        generation: u64,
        key: SessionKey,
        listed: CatalogResult<DecimalString>,
        owned: CatalogResult<()>,
    ) -> SyncReport {
        let mut failures = Vec::new();
        let mut diagnostic = None;

        let (listed_items, listed_report) = match listed {
            Ok(outcome) => {
                let report = batch_report(&outcome, &mut failures, &mut diagnostic);
                let items = outcome
                    .items
                    .into_iter()
                    .map(|item| CatalogItem {
                        token_id: item.token_id,
                        image_url: item.metadata.image_url,
                        name: item.metadata.name,
                        price: item.extra,
                    })
                    .collect::<Vec<_>>();
                (Some(items), report)
            }
            Err(e) => {
                let message = format!("Error fetching token URIs: {e}");
                warn!("{message}");
                diagnostic = Some(message.clone());
                (None, CatalogReport { enumeration_error: Some(message), ..Default::default() })
            }
        };

        let (owned_items, owned_report) = match owned {
            Ok(outcome) => {
                let report = batch_report(&outcome, &mut failures, &mut diagnostic);
                let items = outcome
                    .items
                    .into_iter()
                    .map(|item| OwnedItem {
                        token_id: item.token_id,
                        image_url: item.metadata.image_url,
                        name: item.metadata.name,
                    })
                    .collect::<Vec<_>>();
                (Some(items), report)
            }
            Err(e) => {
                let message = format!("Error fetching asset URIs: {e}");
                warn!("{message}");
                diagnostic = Some(message.clone());
                (None, CatalogReport { enumeration_error: Some(message), ..Default::default() })
            }
        };

        let published = {
            let mut snapshot = self.published.write().await;
            let is_current_session = self.session.read().await.as_ref().map(Session::key) == Some(key);

            if is_current_session && generation > snapshot.generation {
                if let Some(items) = listed_items {
                    snapshot.listed = items;
                }
                if let Some(items) = owned_items {
                    snapshot.owned = items;
                }
                snapshot.generation = generation;
                snapshot.synced_at = Some(Utc::now());
                self.last_error.set(generation, diagnostic).await;
                true
            } else {
                false
            }
        };

        if published {
            info!(
                "Synchronization pass #{generation} published {} listed and {} owned tokens, {} failures.",
                listed_report.resolved,
                owned_report.resolved,
                failures.len()
            );
        } else {
            info!("Synchronization pass #{generation} was superseded, its result is dropped.");
        }

        SyncReport { generation, published, listed: listed_report, owned: owned_report, failures }
    }
}

fn batch_report<X>(
    outcome: &BatchOutcome<X>,
    failures: &mut Vec<ItemFailure>,
    diagnostic: &mut Option<String>,
) -> CatalogReport {
    if let Some(last) = outcome.last_failure() {
        *diagnostic = Some(last.to_string());
    }
    failures.extend(outcome.failures.iter().cloned());

    CatalogReport { resolved: outcome.items.len(), failed: outcome.failures.len(), enumeration_error: None }
}
