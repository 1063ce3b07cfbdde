use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::{DecimalString, TokenId};

/// Token that is currently listed for sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub token_id: TokenId,
    pub image_url: String,
    pub name: Option<String>,

    /// `None` while the price is unresolved. It is a display state, not an error.
    pub price: Option<DecimalString>,
}

/// Token owned by the session identity. Ownership doesn't imply a listing,
/// hence no price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedItem {
    pub token_id: TokenId,
    pub image_url: String,
    pub name: Option<String>,
}

/// Both catalogs as published by a single synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Generation of the pass that published this snapshot, `0` if nothing was published yet.
    pub generation: u64,
    pub listed: Vec<CatalogItem>,
    pub owned: Vec<OwnedItem>,
    pub synced_at: Option<DateTime<Utc>>,
}
