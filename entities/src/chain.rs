use serde::{Deserialize, Serialize};

pub use ethers::types::{Address, TxHash, U256};

/// Registry-scoped token identifier.
pub type TokenId = u64;

/// Fixed-point amount in the chain's smallest denomination (18 decimals).
pub type Amount = U256;

/// Opaque locator of a piece of content in a content-addressed store.
/// Never fetchable as is, see `util::gateway::GatewayResolver`.
pub type ContentReference = String;

/// Amount rendered as a decimal string, e.g. `"0.25"`.
pub type DecimalString = String;

/// Number of fractional digits of [`Amount`].
pub const AMOUNT_DECIMALS: u32 = 18;

/// Marketplace listing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub token_id: TokenId,

    /// Account that put the token on sale.
    pub seller: Address,

    /// Asking price in the smallest denomination.
    pub price: Amount,
}

/// Identifies everything a synchronization pass depends on.
/// Any change of one of the three values means the catalogs have to be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub asset_registry: Address,
    pub marketplace: Address,
    pub identity: Address,
}

/// Receipt data of a confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}
