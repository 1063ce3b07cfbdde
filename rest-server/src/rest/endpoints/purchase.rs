use actix_web::{post, web, HttpResponse, Responder};
use entities::chain::{Confirmation, TokenId, TxHash};
use serde::{Deserialize, Serialize};
use service::purchase_executor::PurchaseError;
use tracing::warn;

use super::{bad_gateway, bad_request, service_unavailable};
use crate::rest::{auth::ApiKeyExtractor, web_app::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub token_id: TokenId,

    /// Decimal price as served in the listed catalog, e.g. `"0.25"`
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Buys a listed token and waits for the confirmation.
#[post("/purchase")]
pub async fn purchase(_: ApiKeyExtractor, req: web::Json<PurchaseRequest>, state: web::Data<AppState>) -> impl Responder {
    match state.controller.buy(req.token_id, &req.price).await {
        Ok(Confirmation { tx_hash, block_number }) => {
            if state.resync_after_purchase {
                if let Err(e) = state.controller.resync().await {
                    warn!("Synchronization after purchase of token ID {} failed: {e}.", req.token_id);
                }
            }
            HttpResponse::Ok().json(PurchaseResponse { tx_hash, block_number })
        }
        Err(e @ PurchaseError::InvalidPrice(_)) => bad_request(&e.to_string()),
        Err(e @ PurchaseError::NotConnected) => service_unavailable(&e.to_string()),
        Err(e) => bad_gateway(&e.to_string()),
    }
}
