use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use entities::chain::Address;
use serde::Serialize;
use serde_json::json;
use service::sync_controller::{SyncError, SyncOutcome, SyncReport, SyncState};
use tracing::info;

use super::service_unavailable;
use crate::rest::{auth::ApiKeyExtractor, web_app::AppState};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub state: SyncState,

    /// Generation of the pass the served catalogs come from
    pub generation: u64,
    pub identity: Option<Address>,
    pub synced_at: Option<DateTime<Utc>>,
}

#[get("/status")]
pub async fn status(state: web::Data<AppState>) -> impl Responder {
    let controller = &state.controller;
    let snapshot = controller.snapshot().await;

    HttpResponse::Ok().json(StatusResponse {
        state: controller.state().await,
        generation: snapshot.generation,
        identity: controller.identity().await,
        synced_at: snapshot.synced_at,
    })
}

#[get("/catalog/listed")]
pub async fn listed_catalog(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.controller.listed_catalog().await)
}

#[get("/catalog/owned")]
pub async fn owned_catalog(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.controller.owned_catalog().await)
}

#[get("/diagnostics")]
pub async fn diagnostics(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "last_error": state.controller.last_error().await,
    }))
}

/// Forces a synchronization pass. Reconnects first if there is no session,
/// e.g. the node was unreachable on start up.
#[post("/sync")]
pub async fn sync(_: ApiKeyExtractor, state: web::Data<AppState>) -> impl Responder {
    match force_sync(&state).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => service_unavailable(&e.to_string()),
    }
}

async fn force_sync(state: &AppState) -> Result<SyncReport, SyncError> {
    let controller = &state.controller;

    match controller.resync().await {
        Err(SyncError::NotConnected) => {
            info!("No session to synchronize, reconnecting.");
            match controller.connect(state.connector.as_ref()).await? {
                SyncOutcome::Synced(report) => Ok(report),
                SyncOutcome::Unchanged => controller.resync().await,
            }
        }
        result => result,
    }
}
