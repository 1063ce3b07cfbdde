use actix_web::web::{Data, ServiceConfig};
use actix_web::{App, HttpServer};
use evm_integration::session_connector_evm::EvmSessionConnector;
use gateway::metadata_fetcher_http::HttpMetadataFetcher;
use interfaces::session::SessionConnector;
use io::Result;
use service::catalog_aggregator::CatalogAggregator;
use service::sync_controller::SyncController;
use std::{io, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;
use util::config::Settings;

use crate::rest::auth::ApiKeysProviderCtx;
use crate::rest::endpoints::catalog::{diagnostics, listed_catalog, owned_catalog, status, sync};
use crate::rest::endpoints::health_check::health;
use crate::rest::endpoints::purchase::purchase;
use crate::rest::sync_tasks::run_sync_tasks;

pub async fn start_up_rest_server(cfg: &Settings) -> Result<()> {
    info!("Starting server");

    let app_state = AppState::create_app_state(cfg).unwrap_or_else(|e| panic!("Failed to init 'AppState' cause: {e}"));
    info!("Chain: {:?}.", cfg.chain);

    actix_web::rt::spawn(run_sync_tasks(
        app_state.controller.clone(),
        app_state.connector.clone(),
        cfg.sync.refresh_interval(),
    ));

    let cfg_clone = cfg.clone();

    HttpServer::new(move || {
        App::new()
            .configure(app_state.make_endpoints(&cfg_clone))
            .wrap(TracingLogger::default())
    })
    .bind((cfg.rest_server.host, cfg.rest_server.port))?
    .run()
    .await?;

    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SyncController>,
    pub connector: Arc<dyn SessionConnector + Sync + Send>,
    pub resync_after_purchase: bool,
}

impl AppState {
    pub fn create_app_state(cfg: &Settings) -> anyhow::Result<AppState> {
        let connector = Arc::new(EvmSessionConnector::from_cfg(&cfg.chain));
        AppState::with_connector(cfg, connector)
    }

    /// Same as [`AppState::create_app_state`] but sessions come from the given connector.
    pub fn with_connector(
        cfg: &Settings,
        connector: Arc<dyn SessionConnector + Sync + Send>,
    ) -> anyhow::Result<AppState> {
        let fetcher = HttpMetadataFetcher::from_cfg(&cfg.gateway)?;
        let resolver = fetcher.resolver().clone();
        let aggregator = CatalogAggregator::new(resolver, Arc::new(fetcher), cfg.retry_policy());
        let controller = SyncController::new(aggregator, cfg.retry_policy(), cfg.chain.confirmation_timeout());

        Ok(AppState {
            controller: Arc::new(controller),
            connector,
            resync_after_purchase: cfg.sync.resync_after_purchase,
        })
    }

    pub fn make_endpoints(&self, cfg: &Settings) -> impl FnOnce(&mut ServiceConfig) + '_ {
        let api_keys_provider_ctx = ApiKeysProviderCtx { api_keys: cfg.rest_api_keys() };
        let app_state = self.clone();

        |serv_cfg: &mut ServiceConfig| {
            serv_cfg
                .app_data(Data::new(api_keys_provider_ctx))
                .app_data(Data::new(app_state))
                .service(health)
                .service(status)
                .service(listed_catalog)
                .service(owned_catalog)
                .service(diagnostics)
                .service(sync)
                .service(purchase);
        }
    }
}
