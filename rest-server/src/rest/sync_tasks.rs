use std::sync::Arc;
use std::time::Duration;

use interfaces::session::SessionConnector;
use service::sync_controller::SyncController;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Connects and, if `refresh_interval` is set, keeps re-synchronizing so that
/// listings and ownership changed by other parties are picked up.
pub async fn run_sync_tasks(
    controller: Arc<SyncController>,
    connector: Arc<dyn SessionConnector + Sync + Send>,
    refresh_interval: Option<Duration>,
) {
    if let Err(e) = controller.connect(connector.as_ref()).await {
        warn!("Initial connection failed: {e}. Use 'POST /sync' to retry.");
    }

    let Some(period) = refresh_interval else {
        return;
    };

    info!("Refreshing catalogs every {period:?}.");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // first tick completes immediately, the pass after connecting covers it
    interval.tick().await;

    loop {
        interval.tick().await;
        match controller.resync().await {
            Ok(report) => debug!("Periodic pass #{} done, published: {}.", report.generation, report.published),
            Err(e) => debug!("Periodic pass skipped: {e}."),
        }
    }
}
