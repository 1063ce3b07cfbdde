
use std::sync::Arc;
use std::time::Duration;

use rest_server::rest::sync_tasks::run_sync_tasks;
use service::sync_controller::SyncState;
use setup::registry::FakeConnector;
use setup::TestEnvironment;
use test_app_util::make_app_state;

#[actix_web::test]
async fn test_catalogs_are_refreshed_periodically() {
    let t_env = TestEnvironment::start().await;
    t_env.mint(1);
    t_env.mint(2);
    t_env.chain.assets.set_owned(t_env.chain.identity, vec![1]);

    let connector = Arc::new(FakeConnector(Ok(t_env.chain.session())));
    let state = make_app_state(&t_env.make_test_cfg(), connector);

    actix_web::rt::spawn(run_sync_tasks(
        state.controller.clone(),
        state.connector.clone(),
        Some(Duration::from_millis(100)),
    ));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(state.controller.state().await, SyncState::Ready);
    assert_eq!(state.controller.owned_catalog().await.len(), 1);

    // ownership changed by another party
    t_env.chain.assets.set_owned(t_env.chain.identity, vec![1, 2]);
    t_env.chain.marketplace.set_listed(vec![2]);
    tokio::time::sleep(Duration::from_millis(400)).await;

    let owned = state.controller.owned_catalog().await;
    assert_eq!(owned.iter().map(|i| i.token_id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(state.controller.listed_catalog().await.len(), 1);
    assert!(state.controller.generation() >= 3);
}

#[actix_web::test]
async fn test_without_refresh_interval_only_connects() {
    let t_env = TestEnvironment::start().await;
    t_env.mint(1);
    t_env.chain.assets.set_owned(t_env.chain.identity, vec![1]);

    let connector = Arc::new(FakeConnector(Ok(t_env.chain.session())));
    let state = make_app_state(&t_env.make_test_cfg(), connector);

    run_sync_tasks(state.controller.clone(), state.connector.clone(), None).await;

    assert_eq!(state.controller.generation(), 1);
    assert_eq!(state.controller.owned_catalog().await.len(), 1);
}
