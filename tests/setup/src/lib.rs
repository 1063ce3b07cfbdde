//! This crate contains utilities for preparing an environment
//! for integration tests, including:
//! * in-process fake gateway
//! * in-memory fake registries

use gateway::{CannedResponse, FakeGateway};
use registry::FakeChain;
use util::config::Settings;
use util::gateway::{GatewayResolver, DEFAULT_NATIVE_SCHEME};

pub mod data_gen;
pub mod gateway;
pub mod registry;

pub struct TestEnvironment {
    pub gateway: FakeGateway,
    pub chain: FakeChain,
}

impl TestEnvironment {
    pub async fn start() -> TestEnvironment {
        let gateway = FakeGateway::start()
            .await
            .unwrap_or_else(|e| panic!("Failed to start fake gateway: {e}"));

        TestEnvironment { gateway, chain: FakeChain::new() }
    }

    pub fn resolver(&self) -> GatewayResolver {
        GatewayResolver::new(&self.gateway.base_url(), DEFAULT_NATIVE_SCHEME).unwrap()
    }

    /// Registers a token end-to-end: token URI on the asset registry,
    /// metadata document and the image reference it points to.
    /// Returns the metadata reference.
    pub fn mint(&self, token_id: u64) -> String {
        let metadata_ref = format!("{}/{token_id}.json", data_gen::rand_content_ref());
        self.chain.assets.set_token_uri(token_id, &metadata_ref);
        self.gateway
            .put(&metadata_ref, CannedResponse::metadata(&format!("ipfs://{}/{token_id}.png", data_gen::rand_content_ref())));
        metadata_ref
    }

    /// Local profile settings pointing to the fake gateway
    pub fn make_test_cfg(&self) -> Settings {
        let config_dir = format!("{}/../../config", env!("CARGO_MANIFEST_DIR"));
        let mut cfg = Settings::from_dir(&config_dir, "local").unwrap();
        cfg.gateway.base_url = self.gateway.base_url();
        cfg.gateway.native_scheme = DEFAULT_NATIVE_SCHEME.to_string();
        cfg.gateway.request_timeout_secs = 5;
        cfg
    }
}
