//! This module contain application configuration related functionality.
//!
//! All the application configurations should be set in corresponding
//! TOML file in `config` directory.
use config::{Config, ConfigError, Environment, File};

use crate::retry::RetryPolicy;
use crate::str_util::{mask_creds, mask_url_passwd};
use entities::api_key::ApiKeys;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;
use std::{
    fmt,
    path::{Path, PathBuf},
};

const DEFAULT_CONFIG_FILE_PREFIX: &str = "config";
const DEFAULT_CONFIG_FILE_NAME: &str = "default.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvProfile {
    Prod,
    Local,
    Dev,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestServerCfg {
    pub port: u16,
    pub host: Ipv4Addr,
    pub log_level: String,
    #[serde(default)]
    pub api_keys: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayCfg {
    /// HTTP(S) base every content reference is resolved against,
    /// e.g. `https://gateway.pinata.cloud/ipfs/`
    pub base_url: String,
    /// Scheme of content-addressed references that is rewritten to `base_url`
    pub native_scheme: String,
    pub request_timeout_secs: u64,
    /// Gateway error pages are captured into diagnostics up to this length
    pub max_error_body_len: usize,
}

impl GatewayCfg {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Clone)]
pub struct ChainCfg {
    pub rpc_url: String,
    pub asset_registry: String,
    pub marketplace: String,
    pub private_key: Option<String>,
    pub confirmations: usize,
    pub confirmation_timeout_secs: u64,
}

impl ChainCfg {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

impl fmt::Debug for ChainCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCfg")
            .field("rpc_url", &mask_url_passwd(&self.rpc_url))
            .field("asset_registry", &self.asset_registry)
            .field("marketplace", &self.marketplace)
            .field("private_key", &self.private_key.as_ref().map(|s| mask_creds(s)))
            .field("confirmations", &self.confirmations)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryCfg {
    pub attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl From<&RetryCfg> for RetryPolicy {
    fn from(cfg: &RetryCfg) -> Self {
        RetryPolicy::new(
            cfg.attempts,
            Duration::from_millis(cfg.initial_backoff_ms),
            Duration::from_millis(cfg.max_backoff_ms),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncCfg {
    /// `0` disables periodic re-synchronization
    pub refresh_interval_secs: u64,
    pub resync_after_purchase: bool,
    pub retry: RetryCfg,
}

impl SyncCfg {
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub rest_server: RestServerCfg,
    pub gateway: GatewayCfg,
    pub chain: ChainCfg,
    pub sync: SyncCfg,
    pub env: EnvProfile,
}

impl Settings {
    pub fn for_env(env_name: &str) -> Result<Self, ConfigError> {
        Settings::load(Some(env_name), None)
    }

    /// Loads configuration from the given directory instead of the one
    /// pointed by `RUN_CONFIG_DIR`.
    pub fn from_dir(config_dir: &str, env_name: &str) -> Result<Self, ConfigError> {
        Settings::load(Some(env_name), Some(config_dir))
    }

    /// This method should be used for production.
    /// It loads application configuration based on the environment variables.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Result<Self, ConfigError> {
        Settings::load(None, None)
    }

    pub fn is_production_profile(&self) -> bool {
        self.env.eq(&EnvProfile::Prod)
    }

    pub fn rest_api_keys(&self) -> ApiKeys {
        self.rest_server.api_keys.iter().map(String::as_str).collect()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.sync.retry)
    }

    fn load(env_name: Option<&str>, config_path: Option<&str>) -> Result<Self, ConfigError> {
        let configs_path = config_path.map(|s| s.to_string()).unwrap_or(
            std::env::var("RUN_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_FILE_PREFIX.to_string()),
        );

        let env = env_name
            .map(|s| s.to_string())
            .unwrap_or(std::env::var("RUN_ENV").unwrap_or_else(|_| "local".into()));
        println!("Using profile: {}", &env);

        let configs_dir = config_dir_path(&configs_path);

        let raw_config = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::from(configs_dir.join(DEFAULT_CONFIG_FILE_NAME).as_path()))
            // Add in the current environment file, this file is _optional_
            .add_source(File::with_name(&configs_dir.join(&env).to_string_lossy()).required(false))
            // Add in settings from the environment (with a prefix of APP)
            // Eg.. `APP__REST_SERVER__PORT=8081 ./target/app` would set the `port` key
            .add_source(Environment::with_prefix("app").separator("__"))
            .set_override("env", env)?
            .build()?;

        raw_config.try_deserialize()
    }
}

fn config_dir_path(base_path: &str) -> PathBuf {
    // Check if the base path is a full path
    let full_path = Path::new(base_path);
    if full_path.is_absolute() || full_path.exists() {
        return full_path.to_owned();
    }

    // it's OK to unwrap(), since it's the initialization phase,
    // and it's better to fail fast in case of a problem.
    let current_dir = std::env::current_dir().unwrap();

    let config_dir = current_dir.join(base_path);
    if config_dir.exists() {
        return config_dir;
    }

    // crates are run from their own directory by cargo, the config lives in the workspace root
    current_dir.parent().map(|p| p.join(base_path)).unwrap_or(config_dir)
}
