use std::time::Duration;

use entities::metadata::{MetadataRecord, RawMetadata};
use interfaces::metadata_fetcher::{FetchError, MetadataFetcher};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use util::{config::GatewayCfg, gateway::GatewayResolver, str_util::truncate_chars};

const MIME_JSON: &str = "application/json";
const JSON_SUFFIX: &str = "+json";

/// Fetches token metadata documents from an HTTP gateway.
#[derive(Clone, Debug)]
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
    resolver: GatewayResolver,
    max_error_body_len: usize,
}

impl HttpMetadataFetcher {
    pub fn new(resolver: GatewayResolver, timeout: Duration, max_error_body_len: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, resolver, max_error_body_len })
    }

    pub fn from_cfg(cfg: &GatewayCfg) -> anyhow::Result<Self> {
        let resolver = GatewayResolver::new(&cfg.base_url, &cfg.native_scheme)?;
        Self::new(resolver, cfg.request_timeout(), cfg.max_error_body_len)
    }

    pub fn resolver(&self) -> &GatewayResolver {
        &self.resolver
    }
}

#[async_trait::async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<MetadataRecord, FetchError> {
        debug!("Fetching metadata from '{url}'.");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !content_type.as_deref().is_some_and(is_json_media_type) {
            // a non-JSON body usually is an error page of the gateway, keep it for diagnostics
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ContentType {
                actual: content_type,
                body: truncate_chars(&body, self.max_error_body_len),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let raw: RawMetadata = serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        if raw.image.trim().is_empty() {
            return Err(FetchError::Decode("'image' is empty".to_string()));
        }

        let image_url = self.resolver.resolve(&raw.image);

        Ok(MetadataRecord::from_raw(raw, image_url))
    }
}

/// `application/json`, optionally with parameters, or any `+json` structured syntax type
fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == MIME_JSON || essence.ends_with(JSON_SUFFIX)
}
