use async_trait::async_trait;
use entities::metadata::MetadataRecord;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP error! Status: {0}")]
    Http(u16),
    #[error("Expected JSON, got: {}\nResponse: {body}", actual.as_deref().unwrap_or("<none>"))]
    ContentType { actual: Option<String>, body: String },
    #[error("Failed to decode metadata: {0}")]
    Decode(String),
    #[error("Request failed: {0}")]
    Transport(String),
}

impl FetchError {
    /// Only failures that may go away on their own are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Http(status) => *status == 429 || *status >= 500,
            FetchError::ContentType { .. } | FetchError::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait MetadataFetcher {
    /// Fetches and decodes metadata document located at the given URL.
    /// The image reference of the returned record is already resolved.
    async fn fetch(&self, url: &str) -> Result<MetadataRecord, FetchError>;
}
