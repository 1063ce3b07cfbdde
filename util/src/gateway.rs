//! Resolution of content-addressed references into gateway URLs.
use url::Url;

pub const DEFAULT_NATIVE_SCHEME: &str = "ipfs://";

/// Turns content references into URLs served by an HTTP gateway.
///
/// Resolution is a pure string transformation:
/// * `<native scheme><locator>` - the scheme is replaced with the gateway base
/// * URL that already starts with the gateway base - returned unchanged
/// * any other `http(s)://` URL - returned unchanged, it is fetchable already
/// * anything else is a bare locator, the gateway base is prepended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResolver {
    base: String,
    native_scheme: String,
}

impl GatewayResolver {
    /// ## Args:
    /// * `base_url` - gateway base, e.g. `https://gateway.pinata.cloud/ipfs/`
    /// * `native_scheme` - scheme of the content-addressed store, e.g. `ipfs://`
    pub fn new(base_url: &str, native_scheme: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(base_url)?;
        let base = format!("{}/", parsed.as_str().trim_end_matches('/'));

        Ok(Self { base, native_scheme: native_scheme.to_string() })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn resolve(&self, reference: &str) -> String {
        let reference = reference.trim();

        if let Some(locator) = reference.strip_prefix(&self.native_scheme) {
            return format!("{}{}", self.base, locator.trim_start_matches('/'));
        }
        if reference.starts_with(&self.base) || is_http_url(reference) {
            return reference.to_string();
        }

        format!("{}{}", self.base, reference.trim_start_matches('/'))
    }
}

fn is_http_url(reference: &str) -> bool {
    let lowercase = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lowercase.starts_with("http://") || lowercase.starts_with("https://")
}
