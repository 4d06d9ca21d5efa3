//! Runtime configuration for catalog search, credential exchange and object access

use crate::types::{SlcError, SlcResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalog (CMR) search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Search API base URL, without trailing slash
    pub base_url: String,
    /// Granules requested per page
    pub page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cmr.earthdata.nasa.gov/search".to_string(),
            page_size: 2000,
        }
    }
}

/// Trust-broker endpoint parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Endpoint template; `{provider}` is replaced by the lower-cased provider id
    pub endpoint_template: String,
    /// Earthdata Login bearer token, sent when present
    pub bearer_token: Option<String>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            endpoint_template: "https://data.{provider}.earthdata.nasa.gov/s3credentials"
                .to_string(),
            bearer_token: None,
        }
    }
}

impl CredentialConfig {
    pub fn endpoint_for(&self, provider: &str) -> String {
        self.endpoint_template
            .replace("{provider}", &provider.to_lowercase())
    }
}

/// Object-store session parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// AWS region of the data buckets (temporary credentials are same-region only)
    pub region: String,
    /// Custom S3 endpoint, for S3-compatible stores
    pub endpoint: Option<String>,
    /// Permit plain `http://` endpoints; implied by an `http://` endpoint
    pub allow_http: bool,
    /// Per-request cap in seconds, body included; `None` leaves reads unbounded
    pub request_timeout_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            endpoint: None,
            allow_http: false,
            request_timeout_secs: None,
        }
    }
}

impl SessionConfig {
    /// Whether the S3 client may talk plain HTTP
    pub fn allows_http(&self) -> bool {
        self.allow_http
            || self
                .endpoint
                .as_deref()
                .is_some_and(|e| e.to_ascii_lowercase().starts_with("http://"))
    }
}

/// Complete settings for one workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogConfig,
    pub credentials: CredentialConfig,
    pub session: SessionConfig,
    /// HTTP client timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            credentials: CredentialConfig::default(),
            session: SessionConfig::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Defaults overridden by `SARCLOUD_*` / `EARTHDATA_TOKEN` environment variables
    pub fn from_env() -> SlcResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from a JSON file; missing fields fall back to defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SlcResult<Self> {
        let content = std::fs::read_to_string(&path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            SlcError::InvalidFormat(format!(
                "invalid settings file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        settings.check()?;
        Ok(settings)
    }

    fn from_lookup<F>(lookup: F) -> SlcResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(url) = lookup("SARCLOUD_CMR_URL") {
            settings.catalog.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(size) = lookup("SARCLOUD_PAGE_SIZE") {
            settings.catalog.page_size = parse_number("SARCLOUD_PAGE_SIZE", &size)?;
        }
        if let Some(template) = lookup("SARCLOUD_CREDENTIALS_URL") {
            settings.credentials.endpoint_template = template;
        }
        if let Some(token) = lookup("EARTHDATA_TOKEN").filter(|t| !t.is_empty()) {
            settings.credentials.bearer_token = Some(token);
        }
        if let Some(region) = lookup("SARCLOUD_REGION") {
            settings.session.region = region;
        }
        if let Some(endpoint) = lookup("SARCLOUD_S3_ENDPOINT") {
            settings.session.endpoint = Some(endpoint);
        }
        if let Some(flag) = lookup("SARCLOUD_S3_ALLOW_HTTP") {
            settings.session.allow_http = matches!(flag.trim(), "1" | "true" | "yes");
        }
        if let Some(secs) = lookup("SARCLOUD_S3_TIMEOUT_SECS") {
            settings.session.request_timeout_secs =
                Some(parse_number("SARCLOUD_S3_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("SARCLOUD_HTTP_TIMEOUT_SECS") {
            settings.http_timeout_secs = parse_number("SARCLOUD_HTTP_TIMEOUT_SECS", &secs)?;
        }
        settings.check()?;

        log::debug!("Resolved settings: {:?}", settings.redacted());
        Ok(settings)
    }

    fn check(&self) -> SlcResult<()> {
        if self.catalog.page_size == 0 {
            return Err(SlcError::InvalidFormat("catalog page size must be positive".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(SlcError::InvalidFormat("HTTP timeout must be positive".to_string()));
        }
        if self.session.request_timeout_secs == Some(0) {
            return Err(SlcError::InvalidFormat("S3 request timeout must be positive".to_string()));
        }
        Ok(())
    }

    fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        if copy.credentials.bearer_token.is_some() {
            copy.credentials.bearer_token = Some("<redacted>".to_string());
        }
        copy
    }
}

/// HTTP client timeout used when none is configured
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> SlcResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SlcError::InvalidFormat(format!("{} is not a number: '{}'", name, value)))
}
