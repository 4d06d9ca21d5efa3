use crate::config::CredentialConfig;
use crate::io::http::HttpTransport;
use crate::types::{SlcError, SlcResult, TemporaryCredentials};

/// Trust-broker client issuing short-lived object-store credentials.
///
/// No caching or renewal: callers re-fetch before the reported expiration.
pub struct CredentialClient<T: HttpTransport> {
    transport: T,
    config: CredentialConfig,
}

impl<T: HttpTransport> CredentialClient<T> {
    pub fn new(transport: T, config: CredentialConfig) -> Self {
        Self { transport, config }
    }

    /// Fetch a credential bundle for a data provider (e.g. `ASF`)
    pub fn fetch(&self, provider: &str) -> SlcResult<TemporaryCredentials> {
        let url = self.config.endpoint_for(provider);
        log::info!("Requesting temporary credentials from {}", url);

        let body = self
            .transport
            .get(&url, &[], self.config.bearer_token.as_deref())?;

        let credentials: TemporaryCredentials = serde_json::from_str(&body)
            .map_err(|e| SlcError::MalformedResponse(format!("credential response: {}", e)))?;

        log::info!(
            "Obtained credentials {} expiring {}",
            credentials.access_key_id,
            credentials.expiration
        );
        Ok(credentials)
    }
}
