use crate::config::SessionConfig;
use crate::types::{S3Location, SlcError, SlcResult, TemporaryCredentials};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::{aws::AmazonS3Builder, path::Path, ClientOptions, ObjectStore, RetryConfig};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Credential-scoped access to remote objects.
///
/// The session owns its credentials and the per-bucket store clients built
/// from them. Every read checks the credential expiration first.
pub struct ObjectSession {
    credentials: TemporaryCredentials,
    expires_at: DateTime<Utc>,
    config: SessionConfig,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
    runtime: tokio::runtime::Runtime,
}

impl ObjectSession {
    /// Open a session from a credential bundle
    pub fn new(credentials: TemporaryCredentials, config: SessionConfig) -> SlcResult<Self> {
        let expires_at = credentials.expires_at()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        log::info!(
            "Opened object session in {} (credentials valid until {})",
            config.region,
            expires_at
        );

        Ok(Self {
            credentials,
            expires_at,
            config,
            stores: Mutex::new(HashMap::new()),
            runtime,
        })
    }

    /// Register a prebuilt store for `bucket`, bypassing the S3 client
    pub fn with_store(mut self, bucket: &str, store: Arc<dyn ObjectStore>) -> Self {
        self.stores
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(bucket.to_string(), store);
        self
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Fail with `CredentialsExpired` once the credentials have lapsed
    pub fn ensure_valid(&self) -> SlcResult<()> {
        self.ensure_valid_at(Utc::now())
    }

    pub fn ensure_valid_at(&self, now: DateTime<Utc>) -> SlcResult<()> {
        if now >= self.expires_at {
            return Err(SlcError::CredentialsExpired {
                expired_at: self.expires_at,
            });
        }
        Ok(())
    }

    /// Read a small text object (e.g. an annotation file) in full
    pub fn read_text(&self, uri: &str) -> SlcResult<String> {
        let bytes = self.read_bytes(uri)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SlcError::InvalidFormat(format!("{} is not UTF-8 text: {}", uri, e)))
    }

    /// Read a whole object into memory
    pub fn read_bytes(&self, uri: &str) -> SlcResult<Bytes> {
        let (store, path) = self.resolve(uri)?;
        log::debug!("Reading {}", uri);

        let bytes = self.runtime.block_on(async {
            let result = store.get(&path).await?;
            result.bytes().await
        })?;

        log::debug!("Read {} bytes from {}", bytes.len(), uri);
        Ok(bytes)
    }

    /// Read the byte range `range` of an object
    pub fn read_range(&self, uri: &str, range: Range<usize>) -> SlcResult<Bytes> {
        let (store, path) = self.resolve(uri)?;
        log::debug!("Reading {} bytes {:?}", uri, range);

        Ok(self
            .runtime
            .block_on(async { store.get_range(&path, range).await })?)
    }

    /// Size of an object in bytes
    pub fn object_size(&self, uri: &str) -> SlcResult<usize> {
        let (store, path) = self.resolve(uri)?;
        let meta = self.runtime.block_on(async { store.head(&path).await })?;
        Ok(meta.size)
    }

    fn resolve(&self, uri: &str) -> SlcResult<(Arc<dyn ObjectStore>, Path)> {
        self.ensure_valid()?;
        let location = S3Location::parse(uri)?;
        // Keys are taken verbatim; empty segments have no object_store equivalent
        let path = Path::parse(&location.key)
            .map_err(|e| SlcError::InvalidLocator(format!("{}: {}", uri, e)))?;
        let store = self.store_for(&location.bucket)?;
        Ok((store, path))
    }

    fn store_for(&self, bucket: &str) -> SlcResult<Arc<dyn ObjectStore>> {
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&self.config.region)
            .with_access_key_id(&self.credentials.access_key_id)
            .with_secret_access_key(&self.credentials.secret_access_key)
            .with_token(&self.credentials.session_token);

        if let Some(endpoint) = &self.config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        // Unbounded unless configured: a whole-segment read can take minutes
        let options = ClientOptions::new().with_allow_http(self.config.allows_http());
        let options = match self.config.request_timeout_secs {
            Some(secs) => options.with_timeout(Duration::from_secs(secs)),
            None => options.with_timeout_disabled(),
        };
        builder = builder.with_client_options(options).with_retry(RetryConfig {
            max_retries: 0,
            ..Default::default()
        });

        let store: Arc<dyn ObjectStore> = Arc::new(builder.build()?);
        log::debug!("Built S3 client for bucket {}", bucket);
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }
}
