use chrono::{DateTime, FixedOffset, Utc};
use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Complex-valued SLC sample (I + jQ)
pub type SarComplex = Complex<f32>;

/// Real-valued magnitude or phase data
pub type SarReal = f32;

/// 2D complex SLC raster (rows x columns)
pub type SarImage = Array2<SarComplex>;

/// 2D real raster (rows x columns)
pub type SarRealImage = Array2<SarReal>;

/// Object-store URI of one granule file, e.g. `s3://bucket/path/file.slc`
pub type GranuleLocator = String;

/// Bytes per complex sample: 4-byte real + 4-byte imaginary
pub const SAMPLE_SIZE: usize = 8;

/// Raster dimensions, supplied out-of-band (annotation file or caller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterDims {
    pub rows: usize,
    pub cols: usize,
}

impl RasterDims {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn sample_count(&self) -> SlcResult<usize> {
        self.rows
            .checked_mul(self.cols)
            .ok_or_else(|| SlcError::InvalidFormat(format!("raster {} overflows usize", self)))
    }

    /// Exact payload length in bytes for these dimensions
    pub fn byte_len(&self) -> SlcResult<usize> {
        self.sample_count()?
            .checked_mul(SAMPLE_SIZE)
            .ok_or_else(|| SlcError::InvalidFormat(format!("raster {} overflows usize", self)))
    }
}

impl std::fmt::Display for RasterDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Bucket/key pair parsed from an `s3://` locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    pub fn parse(uri: &str) -> SlcResult<Self> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| SlcError::InvalidLocator(format!("not an s3:// URI: {}", uri)))?;

        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ => Err(SlcError::InvalidLocator(format!(
                "missing bucket or key in: {}",
                uri
            ))),
        }
    }

    /// Last path component of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// File name component of any locator, `s3://` or not
pub fn locator_file_name(locator: &str) -> &str {
    locator.rsplit('/').next().unwrap_or(locator)
}

/// Short-lived, read-only object-store credentials issued by a trust broker.
///
/// Fields are kept exactly as received; `expiration` stays the raw string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
}

impl TemporaryCredentials {
    /// Parse the expiration timestamp.
    ///
    /// Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS+HH:MM` form used by
    /// the Earthdata credential endpoints.
    pub fn expires_at(&self) -> SlcResult<DateTime<Utc>> {
        let raw = self.expiration.trim();
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z"))
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                SlcError::MalformedResponse(format!(
                    "unparsable credential expiration '{}': {}",
                    self.expiration, e
                ))
            })
    }

    /// Whether the credentials are expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> SlcResult<bool> {
        Ok(now >= self.expires_at()?)
    }
}

impl std::fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// One decoded SLC segment with its derived views
#[derive(Debug, Clone)]
pub struct SlcSegment {
    pub locator: GranuleLocator,
    pub dims: RasterDims,
    pub image: SarImage,
    pub magnitude: SarRealImage,
    pub phase: SarRealImage,
}

/// Error types for catalog, credential, object access and decode operations
#[derive(Debug, thiserror::Error)]
pub enum SlcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request to {url} failed with status {status}")]
    Http { url: String, status: u16 },

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("No collection found for DOI: {0}")]
    CollectionNotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Temporary credentials expired at {expired_at}")]
    CredentialsExpired { expired_at: DateTime<Utc> },

    #[error("Invalid object locator: {0}")]
    InvalidLocator(String),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Dimension mismatch: expected {expected} bytes, buffer holds {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for SLC operations
pub type SlcResult<T> = Result<T, SlcError>;
