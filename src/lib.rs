//! sarcloud: cloud access to UAVSAR Single-Look-Complex imagery
//!
//! This library finds UAVSAR SLC granules in the Earthdata metadata catalog,
//! exchanges Earthdata credentials for temporary object-store keys, reads the
//! annotation and raster files from S3 and decodes the rasters into complex,
//! magnitude and phase grids.

pub mod types;
pub mod config;
pub mod io;
pub mod core;
pub mod pipeline;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    GranuleLocator, RasterDims, S3Location, SarComplex, SarImage, SarRealImage, SlcError,
    SlcResult, SlcSegment, TemporaryCredentials,
};

pub use config::Settings;
pub use io::{Annotation, CatalogClient, CredentialClient, ObjectSession, ReqwestTransport};
pub use pipeline::{fetch_acquisition, AcquisitionRequest, SegmentRequest};
