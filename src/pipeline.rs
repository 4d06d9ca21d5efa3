//! End-to-end acquisition workflow: catalog lookup, credential exchange,
//! authenticated reads and decoding of an ordered list of SLC segments.

use crate::config::Settings;
use crate::core::{decode_slc, detect};
use crate::io::annotation::{segment_of, Annotation};
use crate::io::catalog::filter_by_prefix;
use crate::io::{CatalogClient, CredentialClient, HttpTransport, ObjectSession, ReqwestTransport};
use crate::types::{
    locator_file_name, GranuleLocator, RasterDims, SlcError, SlcResult, SlcSegment,
    TemporaryCredentials,
};

/// One segment to read: where it lives and its out-of-band dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRequest {
    pub locator: GranuleLocator,
    pub dims: RasterDims,
}

/// The annotation file and SLC segments of a single acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionFiles {
    pub annotation: GranuleLocator,
    /// Ordered by segment number
    pub slcs: Vec<GranuleLocator>,
}

/// What to fetch: dataset, data provider and acquisition file-name prefix
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    pub doi: String,
    pub provider: String,
    pub granule_prefix: String,
}

/// Read, decode and detect one segment
pub fn process_segment(session: &ObjectSession, request: &SegmentRequest) -> SlcResult<SlcSegment> {
    log::info!("Processing segment {} ({})", request.locator, request.dims);

    let bytes = session.read_bytes(&request.locator)?;
    let image = decode_slc(&bytes, request.dims)?;
    let (magnitude, phase) = detect(&image);

    Ok(SlcSegment {
        locator: request.locator.clone(),
        dims: request.dims,
        image,
        magnitude,
        phase,
    })
}

/// Process segments in order; the first failure aborts the run
pub fn process_segments(
    session: &ObjectSession,
    requests: &[SegmentRequest],
) -> SlcResult<Vec<SlcSegment>> {
    requests
        .iter()
        .map(|request| process_segment(session, request))
        .collect()
}

/// Select the annotation and SLC segment locators of one acquisition
pub fn locate_acquisition(links: &[GranuleLocator], prefix: &str) -> SlcResult<AcquisitionFiles> {
    let matching = filter_by_prefix(links, prefix);

    let mut annotations = matching.iter().filter(|l| l.ends_with(".ann"));
    let annotation = annotations
        .next()
        .cloned()
        .ok_or_else(|| SlcError::Metadata(format!("no annotation file for prefix {}", prefix)))?;
    if let Some(extra) = annotations.next() {
        log::warn!("Multiple annotation files for {}; ignoring {}", prefix, extra);
    }

    let mut slcs = Vec::new();
    for locator in matching.iter().filter(|l| l.ends_with(".slc")) {
        let (segment, _) = segment_of(locator)?;
        slcs.push((segment, locator.clone()));
    }
    if slcs.is_empty() {
        return Err(SlcError::Metadata(format!("no SLC segments for prefix {}", prefix)));
    }
    slcs.sort_by_key(|(segment, _)| *segment);

    log::info!(
        "Acquisition {}: annotation {}, {} segment(s)",
        prefix,
        locator_file_name(&annotation),
        slcs.len()
    );

    Ok(AcquisitionFiles {
        annotation,
        slcs: slcs.into_iter().map(|(_, locator)| locator).collect(),
    })
}

/// Build segment requests with dimensions taken from the annotation
pub fn plan_segments(
    annotation: &Annotation,
    slcs: &[GranuleLocator],
) -> SlcResult<Vec<SegmentRequest>> {
    slcs.iter()
        .map(|locator| {
            let (segment, looks) = segment_of(locator)?;
            Ok(SegmentRequest {
                locator: locator.clone(),
                dims: annotation.slc_dims(segment, &looks)?,
            })
        })
        .collect()
}

/// Read the annotation, then decode every segment it describes
pub fn load_acquisition(
    session: &ObjectSession,
    files: &AcquisitionFiles,
) -> SlcResult<Vec<SlcSegment>> {
    let text = session.read_text(&files.annotation)?;
    let annotation = Annotation::parse(&text)?;
    let requests = plan_segments(&annotation, &files.slcs)?;
    process_segments(session, &requests)
}

/// Catalog lookup and credential exchange for an acquisition
pub fn discover_acquisition<T: HttpTransport>(
    transport: &T,
    settings: &Settings,
    request: &AcquisitionRequest,
) -> SlcResult<(AcquisitionFiles, TemporaryCredentials)> {
    let catalog = CatalogClient::new(transport, settings.catalog.clone());
    let links = catalog.search_doi(&request.doi)?;
    let files = locate_acquisition(&links, &request.granule_prefix)?;

    let credentials =
        CredentialClient::new(transport, settings.credentials.clone()).fetch(&request.provider)?;

    Ok((files, credentials))
}

/// Run the full workflow against the live catalog and object store
pub fn fetch_acquisition(
    settings: &Settings,
    request: &AcquisitionRequest,
) -> SlcResult<Vec<SlcSegment>> {
    let transport = ReqwestTransport::new(settings.http_timeout_secs)?;
    let (files, credentials) = discover_acquisition(&transport, settings, request)?;
    let session = ObjectSession::new(credentials, settings.session.clone())?;
    load_acquisition(&session, &files)
}
