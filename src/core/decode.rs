use crate::types::{RasterDims, SarComplex, SarImage, SlcError, SlcResult, SAMPLE_SIZE};
use ndarray::Array2;
use std::path::Path;

/// Decode a flat little-endian complex64 buffer into a `rows x cols` SLC raster.
///
/// The buffer must hold exactly `rows * cols * 8` bytes. Anything else,
/// including trailing bytes, is a `DimensionMismatch`.
pub fn decode_slc(bytes: &[u8], dims: RasterDims) -> SlcResult<SarImage> {
    let expected = dims.byte_len()?;
    if bytes.len() != expected {
        return Err(SlcError::DimensionMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    log::debug!("Decoding {} SLC raster", dims);

    let samples = decode_samples(bytes);
    Array2::from_shape_vec((dims.rows, dims.cols), samples)
        .map_err(|e| SlcError::Processing(format!("Failed to shape SLC raster: {}", e)))
}

/// Read and decode a local SLC file, checking its size before reading it
pub fn read_slc_file<P: AsRef<Path>>(path: P, dims: RasterDims) -> SlcResult<SarImage> {
    let path = path.as_ref();
    log::info!("Reading SLC file: {}", path.display());

    let expected = dims.byte_len()?;
    let size = std::fs::metadata(path)?.len();
    let actual = usize::try_from(size).map_err(|_| {
        SlcError::InvalidFormat(format!("{} is too large to load ({} bytes)", path.display(), size))
    })?;
    if actual != expected {
        return Err(SlcError::DimensionMismatch { expected, actual });
    }

    let bytes = std::fs::read(path)?;
    decode_slc(&bytes, dims)
}

/// Encode a raster back into the flat little-endian complex64 layout
pub fn encode_slc(image: &SarImage) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(image.len() * SAMPLE_SIZE);
    for sample in image.iter() {
        bytes.extend_from_slice(&sample.re.to_le_bytes());
        bytes.extend_from_slice(&sample.im.to_le_bytes());
    }
    bytes
}

#[inline]
fn sample_from_chunk(chunk: &[u8]) -> SarComplex {
    let re = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    let im = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
    SarComplex::new(re, im)
}

#[cfg(feature = "parallel")]
fn decode_samples(bytes: &[u8]) -> Vec<SarComplex> {
    use rayon::prelude::*;

    bytes
        .par_chunks_exact(SAMPLE_SIZE)
        .map(sample_from_chunk)
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn decode_samples(bytes: &[u8]) -> Vec<SarComplex> {
    bytes.chunks_exact(SAMPLE_SIZE).map(sample_from_chunk).collect()
}
