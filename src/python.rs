//! Python module definition

use crate::core::{decode_slc, detect, DisplayScale};
use crate::io::annotation::Annotation;
use crate::pipeline::{fetch_acquisition, AcquisitionRequest};
use crate::types::{RasterDims, SlcError};
use crate::Settings;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn to_py_err(err: SlcError) -> PyErr {
    match err {
        SlcError::DimensionMismatch { .. } | SlcError::InvalidFormat(_) => {
            PyValueError::new_err(err.to_string())
        }
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

type Views<'py> = (&'py PyArray2<f32>, &'py PyArray2<f32>);

/// Decode an SLC buffer and return `(magnitude, phase)` arrays
#[pyfunction]
fn decode<'py>(py: Python<'py>, data: &[u8], rows: usize, cols: usize) -> PyResult<Views<'py>> {
    let image = decode_slc(data, RasterDims::new(rows, cols)).map_err(to_py_err)?;
    let (magnitude, phase) = detect(&image);
    Ok((magnitude.into_pyarray(py), phase.into_pyarray(py)))
}

/// `(rows, cols)` of an SLC segment from annotation text
#[pyfunction]
fn annotation_dims(text: &str, segment: u32, looks: &str) -> PyResult<(usize, usize)> {
    let annotation = Annotation::parse(text).map_err(to_py_err)?;
    let dims = annotation.slc_dims(segment, looks).map_err(to_py_err)?;
    Ok((dims.rows, dims.cols))
}

/// Fetch an acquisition end to end; returns `[(locator, magnitude, phase), ...]`
#[pyfunction]
fn fetch<'py>(
    py: Python<'py>,
    doi: String,
    provider: String,
    granule_prefix: String,
) -> PyResult<Vec<(String, &'py PyArray2<f32>, &'py PyArray2<f32>)>> {
    let settings = Settings::from_env().map_err(to_py_err)?;
    let request = AcquisitionRequest {
        doi,
        provider,
        granule_prefix,
    };

    let segments = py
        .allow_threads(|| fetch_acquisition(&settings, &request))
        .map_err(to_py_err)?;

    Ok(segments
        .into_iter()
        .map(|s| (s.locator, s.magnitude.into_pyarray(py), s.phase.into_pyarray(py)))
        .collect())
}

/// Display bounds `(min, max)` for `"magnitude"` or `"phase"`
#[pyfunction]
fn display_bounds(kind: &str) -> PyResult<(f32, f32)> {
    let scale = match kind.to_lowercase().as_str() {
        "magnitude" => DisplayScale::magnitude(),
        "phase" => DisplayScale::phase(),
        _ => {
            return Err(PyValueError::new_err(format!(
                "Invalid display kind: {}",
                kind
            )))
        }
    };
    Ok((scale.min, scale.max))
}

#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add_function(wrap_pyfunction!(annotation_dims, m)?)?;
    m.add_function(wrap_pyfunction!(fetch, m)?)?;
    m.add_function(wrap_pyfunction!(display_bounds, m)?)?;
    Ok(())
}
