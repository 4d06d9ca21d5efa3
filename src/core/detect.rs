use crate::types::{SarComplex, SarImage, SarReal, SarRealImage};
use std::f32::consts::PI;

/// Magnitude `|z|` of every sample
pub fn magnitude(image: &SarImage) -> SarRealImage {
    map_samples(image, |z| z.norm())
}

/// Phase `atan2(im, re)` of every sample, in `(-pi, pi]`
pub fn phase(image: &SarImage) -> SarRealImage {
    map_samples(image, sample_phase)
}

/// Magnitude and phase views of an SLC raster
pub fn detect(image: &SarImage) -> (SarRealImage, SarRealImage) {
    log::debug!("Deriving magnitude and phase for {:?} raster", image.dim());
    (magnitude(image), phase(image))
}

#[inline]
fn sample_phase(z: &SarComplex) -> SarReal {
    let angle = z.im.atan2(z.re);
    // atan2 yields -pi for a negative real axis with -0.0 imaginary part
    if angle <= -PI {
        PI
    } else {
        angle
    }
}

#[cfg(feature = "parallel")]
fn map_samples<F>(image: &SarImage, f: F) -> SarRealImage
where
    F: Fn(&SarComplex) -> SarReal + Sync + Send,
{
    ndarray::Zip::from(image).par_map_collect(|z| f(z))
}

#[cfg(not(feature = "parallel"))]
fn map_samples<F>(image: &SarImage, f: F) -> SarRealImage
where
    F: Fn(&SarComplex) -> SarReal + Sync + Send,
{
    image.map(|z| f(z))
}
