use approx::assert_abs_diff_eq;
use sarcloud::core::{decode_slc, detect, encode_slc};
use sarcloud::{RasterDims, SarComplex, SlcError};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// 4x3 synthetic raster with hand-computed magnitude and phase
fn reference() -> Vec<((f32, f32), f32, f32)> {
    let atan_4_3 = 0.927_295_2_f32;
    vec![
        ((3.0, 4.0), 5.0, atan_4_3),
        ((1.0, 0.0), 1.0, 0.0),
        ((0.0, 1.0), 1.0, FRAC_PI_2),
        ((-1.0, 0.0), 1.0, PI),
        ((0.0, -1.0), 1.0, -FRAC_PI_2),
        ((1.0, 1.0), std::f32::consts::SQRT_2, FRAC_PI_4),
        ((-1.0, -1.0), std::f32::consts::SQRT_2, -3.0 * FRAC_PI_4),
        ((0.0, 0.0), 0.0, 0.0),
        ((-3.0, 4.0), 5.0, PI - atan_4_3),
        ((0.5, 0.0), 0.5, 0.0),
        ((2.0, -2.0), 2.0 * std::f32::consts::SQRT_2, -FRAC_PI_4),
        ((-1.0, 1.0), std::f32::consts::SQRT_2, 3.0 * FRAC_PI_4),
    ]
}

fn buffer() -> Vec<u8> {
    reference()
        .iter()
        .flat_map(|((re, im), _, _)| {
            let mut sample = re.to_le_bytes().to_vec();
            sample.extend_from_slice(&im.to_le_bytes());
            sample
        })
        .collect()
}

#[test]
fn test_four_by_three_matches_reference() {
    let dims = RasterDims::new(4, 3);
    let image = decode_slc(&buffer(), dims).unwrap();
    assert_eq!(image.dim(), (4, 3));

    let (magnitude, phase) = detect(&image);

    for (i, ((re, im), mag, ph)) in reference().into_iter().enumerate() {
        let (row, col) = (i / 3, i % 3);
        assert_eq!(image[[row, col]], SarComplex::new(re, im));
        assert_abs_diff_eq!(magnitude[[row, col]], mag, epsilon = 1e-6);
        assert_abs_diff_eq!(phase[[row, col]], ph, epsilon = 1e-6);
    }
}

#[test]
fn test_phase_and_magnitude_bounds() {
    let image = decode_slc(&buffer(), RasterDims::new(4, 3)).unwrap();
    let (magnitude, phase) = detect(&image);

    assert!(magnitude.iter().all(|&m| m >= 0.0));
    assert!(phase.iter().all(|&p| p > -PI && p <= PI));
}

#[test]
fn test_reconstruction_from_polar() {
    let image = decode_slc(&buffer(), RasterDims::new(4, 3)).unwrap();
    let (magnitude, phase) = detect(&image);

    let rebuilt = ndarray::Zip::from(&magnitude)
        .and(&phase)
        .map_collect(|&m, &p| SarComplex::from_polar(m, p));

    for (a, b) in rebuilt.iter().zip(image.iter()) {
        assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-5);
        assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-5);
    }
    assert_eq!(encode_slc(&image), buffer());
}

#[test]
fn test_short_buffer_reports_lengths() {
    let err = decode_slc(&buffer()[..90], RasterDims::new(4, 3)).unwrap_err();
    match err {
        SlcError::DimensionMismatch { expected, actual } => {
            assert_eq!(expected, 96);
            assert_eq!(actual, 90);
        }
        other => panic!("unexpected error: {}", other),
    }
}
