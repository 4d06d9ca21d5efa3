use crate::types::SarRealImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Colour map the renderer should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMap {
    /// Linear grayscale
    Gray,
    /// Cyclic map, first and last colours equal (for phase)
    Cyclic,
}

/// Fixed display bounds handed to the image renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayScale {
    pub min: f32,
    pub max: f32,
    pub colormap: ColorMap,
}

impl DisplayScale {
    /// Magnitude display: 0.05 to 0.35, grayscale
    pub fn magnitude() -> Self {
        Self {
            min: 0.05,
            max: 0.35,
            colormap: ColorMap::Gray,
        }
    }

    /// Phase display: full `(-pi, pi]` range, cyclic
    pub fn phase() -> Self {
        Self {
            min: -PI,
            max: PI,
            colormap: ColorMap::Cyclic,
        }
    }

    /// Map a value into `[0, 1]`, clamping outside the bounds. NaN maps to 0.
    pub fn normalise(&self, value: f32) -> f32 {
        if value.is_nan() || self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Quantise a grid to 8-bit display levels
    pub fn to_u8(&self, grid: &SarRealImage) -> Array2<u8> {
        grid.mapv(|v| (self.normalise(v) * 255.0).round() as u8)
    }
}
