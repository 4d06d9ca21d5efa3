//! Core SLC raster processing modules

pub mod decode;
pub mod detect;
pub mod display;

// Re-export main functions
pub use decode::{decode_slc, encode_slc, read_slc_file};
pub use detect::{detect, magnitude, phase};
pub use display::{ColorMap, DisplayScale};
