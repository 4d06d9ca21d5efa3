//! UAVSAR annotation (`.ann`) parsing
//!
//! Annotation files are line-oriented `key (units) = value ; comment` text.
//! Raster dimensions of each SLC segment live under keys such as
//! `slc_1_1x1 Rows` and `slc_1_1x1 Columns`.

use crate::types::{locator_file_name, RasterDims, SlcError, SlcResult};
use regex::Regex;
use std::collections::HashMap;

/// One annotation value with its optional units
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEntry {
    pub value: String,
    pub units: Option<String>,
}

/// Parsed annotation file, keyed by whitespace-normalised key
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    entries: HashMap<String, AnnotationEntry>,
}

impl Annotation {
    pub fn parse(text: &str) -> SlcResult<Self> {
        let line_pattern = Regex::new(
            r"^\s*(?P<key>[^=;(]+?)\s*(?:\((?P<units>[^)]*)\))?\s*=\s*(?P<value>[^;]*?)\s*(?:;.*)?$",
        )
        .map_err(|e| SlcError::Processing(format!("Regex error: {}", e)))?;

        let mut entries = HashMap::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            let Some(captures) = line_pattern.captures(trimmed) else {
                log::debug!("Skipping unrecognised annotation line: {}", trimmed);
                continue;
            };

            let key = normalise_key(&captures["key"]);
            let units = captures
                .name("units")
                .map(|m| m.as_str().trim().to_string())
                .filter(|u| !u.is_empty());
            entries.insert(
                key,
                AnnotationEntry {
                    value: captures["value"].to_string(),
                    units,
                },
            );
        }

        log::debug!("Parsed {} annotation entries", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AnnotationEntry> {
        self.entries.get(&normalise_key(key))
    }

    pub fn get_usize(&self, key: &str) -> SlcResult<usize> {
        let entry = self.require(key)?;
        entry.value.parse().map_err(|_| {
            SlcError::InvalidFormat(format!("{} is not an integer: '{}'", key, entry.value))
        })
    }

    pub fn get_f64(&self, key: &str) -> SlcResult<f64> {
        let entry = self.require(key)?;
        entry.value.parse().map_err(|_| {
            SlcError::InvalidFormat(format!("{} is not a number: '{}'", key, entry.value))
        })
    }

    /// Dimensions of SLC segment `segment` at multilook level `looks` (e.g. `1x1`)
    pub fn slc_dims(&self, segment: u32, looks: &str) -> SlcResult<RasterDims> {
        let rows = self.get_usize(&format!("slc_{}_{} Rows", segment, looks))?;
        let cols = self.get_usize(&format!("slc_{}_{} Columns", segment, looks))?;
        Ok(RasterDims::new(rows, cols))
    }

    fn require(&self, key: &str) -> SlcResult<&AnnotationEntry> {
        self.get(key)
            .ok_or_else(|| SlcError::Metadata(format!("annotation key not found: {}", key)))
    }
}

/// Segment number and looks of an SLC file name, e.g. `..._s2_1x1.slc` -> `(2, "1x1")`
pub fn segment_of(locator: &str) -> SlcResult<(u32, String)> {
    let pattern = Regex::new(r"_s(\d+)_(\d+x\d+)\.slc$")
        .map_err(|e| SlcError::Processing(format!("Regex error: {}", e)))?;

    let name = locator_file_name(locator);
    let captures = pattern.captures(name).ok_or_else(|| {
        SlcError::InvalidFormat(format!("not a segmented SLC file name: {}", name))
    })?;

    let segment = captures[1]
        .parse()
        .map_err(|_| SlcError::InvalidFormat(format!("bad segment number in {}", name)))?;
    Ok((segment, captures[2].to_string()))
}

fn normalise_key(key: &str) -> String {
    key.split_whitespace().collect::<Vec<_>>().join(" ")
}
