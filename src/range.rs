use crate::util::trim_ows;
use thiserror::Error;

pub const BYTES_UNIT: &str = "bytes";

/// Inclusive byte interval within a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeSet {
    pub start: u64,
    pub end: u64,
}

impl RangeSet {
    /// Bytes covered; zero for an inverted interval.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// `Content-Range` value for this interval, e.g. `bytes 0-499/1000`.
    pub fn content_range(&self, size: u64) -> String {
        format!("{BYTES_UNIT} {}-{}/{size}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Range {
    pub unit: String,
    pub ranges: Vec<RangeSet>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("range: malformed range header string")]
    Malformed,
    #[error("range: requested range not satisfiable")]
    Unsatisfiable,
}

/// Parses a `Range` header against a resource of `size` bytes.
///
/// A non-numeric start selects the last `end` bytes; a non-numeric end runs to
/// the last byte. Ends past the resource are clamped and inverted intervals
/// are dropped.
pub fn parse_range(header: &str, size: u64) -> Result<Range, RangeError> {
    let header = trim_ows(header);
    let (unit, intervals) = header.split_once('=').ok_or(RangeError::Malformed)?;
    if intervals.contains('=') {
        return Err(RangeError::Malformed);
    }

    let unit = trim_ows(unit);
    if unit != BYTES_UNIT {
        return Err(RangeError::Malformed);
    }

    let size = i128::from(size);
    let mut ranges = Vec::new();
    for item in intervals.split(',').map(trim_ows) {
        if item.is_empty() {
            continue;
        }

        let (first, second) = item.split_once('-').ok_or(RangeError::Malformed)?;
        let start = trim_ows(first).parse::<u64>().ok().map(i128::from);
        let end = trim_ows(second).parse::<u64>().ok().map(i128::from);

        let (start, end) = match (start, end) {
            (None, Some(suffix)) => (size - suffix, size - 1),
            (Some(start), Some(end)) => (start, end.min(size - 1)),
            (Some(start), None) => (start, size - 1),
            (None, None) => continue,
        };

        if start < 0 || start > end {
            continue;
        }

        // Both bounds are within 0..size here.
        ranges.push(RangeSet {
            start: start as u64,
            end: end as u64,
        });
    }

    if ranges.is_empty() {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(Range {
        unit: unit.to_string(),
        ranges,
    })
}

#[cfg(test)]
#[path = "range_test.rs"]
mod range_test;
