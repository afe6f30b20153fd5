//! Marker byte patterns that stand in for field values.
//!
//! A primitive of width `w` is filled with marker bytes chosen by position in
//! the type, so the big- and little-endian images of the same field contain
//! the same bytes in opposite order.

use std::{fmt, str::FromStr};

use crate::primitive::{ByteOrder, PrimitiveType};

/// Produces the bytes of one primitive element.
pub trait PatternGenerator {
    /// Appends exactly `width` bytes for one element of `primitive` in `order`.
    fn emit(&self, primitive: PrimitiveType, width: usize, order: ByteOrder, out: &mut Vec<u8>);
}

/// Four marker bytes repeated by position within the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicPattern {
    markers: [u8; 4],
}

impl CyclicPattern {
    pub const DEFAULT_MARKERS: [u8; 4] = [0xA1, 0xB2, 0xC3, 0xD4];

    pub fn new(markers: [u8; 4]) -> Self {
        CyclicPattern { markers }
    }

    pub fn markers(&self) -> [u8; 4] {
        self.markers
    }

    /// Marker for byte `i` of a big-endian element of `width` bytes.
    fn marker_at(&self, i: usize, width: usize) -> u8 {
        self.markers[(i % width) % self.markers.len()]
    }
}

impl Default for CyclicPattern {
    fn default() -> Self {
        CyclicPattern::new(Self::DEFAULT_MARKERS)
    }
}

impl PatternGenerator for CyclicPattern {
    fn emit(&self, _primitive: PrimitiveType, width: usize, order: ByteOrder, out: &mut Vec<u8>) {
        if width == 1 {
            out.push(self.markers[0]);
            return;
        }

        match order {
            ByteOrder::Big => out.extend((0..width).map(|i| self.marker_at(i, width))),
            ByteOrder::Little => out.extend((0..width).rev().map(|i| self.marker_at(i, width))),
        }
    }
}

impl fmt::Display for CyclicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.markers;
        write!(f, "{a:02X},{b:02X},{c:02X},{d:02X}")
    }
}

/// Error returned when a marker list cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternParseError {
    #[error("expected 4 marker bytes, got {0}")]
    WrongCount(usize),
    #[error("invalid marker byte `{0}`")]
    InvalidByte(String),
}

impl FromStr for CyclicPattern {
    type Err = PatternParseError;

    /// Parses four comma separated hex bytes, e.g. `A1,B2,C3,D4` or `0xa1, 0xb2, 0xc3, 0xd4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(PatternParseError::WrongCount(parts.len()));
        }

        let mut markers = [0u8; 4];
        for (slot, part) in markers.iter_mut().zip(parts) {
            let digits = part
                .strip_prefix("0x")
                .or_else(|| part.strip_prefix("0X"))
                .unwrap_or(part);
            *slot = u8::from_str_radix(digits, 16)
                .map_err(|_| PatternParseError::InvalidByte(part.to_string()))?;
        }

        Ok(CyclicPattern::new(markers))
    }
}
