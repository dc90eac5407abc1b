//! Error type shared by every fallible operation in the crate.

use std::fmt;

use crate::basis::Band;
use crate::face::CubeFace;
use crate::samples::PixelFormat;

/// Errors that can occur while decoding, projecting, or packing SH data.
///
/// There is no partial-failure mode: an operation either returns a complete
/// result or one of these, before any output is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShError {
    /// The pixel encoding cannot be decoded into linear samples.
    UnsupportedFormat(PixelFormat),
    /// Sample set and basis table were built for different face resolutions.
    /// Usually a stale cached table.
    DimensionMismatch { samples: u32, basis: u32 },
    /// Band outside `1..=6`.
    InvalidBand(u32),
    /// Face resolution of zero.
    InvalidResolution(u32),
    /// A face buffer is too short for the requested resolution and format.
    BufferSize {
        face: CubeFace,
        expected: usize,
        actual: usize,
    },
    /// Coefficient vector has the wrong length for the operation.
    CoefficientCount { expected: usize, actual: usize },
    /// Probe list does not fill the grid.
    ProbeCount { expected: usize, actual: usize },
    /// Packed probe data was written for a different band than requested.
    BandMismatch { expected: Band, actual: Band },
}

impl fmt::Display for ShError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShError::UnsupportedFormat(format) => {
                write!(f, "unsupported cubemap pixel format: {format:?}")
            }
            ShError::DimensionMismatch { samples, basis } => write!(
                f,
                "sample set resolution {samples} does not match basis table resolution {basis}"
            ),
            ShError::InvalidBand(band) => write!(f, "SH band {band} out of range (1..=6)"),
            ShError::InvalidResolution(res) => write!(f, "invalid cubemap face resolution: {res}"),
            ShError::BufferSize {
                face,
                expected,
                actual,
            } => write!(
                f,
                "{face:?} face buffer holds {actual} bytes, expected at least {expected}"
            ),
            ShError::CoefficientCount { expected, actual } => {
                write!(f, "expected {expected} SH coefficients, got {actual}")
            }
            ShError::ProbeCount { expected, actual } => {
                write!(f, "probe grid needs {expected} probes, got {actual}")
            }
            ShError::BandMismatch { expected, actual } => {
                write!(f, "packed probes hold {actual} coefficients, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ShError {}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, ShError>;
