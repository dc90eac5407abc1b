//! # shprobe — Spherical-Harmonics Light Probes
//!
//! Compresses captured cubemaps into a handful of spherical-harmonics
//! coefficients for diffuse global illumination, and packs probe grids into
//! half-float volumes the lighting shader can sample.
//!
//! Start with `use shprobe::prelude::*` and a [`ShCapture`](capture::ShCapture).

pub mod basis;
pub mod cache;
pub mod capture;
pub mod coeffs;
pub mod error;
pub mod face;
pub mod half_float;
pub mod prelude;
pub mod probe_grid;
pub mod project;
pub mod reconstruct;
pub mod samples;
pub mod table;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use basis::Band;
pub use cache::BasisCache;
pub use capture::{CaptureSettings, ShCapture};
pub use coeffs::CompressedSh;
pub use error::{Result, ShError};
pub use face::CubeFace;
pub use probe_grid::{PackedProbeVolumes, ProbeGrid, ProbeGridDesc};
pub use project::project;
pub use reconstruct::reconstruct;
pub use samples::{CubemapSampleSet, PixelFormat};
pub use table::BasisTable;
