//! Convenience re-exports — `use shprobe::prelude::*` for the common items.

pub use crate::basis::{Band, coeff_count, evaluate_basis};
pub use crate::cache::BasisCache;
pub use crate::capture::{CaptureSettings, ShCapture};
pub use crate::coeffs::CompressedSh;
pub use crate::error::ShError;
pub use crate::face::CubeFace;
pub use crate::half_float::{f16_to_f32, f32_to_f16};
pub use crate::probe_grid::{PackedProbeVolumes, ProbeGrid, ProbeGridDesc};
pub use crate::project::project;
pub use crate::reconstruct::reconstruct;
pub use crate::samples::{CubemapSampleSet, PixelFormat};
pub use crate::table::BasisTable;
#[cfg(feature = "gpu")]
pub use crate::gpu::{ProbeVolumeTextures, upload_probe_volumes};
