//! # Cubemap Samples — Decoding Captured Faces
//!
//! The capture pass hands us six raw pixel buffers read back from the GPU.
//! Before projection they are decoded into linear RGB floats, one `Vec3` per
//! texel, addressed by `row * resolution + column`.
//!
//! Two encodings are decodable:
//!
//! ```text
//! Rgba8Unorm    4 bytes/texel   R G B A         channel / 255
//! Rgba16Float   8 bytes/texel   R:2 G:2 B:2 A:2 little-endian binary16
//! ```
//!
//! Alpha is ignored in both. No gamma curve is removed from 8-bit data: the
//! capture target is expected to hold linear values already.
//!
//! Other [`PixelFormat`]s exist because capture targets can be created with
//! them, but they are rejected with [`ShError::UnsupportedFormat`].

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShError};
use crate::face::CubeFace;
use crate::half_float::{f16_to_f32, f32_to_f16};

/// Pixel encoding of a captured cubemap face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Rgba16Float,
    Rgba32Float,
}

impl PixelFormat {
    pub fn bytes_per_texel(self) -> usize {
        match self {
            PixelFormat::Rgba8Unorm | PixelFormat::Rgba8UnormSrgb | PixelFormat::Bgra8Unorm => 4,
            PixelFormat::Rgba16Float => 8,
            PixelFormat::Rgba32Float => 16,
        }
    }

    /// Whether [`CubemapSampleSet::build`] can decode this format.
    pub fn is_supported(self) -> bool {
        matches!(self, PixelFormat::Rgba8Unorm | PixelFormat::Rgba16Float)
    }
}

/// Linear RGB samples of all six faces, in [`CubeFace`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapSampleSet {
    resolution: u32,
    faces: [Vec<Vec3>; 6],
}

impl CubemapSampleSet {
    /// Decode six face buffers given in [`CubeFace::ALL`] order.
    pub fn build(faces: [&[u8]; 6], resolution: u32, format: PixelFormat) -> Result<Self> {
        if resolution == 0 {
            return Err(ShError::InvalidResolution(resolution));
        }
        if !format.is_supported() {
            return Err(ShError::UnsupportedFormat(format));
        }

        let n = resolution as usize;
        let bpp = format.bytes_per_texel();
        let needed = n * n * bpp;

        // Validate every face before decoding any of them.
        for face in CubeFace::ALL {
            let actual = faces[face.index()].len();
            if actual < needed {
                return Err(ShError::BufferSize {
                    face,
                    expected: needed,
                    actual,
                });
            }
        }

        let decoded = faces.map(|buffer| {
            buffer[..needed]
                .par_chunks_exact(bpp)
                .map(|texel| decode_texel(texel, format))
                .collect::<Vec<Vec3>>()
        });

        Ok(Self {
            resolution,
            faces: decoded,
        })
    }

    /// Decode six buffers given in GPU cube layer order (+X, -X, +Y, -Y, +Z, -Z).
    pub fn from_layers(layers: [&[u8]; 6], resolution: u32, format: PixelFormat) -> Result<Self> {
        let faces = CubeFace::ALL.map(|face| layers[face.layer()]);
        Self::build(faces, resolution, format)
    }

    /// Wrap already-decoded samples.
    pub fn from_samples(resolution: u32, faces: [Vec<Vec3>; 6]) -> Result<Self> {
        if resolution == 0 {
            return Err(ShError::InvalidResolution(resolution));
        }
        let n = resolution as usize;
        for face in CubeFace::ALL {
            let actual = faces[face.index()].len();
            if actual != n * n {
                return Err(ShError::BufferSize {
                    face,
                    expected: n * n,
                    actual,
                });
            }
        }
        Ok(Self { resolution, faces })
    }

    /// A cubemap where every texel has the same color.
    pub fn uniform(resolution: u32, color: Vec3) -> Result<Self> {
        let n = resolution as usize;
        Self::from_samples(resolution, std::array::from_fn(|_| vec![color; n * n]))
    }

    /// Face edge length in texels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// All samples of one face, row-major.
    pub fn face(&self, face: CubeFace) -> &[Vec3] {
        &self.faces[face.index()]
    }

    pub fn sample(&self, face: CubeFace, row: u32, column: u32) -> Vec3 {
        self.faces[face.index()][texel_index(self.resolution, row, column)]
    }

    /// Encode back into six face buffers, in [`CubeFace::ALL`] order.
    ///
    /// `Rgba8Unorm` clamps to `[0, 1]` and truncates; alpha is written opaque.
    pub fn encode(&self, format: PixelFormat) -> Result<[Vec<u8>; 6]> {
        if !format.is_supported() {
            return Err(ShError::UnsupportedFormat(format));
        }
        Ok(self.faces.each_ref().map(|samples| {
            let mut out = Vec::with_capacity(samples.len() * format.bytes_per_texel());
            for c in samples {
                encode_texel(*c, format, &mut out);
            }
            out
        }))
    }
}

/// Row-major texel index, computed in `usize` so large faces cannot wrap.
fn texel_index(resolution: u32, row: u32, column: u32) -> usize {
    row as usize * resolution as usize + column as usize
}

fn decode_texel(texel: &[u8], format: PixelFormat) -> Vec3 {
    match format {
        PixelFormat::Rgba16Float => {
            let channel = |i: usize| f16_to_f32(u16::from_le_bytes([texel[i], texel[i + 1]]));
            Vec3::new(channel(0), channel(2), channel(4))
        }
        // Only supported formats reach here.
        _ => Vec3::new(
            f32::from(texel[0]) / 255.0,
            f32::from(texel[1]) / 255.0,
            f32::from(texel[2]) / 255.0,
        ),
    }
}

fn encode_texel(color: Vec3, format: PixelFormat, out: &mut Vec<u8>) {
    match format {
        PixelFormat::Rgba16Float => {
            for channel in [color.x, color.y, color.z, 1.0] {
                out.extend_from_slice(&f32_to_f16(channel).to_le_bytes());
            }
        }
        _ => {
            let to_byte = |c: f32| (c * 255.0).clamp(0.0, 255.0) as u8;
            out.extend_from_slice(&[to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]);
        }
    }
}
