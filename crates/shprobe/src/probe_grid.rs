//! # Probe Grid — Packing Coefficients for the GPU
//!
//! Diffuse GI is sampled from a regular 3D grid of light probes, each holding
//! one [`CompressedSh`]. The lighting pass reads them from three 3D textures,
//! one per color channel, in `Rgba16Float`:
//!
//! ```text
//! red volume, one row (y, z fixed):
//!
//!   probe x=0                 probe x=1
//! ┌──────────┬──────────┬────┬──────────┬──────────┬────┐
//! │ c0 c1 c2 c3 │ c4 c5 c6 c7 │ .. │ c0 c1 c2 c3 │ c4 c5 c6 c7 │ .. │
//! └──────────┴──────────┴────┴──────────┴──────────┴────┘
//!   texel 0      texel 1           texel 0      texel 1
//! ```
//!
//! Every texel carries four coefficients of one channel. A probe spans
//! `ceil(coeff_count / 4)` texels along X; the last one is zero padded. With
//! two bands (4 coefficients) that is exactly one texel per probe. Probes are
//! stored at `z * ny * nx + y * nx + x`, the same order as the volume texels.
//!
//! The stored values are the [`scaled`](CompressedSh::scaled) coefficients,
//! already multiplied by their basis normalization constant, so the shader
//! only multiplies by the direction polynomial. They are narrowed with
//! [`f32_to_f16`]. Unpacking divides the constant back out.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::basis::{Band, SH_NORMALIZATION};
use crate::coeffs::CompressedSh;
use crate::error::{Result, ShError};
use crate::half_float::{f16_to_f32, f32_to_f16};

/// Coefficients per RGBA texel.
pub const COEFFS_PER_TEXEL: usize = 4;

/// Probe counts along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeGridDesc {
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl ProbeGridDesc {
    pub fn new(nx: u32, ny: u32, nz: u32) -> Self {
        Self { nx, ny, nz }
    }

    pub fn probe_count(&self) -> usize {
        self.nx as usize * self.ny as usize * self.nz as usize
    }

    /// Linear index of probe `(x, y, z)`.
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        (z as usize * self.ny as usize + y as usize) * self.nx as usize + x as usize
    }
}

/// A grid of probes sharing one band.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeGrid {
    desc: ProbeGridDesc,
    band: Band,
    probes: Vec<CompressedSh>,
}

impl ProbeGrid {
    pub fn new(desc: ProbeGridDesc, band: Band, probes: Vec<CompressedSh>) -> Result<Self> {
        if probes.len() != desc.probe_count() {
            return Err(ShError::ProbeCount {
                expected: desc.probe_count(),
                actual: probes.len(),
            });
        }
        if let Some(odd) = probes.iter().find(|p| p.band() != band) {
            return Err(ShError::CoefficientCount {
                expected: band.coeff_count(),
                actual: odd.coefficients().len(),
            });
        }
        Ok(Self { desc, band, probes })
    }

    pub fn desc(&self) -> ProbeGridDesc {
        self.desc
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn probes(&self) -> &[CompressedSh] {
        &self.probes
    }

    pub fn probe(&self, x: u32, y: u32, z: u32) -> &CompressedSh {
        &self.probes[self.desc.index(x, y, z)]
    }

    /// Pack all probes into three per-channel half-float volumes.
    pub fn pack(&self) -> PackedProbeVolumes {
        let texels_per_probe = texels_per_probe(self.band);
        let stride = texels_per_probe * COEFFS_PER_TEXEL;
        let len = self.probes.len() * stride;

        let mut red = vec![0u16; len];
        let mut green = vec![0u16; len];
        let mut blue = vec![0u16; len];

        for (probe, base) in self.probes.iter().zip((0..len).step_by(stride)) {
            for (i, c) in probe.scaled().iter().enumerate() {
                red[base + i] = f32_to_f16(c.x);
                green[base + i] = f32_to_f16(c.y);
                blue[base + i] = f32_to_f16(c.z);
            }
        }

        log::debug!(
            "Packed {} probes ({}x{}x{}) into 3 volumes of {} texels",
            self.probes.len(),
            self.desc.nx,
            self.desc.ny,
            self.desc.nz,
            len / COEFFS_PER_TEXEL
        );

        PackedProbeVolumes {
            band: self.band,
            width: self.desc.nx * texels_per_probe as u32,
            height: self.desc.ny,
            depth: self.desc.nz,
            texels_per_probe: texels_per_probe as u32,
            red,
            green,
            blue,
        }
    }

    /// Rebuild a grid from packed volumes, expecting them to hold `band`.
    pub fn unpack(packed: &PackedProbeVolumes, band: Band) -> Result<Self> {
        if packed.band != band {
            return Err(ShError::BandMismatch {
                expected: band,
                actual: packed.band,
            });
        }
        let texels_per_probe = texels_per_probe(band);
        if packed.texels_per_probe as usize != texels_per_probe {
            return Err(ShError::CoefficientCount {
                expected: texels_per_probe * COEFFS_PER_TEXEL,
                actual: packed.texels_per_probe as usize * COEFFS_PER_TEXEL,
            });
        }

        let desc = ProbeGridDesc::new(
            packed.width / packed.texels_per_probe,
            packed.height,
            packed.depth,
        );
        let stride = texels_per_probe * COEFFS_PER_TEXEL;
        let expected_len = desc.probe_count() * stride;
        for channel in [&packed.red, &packed.green, &packed.blue] {
            if channel.len() != expected_len {
                return Err(ShError::ProbeCount {
                    expected: desc.probe_count(),
                    actual: channel.len() / stride,
                });
            }
        }

        let probes = (0..desc.probe_count())
            .map(|p| {
                let base = p * stride;
                let coefficients = (0..band.coeff_count())
                    .map(|i| {
                        let scaled = Vec3::new(
                            f16_to_f32(packed.red[base + i]),
                            f16_to_f32(packed.green[base + i]),
                            f16_to_f32(packed.blue[base + i]),
                        );
                        scaled / SH_NORMALIZATION[i]
                    })
                    .collect();
                CompressedSh::new(band, coefficients)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(desc, band, probes)
    }
}

/// Number of RGBA texels one probe occupies along X.
pub fn texels_per_probe(band: Band) -> usize {
    band.coeff_count().div_ceil(COEFFS_PER_TEXEL)
}

/// Three `Rgba16Float` volumes (R, G, B channels of the coefficients).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedProbeVolumes {
    /// Band of every packed probe.
    pub band: Band,
    /// Texels along X (`nx * texels_per_probe`).
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub texels_per_probe: u32,
    /// `width * height * depth * 4` half floats each, scaled coefficients.
    pub red: Vec<u16>,
    pub green: Vec<u16>,
    pub blue: Vec<u16>,
}

impl PackedProbeVolumes {
    /// The channel volumes in R, G, B order, as raw bytes ready for upload.
    pub fn channel_bytes(&self) -> [&[u8]; 3] {
        [
            bytemuck::cast_slice(&self.red),
            bytemuck::cast_slice(&self.green),
            bytemuck::cast_slice(&self.blue),
        ]
    }

    /// Bytes per row of one volume, as the GPU copy expects it.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * (COEFFS_PER_TEXEL * std::mem::size_of::<u16>()) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(b: u32) -> Band {
        Band::new(b).unwrap()
    }

    fn probe(band: Band, seed: f32) -> CompressedSh {
        let coefficients = (0..band.coeff_count())
            .map(|i| Vec3::new(seed + i as f32, -seed, 0.5 * i as f32))
            .collect();
        CompressedSh::new(band, coefficients).unwrap()
    }

    fn grid(desc: ProbeGridDesc, b: u32) -> ProbeGrid {
        let probes = (0..desc.probe_count())
            .map(|i| probe(band(b), i as f32))
            .collect();
        ProbeGrid::new(desc, band(b), probes).unwrap()
    }

    #[test]
    fn probe_index_is_z_major() {
        let desc = ProbeGridDesc::new(3, 2, 4);
        assert_eq!(desc.probe_count(), 24);
        assert_eq!(desc.index(0, 0, 0), 0);
        assert_eq!(desc.index(2, 0, 0), 2);
        assert_eq!(desc.index(0, 1, 0), 3);
        assert_eq!(desc.index(0, 0, 1), 6);
        assert_eq!(desc.index(2, 1, 3), 23);
    }

    #[test]
    fn grid_checks_probe_count_and_band() {
        let desc = ProbeGridDesc::new(2, 1, 1);
        assert_eq!(
            ProbeGrid::new(desc, band(2), vec![probe(band(2), 0.0)]).unwrap_err(),
            ShError::ProbeCount {
                expected: 2,
                actual: 1,
            }
        );
        let mixed = vec![probe(band(2), 0.0), probe(band(3), 0.0)];
        assert!(ProbeGrid::new(desc, band(2), mixed).is_err());
    }

    #[test]
    fn stores_coefficients_scaled_by_normalization() {
        let sh = CompressedSh::new(band(2), vec![Vec3::ONE; 4]).unwrap();
        let grid = ProbeGrid::new(ProbeGridDesc::new(1, 1, 1), band(2), vec![sh]).unwrap();
        let packed = grid.pack();

        // 0.282095, -0.488603, 0.488603, -0.488603 narrowed to binary16.
        assert_eq!(packed.red, vec![0x3483, 0xb7d1, 0x37d1, 0xb7d1]);
        assert_eq!(packed.green, packed.red);
        assert_eq!(packed.blue, packed.red);
    }

    #[test]
    fn two_bands_fill_one_texel_per_probe() {
        let packed = grid(ProbeGridDesc::new(2, 1, 1), 2).pack();

        assert_eq!(packed.band, band(2));
        assert_eq!((packed.width, packed.height, packed.depth), (2, 1, 1));
        assert_eq!(packed.texels_per_probe, 1);
        // Probe 1, coefficient 0: (1, -1, 0) * 0.282095
        assert_eq!(packed.red[4], f32_to_f16(0.282095));
        assert_eq!(packed.green[4], f32_to_f16(-0.282095));
        assert_eq!(packed.blue[4], 0);
        assert_eq!(packed.bytes_per_row(), 16);
        assert_eq!(packed.channel_bytes()[0].len(), 2 * 4 * 2);
    }

    #[test]
    fn three_bands_are_padded() {
        let packed = grid(ProbeGridDesc::new(1, 2, 1), 3).pack();

        assert_eq!(texels_per_probe(band(3)), 3);
        assert_eq!(packed.width, 3);
        assert_eq!(packed.red.len(), 2 * 3 * 4);
        // Coefficients 9..12 of the first probe are padding.
        assert_eq!(&packed.blue[9..12], &[0, 0, 0]);
        // The second probe starts right after.
        assert_eq!(packed.red[12], f32_to_f16(0.282095));
    }

    #[test]
    fn unpack_restores_grid() {
        let original = grid(ProbeGridDesc::new(2, 2, 2), 3);
        let restored = ProbeGrid::unpack(&original.pack(), band(3)).unwrap();

        assert_eq!(restored.desc(), original.desc());
        for (a, b) in original.probes().iter().zip(restored.probes()) {
            for (ca, cb) in a.coefficients().iter().zip(b.coefficients()) {
                // Truncation to 10 mantissa bits.
                let tolerance = ca.abs().max_element() * 2e-3 + 1e-4;
                assert!((*ca - *cb).abs().max_element() <= tolerance, "{ca} vs {cb}");
            }
        }
    }

    #[test]
    fn unpack_rejects_wrong_band() {
        let packed = grid(ProbeGridDesc::new(1, 1, 1), 2).pack();
        assert_eq!(
            ProbeGrid::unpack(&packed, band(4)).unwrap_err(),
            ShError::BandMismatch {
                expected: band(4),
                actual: band(2),
            }
        );
    }

    #[test]
    fn unpack_rejects_bands_sharing_a_texel_count() {
        // Bands 1 and 2 both fit in one texel per probe.
        let two = grid(ProbeGridDesc::new(2, 1, 1), 2).pack();
        assert_eq!(
            ProbeGrid::unpack(&two, band(1)).unwrap_err(),
            ShError::BandMismatch {
                expected: band(1),
                actual: band(2),
            }
        );

        let one = grid(ProbeGridDesc::new(2, 1, 1), 1).pack();
        assert_eq!(
            ProbeGrid::unpack(&one, band(2)).unwrap_err(),
            ShError::BandMismatch {
                expected: band(2),
                actual: band(1),
            }
        );
    }

    #[test]
    fn desc_serializes() {
        let desc = ProbeGridDesc::new(4, 2, 8);
        let json = serde_json::to_string(&desc).unwrap();
        assert_eq!(json, r#"{"nx":4,"ny":2,"nz":8}"#);
    }
}
