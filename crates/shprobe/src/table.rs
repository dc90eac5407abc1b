//! # Basis Table — Precomputed Quadrature Data
//!
//! Projecting a cubemap onto SH needs, for every texel of every face, three
//! things that depend only on the face resolution and the band:
//!
//! 1. the unit direction the texel looks in,
//! 2. every basis function evaluated at that direction,
//! 3. the solid angle the texel covers on the unit sphere.
//!
//! Computing them is `O(resolution² × coeff_count)` and dominates the cost
//! of a capture, so a [`BasisTable`] is built once, never mutated, and shared
//! (see [`BasisCache`](crate::cache::BasisCache)) across every environment
//! of the same `(resolution, band)`.
//!
//! ## Solid Angle
//!
//! A flat face maps non-uniformly onto the sphere: texels near the face
//! corners are farther from the center and seen at a grazing angle, so they
//! cover less of the sphere than texels at the face center. For an
//! unnormalized texel direction `v = (±1, s, t)` the differential solid angle
//! is
//!
//! ```text
//! dω = dS / |v|³          dS = (2 × 2) / N²
//! ```
//!
//! `dS` is the flat area of one texel on a face spanning `[-1, 1]²`. One
//! power of `|v|` accounts for the projection onto the sphere's tangent plane
//! (cosine falloff), two for the inverse-square distance. Summed over all six
//! faces the weights approach `4π`.
//!
//! ## Memory Layout
//!
//! All three tables are flat `Vec`s indexed by `face * N² + row * N + column`.
//! Basis values are interleaved per texel so that one texel's coefficients
//! are contiguous:
//!
//! ```text
//! values: [ texel0: Y0 Y1 .. Yk | texel1: Y0 Y1 .. Yk | ... ]
//! ```

use std::time::Instant;

use glam::Vec3;
use rayon::prelude::*;

use crate::basis::{Band, evaluate_basis};
use crate::error::{Result, ShError};
use crate::face::CubeFace;

/// Immutable per-texel directions, basis values and solid-angle weights for
/// one `(resolution, band)` pair.
#[derive(Debug, Clone)]
pub struct BasisTable {
    band: Band,
    resolution: u32,
    coeff_count: usize,
    directions: Vec<Vec3>,
    values: Vec<f32>,
    weights: Vec<f32>,
}

impl BasisTable {
    /// Build the table for faces of `resolution × resolution` texels.
    pub fn build(band: Band, resolution: u32) -> Result<Self> {
        if resolution == 0 {
            return Err(ShError::InvalidResolution(resolution));
        }

        let start = Instant::now();
        let n = resolution as usize;
        let coeff_count = band.coeff_count();
        let texel_count = 6 * n * n;

        let mut directions = vec![Vec3::ZERO; texel_count];
        let mut values = vec![0.0f32; texel_count * coeff_count];
        let mut weights = vec![0.0f32; texel_count];

        // Differential area of one texel on a face spanning [-1, 1]².
        let d_s = (2.0 * 2.0) / (resolution as f32 * resolution as f32);

        // One task per row of every face.
        directions
            .par_chunks_mut(n)
            .zip(values.par_chunks_mut(n * coeff_count))
            .zip(weights.par_chunks_mut(n))
            .enumerate()
            .for_each(|(row_index, ((dir_row, value_row), weight_row))| {
                let face = CubeFace::ALL[row_index / n];
                let v = (row_index % n) as u32;

                for u in 0..resolution {
                    let col = u as usize;
                    let vec = face.texel_direction(u, v, resolution);

                    let mag = vec.length() * vec.length_squared();
                    weight_row[col] = (1.0 / mag) * d_s;

                    let dir = vec.normalize();
                    dir_row[col] = dir;
                    evaluate_basis(
                        dir,
                        &mut value_row[col * coeff_count..(col + 1) * coeff_count],
                    );
                }
            });

        log::debug!(
            "Built SH basis table: band {band}, {resolution}x{resolution}, {texel_count} texels in {:.2?}",
            start.elapsed()
        );

        Ok(Self {
            band,
            resolution,
            coeff_count,
            directions,
            values,
            weights,
        })
    }

    pub fn band(&self) -> Band {
        self.band
    }

    /// Face edge length in texels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of basis functions per texel.
    pub fn coeff_count(&self) -> usize {
        self.coeff_count
    }

    pub fn texels_per_face(&self) -> usize {
        let n = self.resolution as usize;
        n * n
    }

    /// Unit direction through the center of `texel` (`row * N + column`).
    pub fn direction(&self, face: CubeFace, texel: usize) -> Vec3 {
        self.directions[self.index(face, texel)]
    }

    /// All basis values at `texel`, in coefficient order.
    pub fn values(&self, face: CubeFace, texel: usize) -> &[f32] {
        let start = self.index(face, texel) * self.coeff_count;
        &self.values[start..start + self.coeff_count]
    }

    /// Solid angle covered by `texel`.
    pub fn weight(&self, face: CubeFace, texel: usize) -> f32 {
        self.weights[self.index(face, texel)]
    }

    /// Sum of all weights. Approaches `4π` as the resolution grows.
    pub fn total_solid_angle(&self) -> f64 {
        self.weights.iter().map(|&w| f64::from(w)).sum()
    }

    /// Approximate heap footprint of the three tables, in bytes.
    pub fn memory_size(&self) -> usize {
        self.directions.len() * std::mem::size_of::<Vec3>()
            + (self.values.len() + self.weights.len()) * std::mem::size_of::<f32>()
    }

    fn index(&self, face: CubeFace, texel: usize) -> usize {
        face.index() * self.texels_per_face() + texel
    }

    pub(crate) fn face_weights(&self, face: CubeFace) -> &[f32] {
        let n2 = self.texels_per_face();
        &self.weights[face.index() * n2..(face.index() + 1) * n2]
    }

    pub(crate) fn face_values(&self, face: CubeFace) -> &[f32] {
        let len = self.texels_per_face() * self.coeff_count;
        &self.values[face.index() * len..(face.index() + 1) * len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn band(b: u32) -> Band {
        Band::new(b).unwrap()
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert_eq!(
            BasisTable::build(band(3), 0).unwrap_err(),
            ShError::InvalidResolution(0)
        );
    }

    #[test]
    fn table_sizes() {
        let table = BasisTable::build(band(3), 8).unwrap();
        assert_eq!(table.coeff_count(), 9);
        assert_eq!(table.texels_per_face(), 64);
        assert_eq!(table.values(CubeFace::Top, 63).len(), 9);
        assert_eq!(table.face_values(CubeFace::Bottom).len(), 64 * 9);
        assert_eq!(table.face_weights(CubeFace::Back).len(), 64);
    }

    #[test]
    fn weights_sum_to_sphere() {
        let table = BasisTable::build(band(1), 32).unwrap();
        let total = table.total_solid_angle();
        assert!((total - 4.0 * PI).abs() / (4.0 * PI) < 1e-3, "total solid angle {total}");
    }

    #[test]
    fn single_texel_faces() {
        let table = BasisTable::build(band(2), 1).unwrap();
        for face in CubeFace::ALL {
            assert_eq!(table.direction(face, 0), face.look_dir());
            assert_eq!(table.weight(face, 0), 4.0);
        }
    }

    #[test]
    fn corner_texels_weigh_less_than_center() {
        let table = BasisTable::build(band(1), 16).unwrap();
        let center = table.weight(CubeFace::Front, 8 * 16 + 8);
        let corner = table.weight(CubeFace::Front, 0);
        assert!(corner < center * 0.25, "corner {corner}, center {center}");
        // Every face has the same weight pattern.
        for face in CubeFace::ALL {
            for (a, b) in table.face_weights(face).iter().zip(table.face_weights(CubeFace::Front)) {
                assert!((a - b).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn directions_are_unit_length() {
        let table = BasisTable::build(band(1), 7).unwrap();
        for face in CubeFace::ALL {
            for texel in 0..table.texels_per_face() {
                let len = table.direction(face, texel).length();
                assert!((len - 1.0).abs() < 1e-6, "{face:?}[{texel}] length {len}");
            }
        }
    }

    #[test]
    fn values_match_direct_evaluation() {
        let table = BasisTable::build(band(4), 5).unwrap();
        let mut expected = [0.0f32; 16];
        for face in CubeFace::ALL {
            for texel in [0, 7, 24] {
                evaluate_basis(table.direction(face, texel), &mut expected);
                assert_eq!(table.values(face, texel), &expected[..]);
            }
        }
    }

    #[test]
    fn basis_is_orthonormal_under_quadrature() {
        let table = BasisTable::build(band(6), 16).unwrap();
        let count = table.coeff_count();
        let mut gram = vec![0.0f64; count * count];
        for face in CubeFace::ALL {
            for texel in 0..table.texels_per_face() {
                let w = f64::from(table.weight(face, texel));
                let y = table.values(face, texel);
                for i in 0..count {
                    for j in 0..count {
                        gram[i * count + j] += w * f64::from(y[i]) * f64::from(y[j]);
                    }
                }
            }
        }
        for i in 0..count {
            for j in 0..count {
                let expected = if i == j { 1.0 } else { 0.0 };
                let got = gram[i * count + j];
                assert!((got - expected).abs() < 5e-3, "<Y{i}, Y{j}> = {got}");
            }
        }
    }
}
