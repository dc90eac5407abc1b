//! # Projection — Cubemap to SH Coefficients
//!
//! Each coefficient is the integral of the environment against one basis
//! function, approximated by a weighted sum over every texel of every face:
//!
//! ```text
//! c_l = Σ_face Σ_texel  color(texel) · dω(texel) · Y_l(dir(texel))
//! ```
//!
//! ## Precision
//!
//! A 128² capture sums ~98k terms per coefficient, with magnitudes that vary
//! over several orders (bright sun texels next to dim sky). Accumulating in
//! `f32` loses the small terms, so sums are carried in `f64` and narrowed to
//! `f32` only once, at the end.
//!
//! ## Parallelism
//!
//! Coefficients are independent, so each one is a separate rayon task. Inside
//! a task the summation order is fixed (faces in [`CubeFace::ALL`] order,
//! texels row-major), which makes the output bit-identical across runs and
//! thread counts.

use glam::Vec3;
use rayon::prelude::*;

use crate::coeffs::CompressedSh;
use crate::error::{Result, ShError};
use crate::face::CubeFace;
use crate::samples::CubemapSampleSet;
use crate::table::BasisTable;

/// Project `samples` onto the SH basis described by `basis`.
///
/// Fails with [`ShError::DimensionMismatch`] if the two were built for
/// different face resolutions.
pub fn project(samples: &CubemapSampleSet, basis: &BasisTable) -> Result<CompressedSh> {
    if samples.resolution() != basis.resolution() {
        return Err(ShError::DimensionMismatch {
            samples: samples.resolution(),
            basis: basis.resolution(),
        });
    }

    let count = basis.coeff_count();
    let coefficients: Vec<Vec3> = (0..count)
        .into_par_iter()
        .map(|l| accumulate_coefficient(samples, basis, l))
        .collect();

    Ok(CompressedSh::from_parts(basis.band(), coefficients))
}

fn accumulate_coefficient(samples: &CubemapSampleSet, basis: &BasisTable, l: usize) -> Vec3 {
    let count = basis.coeff_count();
    let (mut r, mut g, mut b) = (0.0f64, 0.0f64, 0.0f64);

    for face in CubeFace::ALL {
        let colors = samples.face(face);
        let weights = basis.face_weights(face);
        let values = basis.face_values(face);

        for (p, color) in colors.iter().enumerate() {
            let value = f64::from(weights[p]) * f64::from(values[p * count + l]);
            r += f64::from(color.x) * value;
            g += f64::from(color.y) * value;
            b += f64::from(color.z) * value;
        }
    }

    Vec3::new(r as f32, g as f32, b as f32)
}
