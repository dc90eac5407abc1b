//! Expanding coefficients back into a cubemap.
//!
//! Mostly a debugging aid: comparing a capture with its reconstruction shows
//! how much detail the chosen band throws away. The reconstruction reuses the
//! basis values already stored in a [`BasisTable`], so it costs
//! `6 × N² × coeff_count` multiply-adds and no basis evaluation.

use glam::Vec3;
use rayon::prelude::*;

use crate::coeffs::CompressedSh;
use crate::error::{Result, ShError};
use crate::face::CubeFace;
use crate::samples::CubemapSampleSet;
use crate::table::BasisTable;

/// Evaluate `Σ coeff[l] · Y_l` at every texel of `basis`.
///
/// The table must be built for the same band as `sh`. Use
/// [`CubemapSampleSet::encode`] to turn the result into face buffers.
pub fn reconstruct(sh: &CompressedSh, basis: &BasisTable) -> Result<CubemapSampleSet> {
    let count = basis.coeff_count();
    if sh.coefficients().len() != count {
        return Err(ShError::CoefficientCount {
            expected: count,
            actual: sh.coefficients().len(),
        });
    }

    let faces = CubeFace::ALL.map(|face| {
        basis
            .face_values(face)
            .par_chunks_exact(count)
            .map(|values| {
                sh.coefficients()
                    .iter()
                    .zip(values)
                    .fold(Vec3::ZERO, |acc, (c, y)| acc + *c * *y)
            })
            .collect::<Vec<Vec3>>()
    });

    CubemapSampleSet::from_samples(basis.resolution(), faces)
}
