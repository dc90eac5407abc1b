//! Compressed environment lighting: one RGB coefficient per SH basis function.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::basis::{Band, MAX_COEFFS, SH_NORMALIZATION, evaluate_basis};
use crate::error::{Result, ShError};
use crate::half_float::{f16_to_f32, f32_to_f16};

/// The output of a projection. Immutable, passed around by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCompressedSh")]
pub struct CompressedSh {
    band: Band,
    coefficients: Vec<Vec3>,
}

#[derive(Deserialize)]
struct RawCompressedSh {
    band: Band,
    coefficients: Vec<Vec3>,
}

impl TryFrom<RawCompressedSh> for CompressedSh {
    type Error = ShError;

    fn try_from(raw: RawCompressedSh) -> Result<Self> {
        CompressedSh::new(raw.band, raw.coefficients)
    }
}

impl CompressedSh {
    /// Wrap coefficients, checking there is exactly one per basis function.
    pub fn new(band: Band, coefficients: Vec<Vec3>) -> Result<Self> {
        if coefficients.len() != band.coeff_count() {
            return Err(ShError::CoefficientCount {
                expected: band.coeff_count(),
                actual: coefficients.len(),
            });
        }
        Ok(Self { band, coefficients })
    }

    /// All-zero coefficients (no light).
    pub fn zero(band: Band) -> Self {
        Self::from_parts(band, vec![Vec3::ZERO; band.coeff_count()])
    }

    pub(crate) fn from_parts(band: Band, coefficients: Vec<Vec3>) -> Self {
        debug_assert_eq!(coefficients.len(), band.coeff_count());
        Self { band, coefficients }
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn coefficients(&self) -> &[Vec3] {
        &self.coefficients
    }

    pub fn into_coefficients(self) -> Vec<Vec3> {
        self.coefficients
    }

    /// Reconstruct the (band-limited) radiance arriving from `dir`.
    ///
    /// `dir` does not need to be normalized. Returns zero for a zero vector.
    pub fn evaluate(&self, dir: Vec3) -> Vec3 {
        let Some(dir) = dir.try_normalize() else {
            return Vec3::ZERO;
        };
        let mut basis = [0.0f32; MAX_COEFFS];
        let basis = &mut basis[..self.coefficients.len()];
        evaluate_basis(dir, basis);
        self.coefficients
            .iter()
            .zip(basis.iter())
            .fold(Vec3::ZERO, |acc, (c, y)| acc + *c * *y)
    }

    /// Coefficients premultiplied by their basis normalization constant,
    /// with `w = 1`.
    ///
    /// This is the constant-buffer layout the lighting shaders consume: the
    /// shader only has to multiply by the direction polynomial.
    pub fn scaled(&self) -> Vec<Vec4> {
        self.coefficients
            .iter()
            .zip(SH_NORMALIZATION.iter())
            .map(|(c, k)| (*c * *k).extend(1.0))
            .collect()
    }

    /// Narrow every channel to binary16 for storage.
    pub fn to_half(&self) -> Vec<[u16; 3]> {
        self.coefficients
            .iter()
            .map(|c| [f32_to_f16(c.x), f32_to_f16(c.y), f32_to_f16(c.z)])
            .collect()
    }

    /// Widen coefficients stored by [`to_half`](Self::to_half).
    pub fn from_half(band: Band, packed: &[[u16; 3]]) -> Result<Self> {
        let coefficients = packed
            .iter()
            .map(|[r, g, b]| Vec3::new(f16_to_f32(*r), f16_to_f32(*g), f16_to_f32(*b)))
            .collect();
        Self::new(band, coefficients)
    }
}
