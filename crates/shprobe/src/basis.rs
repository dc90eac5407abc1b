//! # Real Spherical Harmonics, Bands 0–5
//!
//! Spherical harmonics are to the sphere what a Fourier series is to a
//! circle: an orthonormal set of functions, ordered by frequency. Diffuse
//! lighting is smooth, so a handful of low-frequency terms captures almost
//! all of it. Nine coefficients (three bands) is the usual choice for
//! irradiance; this crate goes up to 36 (six bands).
//!
//! ## Layout
//!
//! Coefficients are stored band by band, `m` from `-l` to `+l`:
//!
//! ```text
//! index   0 | 1  2  3 | 4  5  6  7  8 | 9 ... 15 | 16 ... 24 | 25 ... 35
//! band    0 |    1    |       2       |    3     |     4     |     5
//! ```
//!
//! A [`Band`] counts how many of those bands are evaluated, so band `n`
//! yields `n²` coefficients.
//!
//! ## Polynomials
//!
//! Each basis function is a normalization constant from
//! [`SH_NORMALIZATION`] times a polynomial in the unit direction `(x, y, z)`.
//! The Condon–Shortley phase is folded into the constants, which is why every
//! odd-`m` constant is negative. Reference: P.-P. Sloan, *Stupid Spherical
//! Harmonics (SH) Tricks*, appendix A2.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShError};

/// Largest number of coefficients any band produces.
pub const MAX_COEFFS: usize = 36;

/// Normalization constant of each basis function, in coefficient order.
pub const SH_NORMALIZATION: [f32; MAX_COEFFS] = [
    // l = 0
    0.282095,
    // l = 1
    -0.488603, 0.488603, -0.488603,
    // l = 2
    1.092548, -1.092548, 0.315392, -1.092548, 0.546274,
    // l = 3
    -0.590044, 2.890611, -0.457046, 0.373176, -0.457046, 1.445306, -0.590044,
    // l = 4
    2.503343, -1.770131, 0.946175, -0.669047, 0.105786, -0.669047, 0.473087, -1.770131, 0.625836,
    // l = 5
    -0.656383, 8.302649, -0.489238, 4.793537, -0.452947, 0.116950, -0.452947, 2.396768, -0.489238,
    2.075662, -0.656383,
];

/// Number of SH bands to evaluate, in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Band(u32);

impl Band {
    pub const MIN: Band = Band(1);
    pub const MAX: Band = Band(6);

    /// Validate a raw band number.
    pub fn new(band: u32) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&band) {
            Ok(Band(band))
        } else {
            Err(ShError::InvalidBand(band))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of coefficients this band produces (`band²`).
    pub fn coeff_count(self) -> usize {
        coeff_count(self.0)
    }

    /// The band producing exactly `count` coefficients, if there is one.
    pub fn from_coeff_count(count: usize) -> Option<Band> {
        (1..=Self::MAX.0).map(Band).find(|b| b.coeff_count() == count)
    }
}

/// Three bands (nine coefficients), the usual choice for irradiance.
impl Default for Band {
    fn default() -> Self {
        Band(3)
    }
}

impl TryFrom<u32> for Band {
    type Error = ShError;

    fn try_from(value: u32) -> Result<Self> {
        Band::new(value)
    }
}

impl From<Band> for u32 {
    fn from(band: Band) -> u32 {
        band.0
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Coefficient count for `band` bands: `band²`.
pub const fn coeff_count(band: u32) -> usize {
    (band * band) as usize
}

/// Evaluate the first `out.len()` basis functions at unit direction `dir`.
///
/// `out.len()` must not exceed [`MAX_COEFFS`]; the band is implied by the
/// slice length, which keeps the table builder free of per-texel
/// allocation.
pub fn evaluate_basis(dir: Vec3, out: &mut [f32]) {
    let mut all = [0.0f32; MAX_COEFFS];
    let count = out.len().min(MAX_COEFFS);
    basis_polynomials(dir, count, &mut all);
    for (o, (p, c)) in out.iter_mut().zip(all.iter().zip(SH_NORMALIZATION.iter())) {
        *o = p * c;
    }
}

/// Fill `poly` with the un-normalized polynomials, stopping after the band
/// that covers `count` terms.
fn basis_polynomials(dir: Vec3, count: usize, poly: &mut [f32; MAX_COEFFS]) {
    let Vec3 { x, y, z } = dir;

    poly[0] = 1.0;
    if count <= 1 {
        return;
    }

    poly[1] = y;
    poly[2] = z;
    poly[3] = x;
    if count <= 4 {
        return;
    }

    poly[4] = x * y;
    poly[5] = y * z;
    poly[6] = 3.0 * z * z - 1.0;
    poly[7] = x * z;
    poly[8] = x * x - y * y;
    if count <= 9 {
        return;
    }

    poly[9] = 3.0 * x * x * y - y * y * y;
    poly[10] = x * y * z;
    poly[11] = y * (5.0 * z * z - 1.0);
    poly[12] = 5.0 * z * z * z - 3.0 * z;
    poly[13] = x * (5.0 * z * z - 1.0);
    poly[14] = z * (x * x - y * y);
    poly[15] = x * x * x - 3.0 * x * y * y;
    if count <= 16 {
        return;
    }

    let (x2, y2, z2) = (x * x, y * y, z * z);
    let (x4, y4, z4) = (x2 * x2, y2 * y2, z2 * z2);

    poly[16] = y * x * (x2 - y2);
    poly[17] = y * (3.0 * x2 - y2) * z;
    poly[18] = y * x * (-1.0 + 7.0 * z2);
    poly[19] = y * z * (-3.0 + 7.0 * z2);
    poly[20] = 35.0 * z4 - 30.0 * z2 + 3.0;
    poly[21] = x * z * (-3.0 + 7.0 * z2);
    poly[22] = (x2 - y2) * (-1.0 + 7.0 * z2);
    poly[23] = x * (x2 - 3.0 * y2) * z;
    poly[24] = x4 - 6.0 * y2 * x2 + y4;
    if count <= 25 {
        return;
    }

    poly[25] = y * (5.0 * x4 - 10.0 * y2 * x2 + y4);
    poly[26] = y * x * (x2 - y2) * z;
    poly[27] = y * (3.0 * x2 - y2) * (-1.0 + 9.0 * z2);
    poly[28] = y * x * z * (-1.0 + 3.0 * z2);
    poly[29] = y * (-14.0 * z2 + 21.0 * z4 + 1.0);
    poly[30] = z * (63.0 * z4 - 70.0 * z2 + 15.0);
    poly[31] = x * (-14.0 * z2 + 21.0 * z4 + 1.0);
    poly[32] = (x2 - y2) * z * (-1.0 + 3.0 * z2);
    poly[33] = x * (x2 - 3.0 * y2) * (-1.0 + 9.0 * z2);
    poly[34] = (x4 - 6.0 * y2 * x2 + y4) * z;
    poly[35] = x * (x4 - 10.0 * y2 * x2 + 5.0 * y4);
}
