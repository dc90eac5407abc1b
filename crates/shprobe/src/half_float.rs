//! # Half Floats — Bit-Level binary16 ↔ binary32
//!
//! Captured HDR cubemaps arrive as `Rgba16Float` and baked coefficients are
//! stored the same way, so both directions of the conversion live here.
//!
//! ```text
//! binary16   s eeeee mmmmmmmmmm                  bias 15
//! binary32   s eeeeeeee mmmmmmmmmmmmmmmmmmmmmmm  bias 127
//! ```
//!
//! Widening moves the exponent by `127 - 15 = 112` and shifts the mantissa
//! left by 13. Narrowing does the reverse and has to deal with values that
//! fall outside the 5-bit exponent range.
//!
//! ## Known Precision Loss
//!
//! These conversions are bit-compatible with the probe data already baked by
//! the engine, and they are *not* full IEEE conversions:
//!
//! - Narrowing truncates the 13 dropped mantissa bits. There is no
//!   round-to-nearest-even, so results are biased toward zero by up to one
//!   half-ULP.
//! - Widening does not renormalize binary16 subnormals. A subnormal keeps a
//!   zero exponent and its mantissa is shifted into the binary32 subnormal
//!   range, so tiny magnitudes come back far smaller than they were.
//! - NaN payloads are shifted like any mantissa. A binary32 NaN whose payload
//!   lives only in the low 13 bits narrows to infinity.
//!
//! Values exactly representable in binary16 (`0`, `±1`, `0.5`, `2`,
//! `65504`, …) round-trip unchanged.
//!
//! ## Comparison
//!
//! - **`half` crate**: `f16::from_f32` rounds to nearest-even and handles
//!   subnormals both ways. More accurate, but produces different bits.
//! - **GPU hardware**: `f32tof16` in HLSL rounds; texture sampling decodes
//!   subnormals. Only the CPU side uses the truncating variant.

const F16_EXP_MASK: u16 = 0x1f;
const F16_MANTISSA_MASK: u16 = 0x03ff;
const F32_EXP_MASK: u32 = 0xff;
const F32_MANTISSA_MASK: u32 = 0x7f_ffff;

/// Difference between the binary32 and binary16 exponent biases.
const EXP_REBIAS: u32 = 127 - 15;
/// Mantissa width difference (23 - 10).
const MANTISSA_SHIFT: u32 = 23 - 10;

/// Positive infinity as binary16 bits.
pub const F16_INFINITY: u16 = 0x7c00;
/// Largest finite binary16 value, `65504.0`.
pub const F16_MAX: f32 = 65504.0;

/// Widen binary16 bits to an `f32`.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits >> 15);
    let mut exponent = u32::from((bits >> 10) & F16_EXP_MASK);
    let mantissa = u32::from(bits & F16_MANTISSA_MASK);

    exponent = match exponent {
        // inf / NaN, mantissa carried over
        31 => 255,
        // subnormal: left as a zero exponent
        0 => 0,
        e => e + EXP_REBIAS,
    };

    f32::from_bits((sign << 31) | (exponent << 23) | (mantissa << MANTISSA_SHIFT))
}

/// Narrow an `f32` to binary16 bits, truncating the mantissa.
///
/// Overflow saturates to ±infinity, magnitudes below the smallest binary16
/// subnormal flush to zero, and the subnormal range gets a shifted mantissa
/// with the implicit leading one restored.
pub fn f32_to_f16(value: f32) -> u16 {
    let raw = value.to_bits();
    let sign = raw >> 31;
    let mut exponent = (raw >> 23) & F32_EXP_MASK;
    let mut mantissa = raw & F32_MANTISSA_MASK;

    if exponent == 255 {
        exponent = 31;
    } else if exponent < EXP_REBIAS - 10 {
        exponent = 0;
        mantissa = 0;
    } else if exponent >= 127 + (31 - 15) {
        exponent = 31;
        mantissa = 0;
    } else if exponent <= EXP_REBIAS {
        mantissa |= 1 << 23;
        mantissa >>= 1 + (EXP_REBIAS - exponent);
        exponent = 0;
    } else {
        exponent -= EXP_REBIAS;
    }

    mantissa >>= MANTISSA_SHIFT;

    ((sign << 15) | (exponent << 10) | mantissa) as u16
}

/// Narrow every value in `values`.
pub fn encode_slice(values: &[f32]) -> Vec<u16> {
    values.iter().map(|&v| f32_to_f16(v)).collect()
}

/// Widen every value in `bits`.
pub fn decode_slice(bits: &[u16]) -> Vec<f32> {
    bits.iter().map(|&b| f16_to_f32(b)).collect()
}
