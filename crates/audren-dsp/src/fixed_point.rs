//! Q14 fixed-point coefficient codec.
//!
//! Biquad coefficients are carried as signed 16-bit values with 14 fractional bits (the DSP
//! treats them as the low half of a 50.14 fixed-point number). Decoding is a division by
//! `2^14`, which is exact in `f64` for every `i16` input.

/// Number of fractional bits in a Q14 coefficient.
pub const Q14_FRACTIONAL_BITS: u32 = 14;

/// `1.0` in Q14.
pub const Q14_ONE: i32 = 1 << Q14_FRACTIONAL_BITS;

/// Rounding bias added before the 14-bit right shift in the integer kernel.
pub const Q14_ROUNDING_BIAS: i64 = 1 << (Q14_FRACTIONAL_BITS - 1);

/// Decode a Q14 coefficient to `f64`.
#[inline]
pub fn q14_to_f64(value: i16) -> f64 {
    f64::from(value) / f64::from(Q14_ONE)
}

/// Encode an `f64` as Q14, rounding to nearest and saturating to the `i16` range.
///
/// NaN encodes as `0`.
#[inline]
pub fn f64_to_q14(value: f64) -> i16 {
    let scaled = (value * f64::from(Q14_ONE)).round();
    // `as` saturates and maps NaN to 0.
    scaled as i16
}
