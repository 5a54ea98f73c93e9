//! Single biquad filter kernels.
//!
//! Three numeric contracts:
//! - [`apply_biquad_filter_float`]: Q14 coefficients decoded to `f64`, processed in `f64`.
//! - [`apply_biquad_filter_float_coefficients`]: `f32` coefficients widened to `f64`.
//! - [`apply_biquad_filter_int`]: Q14 coefficients processed in 64-bit integer arithmetic with
//!   round-to-nearest on the 14-bit shift. Bit-exact fixed-point emulation, not an approximation
//!   of the float path.
//!
//! Every kernel processes `min(sample_count, input.len(), output.len())` samples and is a no-op
//! for `sample_count == 0`.

use crate::coefficients::{BiquadFilterParameter, BiquadFilterParameterFloat, DecodedCoefficients};
use crate::fixed_point::{Q14_FRACTIONAL_BITS, Q14_ROUNDING_BIAS};
use crate::state::BiquadFilterState;

pub(crate) const SAMPLE_MIN: f64 = i32::MIN as f64;
pub(crate) const SAMPLE_MAX: f64 = i32::MAX as f64;

/// Clamp to the `i32` range and truncate toward zero. NaN maps to 0.
#[inline]
pub fn saturate_f64(sample: f64) -> i32 {
    sample.clamp(SAMPLE_MIN, SAMPLE_MAX) as i32
}

/// `f64` working copy of a [`BiquadFilterState`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct DelayLine {
    s: [f64; 4],
}

impl DelayLine {
    #[inline]
    pub(crate) fn load(state: &BiquadFilterState) -> Self {
        Self {
            s: state.load_f64(),
        }
    }

    #[inline]
    pub(crate) fn store(&self, state: &mut BiquadFilterState) {
        state.store_f64(self.s);
    }

    /// Run one sample through the recurrence and advance the delay line.
    #[inline]
    pub(crate) fn step(&mut self, c: &DecodedCoefficients, input: f64) -> f64 {
        let [s0, s1, s2, s3] = self.s;
        let sample = input * c.b[0] + s0 * c.b[1] + s1 * c.b[2] + s2 * c.a[0] + s3 * c.a[1];
        self.s = [input, s0, sample, s2];
        sample
    }
}

fn filter_block(
    output: &mut [i32],
    input: &[i32],
    coefficients: &DecodedCoefficients,
    state: &mut BiquadFilterState,
    sample_count: usize,
) {
    if sample_count == 0 {
        return;
    }

    let mut line = DelayLine::load(state);
    for (out, &x) in output.iter_mut().zip(input).take(sample_count) {
        *out = saturate_f64(line.step(coefficients, f64::from(x)));
    }
    line.store(state);
}

/// Filter `input` into `output` with Q14 coefficients in double precision.
pub fn apply_biquad_filter_float(
    output: &mut [i32],
    input: &[i32],
    parameter: &BiquadFilterParameter,
    state: &mut BiquadFilterState,
    sample_count: usize,
) {
    let coefficients = DecodedCoefficients::from_fixed(parameter);
    filter_block(output, input, &coefficients, state, sample_count);
}

/// Filter `input` into `output` with native `f32` coefficients in double precision.
pub fn apply_biquad_filter_float_coefficients(
    output: &mut [i32],
    input: &[i32],
    parameter: &BiquadFilterParameterFloat,
    state: &mut BiquadFilterState,
    sample_count: usize,
) {
    let coefficients = DecodedCoefficients::from_float(parameter);
    filter_block(output, input, &coefficients, state, sample_count);
}

/// Filter `input` into `output` in 64-bit fixed point.
///
/// `s0`/`s1` of `state` hold the two accumulators; `s2`/`s3` are left untouched.
/// Intermediate overflow wraps; the output is clamped to `i32`.
pub fn apply_biquad_filter_int(
    output: &mut [i32],
    input: &[i32],
    parameter: &BiquadFilterParameter,
    state: &mut BiquadFilterState,
    sample_count: usize,
) {
    if sample_count == 0 {
        return;
    }

    let [b0, b1, b2] = parameter.b.map(i64::from);
    let [a0, a1] = parameter.a.map(i64::from);
    let mut s0 = state.s0;
    let mut s1 = state.s1;

    for (out, &x) in output.iter_mut().zip(input).take(sample_count) {
        let x = i64::from(x);
        let sample = x.wrapping_mul(b0).wrapping_add(s0);
        let filtered = (sample.wrapping_add(Q14_ROUNDING_BIAS) >> Q14_FRACTIONAL_BITS)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX));
        *out = filtered as i32;

        s0 = s1
            .wrapping_add(b1.wrapping_mul(x))
            .wrapping_add(a0.wrapping_mul(filtered));
        s1 = b2.wrapping_mul(x).wrapping_add(a1.wrapping_mul(filtered));
    }

    state.s0 = s0;
    state.s1 = s1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_truncates_toward_zero() {
        assert_eq!(saturate_f64(1.9), 1);
        assert_eq!(saturate_f64(-1.9), -1);
        assert_eq!(saturate_f64(1e300), i32::MAX);
        assert_eq!(saturate_f64(-1e300), i32::MIN);
        assert_eq!(saturate_f64(f64::NAN), 0);
    }

    #[test]
    fn delay_line_shifts_inputs_and_outputs() {
        let c = DecodedCoefficients {
            b: [1.0, 0.0, 0.0],
            a: [0.0, 0.0],
        };
        let mut line = DelayLine {
            s: [0.0; 4],
        };
        assert_eq!(line.step(&c, 3.0), 3.0);
        assert_eq!(line.step(&c, 5.0), 5.0);
        assert_eq!(line.s, [5.0, 3.0, 5.0, 3.0]);
    }
}
