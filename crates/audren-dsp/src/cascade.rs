//! Two biquad filters in series, mixed into the output.
//!
//! Filter 0 runs on the raw input; filter 1 runs on filter 0's unclamped output. Only the
//! final mix is clamped.

use crate::biquad::DelayLine;
use crate::coefficients::{BiquadCoefficients, DecodedCoefficients};
use crate::mix::{mix_sample, volume_ramp_step};
use crate::state::BiquadFilterState;

/// Fixed number of taps in a cascade.
pub const CASCADE_TAP_COUNT: usize = 2;

struct Cascade {
    coefficients: [DecodedCoefficients; CASCADE_TAP_COUNT],
    lines: [DelayLine; CASCADE_TAP_COUNT],
}

impl Cascade {
    fn load(
        coefficients: &[BiquadCoefficients; CASCADE_TAP_COUNT],
        states: &[BiquadFilterState; CASCADE_TAP_COUNT],
    ) -> Self {
        Self {
            coefficients: [coefficients[0].decode(), coefficients[1].decode()],
            lines: [DelayLine::load(&states[0]), DelayLine::load(&states[1])],
        }
    }

    #[inline]
    fn step(&mut self, input: f64) -> f64 {
        let filtered0 = self.lines[0].step(&self.coefficients[0], input);
        self.lines[1].step(&self.coefficients[1], filtered0)
    }

    fn store(&self, states: &mut [BiquadFilterState; CASCADE_TAP_COUNT]) {
        self.lines[0].store(&mut states[0]);
        self.lines[1].store(&mut states[1]);
    }
}

/// Run both filters and mix the result into `output` at a constant `volume`.
pub fn apply_double_biquad_filter_and_mix(
    output: &mut [i32],
    input: &[i32],
    coefficients: &[BiquadCoefficients; CASCADE_TAP_COUNT],
    states: &mut [BiquadFilterState; CASCADE_TAP_COUNT],
    sample_count: usize,
    volume: f32,
) {
    if sample_count == 0 {
        return;
    }

    let mut cascade = Cascade::load(coefficients, states);
    for (out, &x) in output.iter_mut().zip(input).take(sample_count) {
        let filtered = cascade.step(f64::from(x));
        mix_sample(out, filtered, volume);
    }
    cascade.store(states);
}

/// Ramped variant of [`apply_double_biquad_filter_and_mix`]. Returns the last sample's mixed
/// contribution, or `0.0` if nothing was processed.
pub fn apply_double_biquad_filter_and_mix_ramp(
    output: &mut [i32],
    input: &[i32],
    coefficients: &[BiquadCoefficients; CASCADE_TAP_COUNT],
    states: &mut [BiquadFilterState; CASCADE_TAP_COUNT],
    sample_count: usize,
    volume0: f32,
    volume1: f32,
) -> f32 {
    if sample_count == 0 {
        return 0.0;
    }

    let ramp = volume_ramp_step(volume0, volume1, sample_count);
    let mut volume = volume0;
    let mut last_mixed = 0.0f64;
    let mut cascade = Cascade::load(coefficients, states);
    for (out, &x) in output.iter_mut().zip(input).take(sample_count) {
        let filtered = cascade.step(f64::from(x));
        last_mixed = mix_sample(out, filtered, volume);
        volume += ramp;
    }
    cascade.store(states);

    last_mixed as f32
}
