//! Filter-and-mix kernels.
//!
//! Same recurrence as [`crate::biquad`], but the filtered sample is scaled by a volume and
//! accumulated into `output` instead of overwriting it. The sum is clamped to `i32`.

use crate::biquad::{saturate_f64, DelayLine};
use crate::coefficients::BiquadCoefficients;
use crate::state::BiquadFilterState;

/// Add `filtered * volume` onto `out`, saturating. Returns the mixed contribution.
#[inline]
pub(crate) fn mix_sample(out: &mut i32, filtered: f64, volume: f32) -> f64 {
    let mixed = filtered * f64::from(volume);
    *out = saturate_f64(f64::from(*out) + mixed);
    mixed
}

/// Per-sample volume increment for a linear ramp over `sample_count` samples.
#[inline]
pub fn volume_ramp_step(volume0: f32, volume1: f32, sample_count: usize) -> f32 {
    if sample_count == 0 {
        return 0.0;
    }
    (volume1 - volume0) / sample_count as f32
}

/// Filter `input` and mix it into `output` at a constant `volume`.
pub fn apply_biquad_filter_and_mix(
    output: &mut [i32],
    input: &[i32],
    coefficients: &BiquadCoefficients,
    state: &mut BiquadFilterState,
    sample_count: usize,
    volume: f32,
) {
    if sample_count == 0 {
        return;
    }

    let c = coefficients.decode();
    let mut line = DelayLine::load(state);
    for (out, &x) in output.iter_mut().zip(input).take(sample_count) {
        let filtered = line.step(&c, f64::from(x));
        mix_sample(out, filtered, volume);
    }
    line.store(state);
}

/// Filter `input` and mix it into `output` while ramping the volume from `volume0` toward
/// `volume1`.
///
/// Sample `i` uses `volume0 + i * ramp` (accumulated in `f32`), with
/// `ramp = (volume1 - volume0) / sample_count`. Returns the last sample's mixed contribution
/// (`filtered * volume`), or `0.0` if nothing was processed.
pub fn apply_biquad_filter_and_mix_ramp(
    output: &mut [i32],
    input: &[i32],
    coefficients: &BiquadCoefficients,
    state: &mut BiquadFilterState,
    sample_count: usize,
    volume0: f32,
    volume1: f32,
) -> f32 {
    if sample_count == 0 {
        return 0.0;
    }

    let c = coefficients.decode();
    let ramp = volume_ramp_step(volume0, volume1, sample_count);
    let mut volume = volume0;
    let mut last_mixed = 0.0f64;
    let mut line = DelayLine::load(state);
    for (out, &x) in output.iter_mut().zip(input).take(sample_count) {
        let filtered = line.step(&c, f64::from(x));
        last_mixed = mix_sample(out, filtered, volume);
        volume += ramp;
    }
    line.store(state);

    last_mixed as f32
}
