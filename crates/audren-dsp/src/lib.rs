//! Biquad filter DSP kernels for the audio renderer.
//!
//! Samples are 32-bit signed PCM. Coefficients arrive either as Q14 fixed point (every hardware
//! revision) or as native `f32` (revision 15 and later). Filter state is a 4-word register set
//! ([`BiquadFilterState`]) that persists between frames and is stored bit-for-bit.
//!
//! The kernels are free functions over slices; ownership of the state and of the mix buffers
//! stays with the caller (see the `audren-renderer` crate).

pub mod biquad;
pub mod cascade;
pub mod coefficients;
pub mod fixed_point;
pub mod mix;
pub mod state;

pub use biquad::{
    apply_biquad_filter_float, apply_biquad_filter_float_coefficients, apply_biquad_filter_int,
    saturate_f64,
};
pub use cascade::{
    apply_double_biquad_filter_and_mix, apply_double_biquad_filter_and_mix_ramp,
    CASCADE_TAP_COUNT,
};
pub use coefficients::{
    BiquadCoefficients, BiquadFilterParameter, BiquadFilterParameterFloat, DecodedCoefficients,
};
pub use fixed_point::{f64_to_q14, q14_to_f64, Q14_FRACTIONAL_BITS, Q14_ONE};
pub use mix::{apply_biquad_filter_and_mix, apply_biquad_filter_and_mix_ramp, volume_ramp_step};
pub use state::BiquadFilterState;
