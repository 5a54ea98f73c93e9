//! Audio renderer biquad filtering: DSP kernels plus the command layer that drives them.

pub use audren_dsp as dsp;
pub use audren_renderer as renderer;
