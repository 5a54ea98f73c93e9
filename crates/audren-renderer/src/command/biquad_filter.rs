use std::fmt::Write as _;

use audren_dsp::{
    apply_biquad_filter_float, apply_biquad_filter_float_coefficients, apply_biquad_filter_int,
    BiquadCoefficients, BiquadFilterParameter, BiquadFilterParameterFloat, BiquadFilterState,
};

use super::{BufferIndex, RendererCommand};
use crate::error::CommandError;
use crate::processor::{CommandListProcessor, FrameIo};
use crate::state_arena::StateHandle;

/// Numeric path of a single-filter pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKernel {
    /// Q14 coefficients, 64-bit integer arithmetic.
    FixedPoint(BiquadFilterParameter),
    /// Q14 coefficients decoded to `f64`.
    Float(BiquadFilterParameter),
    /// Native `f32` coefficients widened to `f64`.
    FloatCoefficients(BiquadFilterParameterFloat),
}

impl FilterKernel {
    /// Native float coefficients have no fixed-point form and always take the double path.
    pub fn select(coefficients: BiquadCoefficients, use_float_processing: bool) -> Self {
        match coefficients {
            BiquadCoefficients::Float(p) => FilterKernel::FloatCoefficients(p),
            BiquadCoefficients::Fixed(p) if use_float_processing => FilterKernel::Float(p),
            BiquadCoefficients::Fixed(p) => FilterKernel::FixedPoint(p),
        }
    }

    pub fn apply(
        &self,
        output: &mut [i32],
        input: &[i32],
        state: &mut BiquadFilterState,
        sample_count: usize,
    ) {
        match self {
            FilterKernel::FixedPoint(p) => {
                apply_biquad_filter_int(output, input, p, state, sample_count)
            }
            FilterKernel::Float(p) => {
                apply_biquad_filter_float(output, input, p, state, sample_count)
            }
            FilterKernel::FloatCoefficients(p) => {
                apply_biquad_filter_float_coefficients(output, input, p, state, sample_count)
            }
        }
    }
}

/// Filter one mix buffer into another (or in place), overwriting the output.
#[derive(Debug, Clone, PartialEq)]
pub struct BiquadFilterCommand {
    pub input: i16,
    pub output: i16,
    pub coefficients: BiquadCoefficients,
    pub state: StateHandle,
    pub needs_init: bool,
    pub use_float_processing: bool,
}

impl BiquadFilterCommand {
    pub fn kernel(&self) -> FilterKernel {
        FilterKernel::select(self.coefficients, self.use_float_processing)
    }
}

impl RendererCommand for BiquadFilterCommand {
    fn name(&self) -> &'static str {
        "BiquadFilterCommand"
    }

    fn dump(&self, _processor: &CommandListProcessor<'_>, out: &mut String) {
        let _ = write!(
            out,
            "BiquadFilterCommand\n\tinput {} output {} needs_init {} use_float_processing {}\n",
            BufferIndex(self.input),
            BufferIndex(self.output),
            self.needs_init,
            self.use_float_processing
        );
    }

    fn verify(&self, _processor: &CommandListProcessor<'_>) -> bool {
        true
    }

    fn process(&self, processor: &mut CommandListProcessor<'_>) -> Result<(), CommandError> {
        let kernel = self.kernel();
        let FrameIo {
            input,
            output,
            states,
            sample_count,
        } = processor.frame_io(self.input, self.output)?;

        let mut state = if self.needs_init {
            BiquadFilterState::zeroed()
        } else {
            states.load(self.state)?
        };
        kernel.apply(output, input, &mut state, sample_count);
        states.store(self.state, state)
    }
}
