use std::fmt::Write as _;

use audren_dsp::{apply_biquad_filter_and_mix, apply_biquad_filter_and_mix_ramp, BiquadCoefficients};

use super::{
    check_handles, prepare_state, write_ramp_tail, BufferIndex, MixVolume, RendererCommand,
};
use crate::error::CommandError;
use crate::processor::{CommandListProcessor, FrameIo};
use crate::state_arena::{StateHandle, VoiceHandle};

/// Filter one mix buffer and accumulate it into another at a (possibly ramped) volume.
#[derive(Debug, Clone, PartialEq)]
pub struct BiquadFilterAndMixCommand {
    pub input: i16,
    pub output: i16,
    pub coefficients: BiquadCoefficients,
    pub state: StateHandle,
    /// Snapshot of `state` taken by the first mix buffer of the frame.
    pub previous_state: StateHandle,
    /// Voice whose tail-sample array receives the ramp's last sample.
    pub voice_state: VoiceHandle,
    pub last_sample_index: i32,
    pub volume: MixVolume,
    pub needs_init: bool,
    pub is_first_mix_buffer: bool,
}

impl RendererCommand for BiquadFilterAndMixCommand {
    fn name(&self) -> &'static str {
        "BiquadFilterAndMixCommand"
    }

    fn dump(&self, _processor: &CommandListProcessor<'_>, out: &mut String) {
        let _ = write!(
            out,
            "BiquadFilterAndMixCommand\n\tinput {} output {} needs_init {} has_volume_ramp {} is_first_mix_buffer {}\n",
            BufferIndex(self.input),
            BufferIndex(self.output),
            self.needs_init,
            self.volume.has_volume_ramp(),
            self.is_first_mix_buffer
        );
    }

    fn verify(&self, _processor: &CommandListProcessor<'_>) -> bool {
        true
    }

    fn process(&self, processor: &mut CommandListProcessor<'_>) -> Result<(), CommandError> {
        let FrameIo {
            input,
            output,
            states,
            sample_count,
        } = processor.frame_io(self.input, self.output)?;
        check_handles(
            states,
            &[self.state, self.previous_state],
            self.volume,
            self.voice_state,
            self.last_sample_index,
        )?;

        let mut state = prepare_state(
            states,
            self.state,
            self.previous_state,
            self.needs_init,
            self.is_first_mix_buffer,
        )?;

        match self.volume {
            MixVolume::Fixed(volume) => {
                apply_biquad_filter_and_mix(
                    output,
                    input,
                    &self.coefficients,
                    &mut state,
                    sample_count,
                    volume,
                );
                states.store(self.state, state)
            }
            MixVolume::Ramp { from, to } => {
                let last = apply_biquad_filter_and_mix_ramp(
                    output,
                    input,
                    &self.coefficients,
                    &mut state,
                    sample_count,
                    from,
                    to,
                );
                states.store(self.state, state)?;
                write_ramp_tail(states, self.voice_state, self.last_sample_index, last)
            }
        }
    }
}
