use std::fmt::Write as _;

use audren_dsp::{
    apply_double_biquad_filter_and_mix, apply_double_biquad_filter_and_mix_ramp,
    BiquadCoefficients, BiquadFilterState, CASCADE_TAP_COUNT,
};

use super::{
    check_handles, prepare_state, write_ramp_tail, BufferIndex, MixVolume, RendererCommand,
};
use crate::error::CommandError;
use crate::processor::{CommandListProcessor, FrameIo};
use crate::state_arena::{StateHandle, VoiceHandle};

/// Two biquad filters in series, mixed into the output buffer.
///
/// Every per-tap field is indexed by tap; tap 0 runs first.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiTapBiquadFilterAndMixCommand {
    pub input: i16,
    pub output: i16,
    pub coefficients: [BiquadCoefficients; CASCADE_TAP_COUNT],
    pub states: [StateHandle; CASCADE_TAP_COUNT],
    pub previous_states: [StateHandle; CASCADE_TAP_COUNT],
    pub voice_state: VoiceHandle,
    pub last_sample_index: i32,
    pub volume: MixVolume,
    pub needs_init: [bool; CASCADE_TAP_COUNT],
    pub is_first_mix_buffer: [bool; CASCADE_TAP_COUNT],
}

impl RendererCommand for MultiTapBiquadFilterAndMixCommand {
    fn name(&self) -> &'static str {
        "MultiTapBiquadFilterAndMixCommand"
    }

    fn dump(&self, _processor: &CommandListProcessor<'_>, out: &mut String) {
        let _ = write!(
            out,
            "MultiTapBiquadFilterAndMixCommand\n\tinput {} output {} needs_init ({}, {}) has_volume_ramp {} is_first_mix_buffer ({}, {})\n",
            BufferIndex(self.input),
            BufferIndex(self.output),
            self.needs_init[0],
            self.needs_init[1],
            self.volume.has_volume_ramp(),
            self.is_first_mix_buffer[0],
            self.is_first_mix_buffer[1]
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
            &[
                self.states[0],
                self.states[1],
                self.previous_states[0],
                self.previous_states[1],
            ],
            self.volume,
            self.voice_state,
            self.last_sample_index,
        )?;

        let mut taps = [BiquadFilterState::zeroed(); CASCADE_TAP_COUNT];
        for (tap, prepared) in taps.iter_mut().enumerate() {
            *prepared = prepare_state(
                states,
                self.states[tap],
                self.previous_states[tap],
                self.needs_init[tap],
                self.is_first_mix_buffer[tap],
            )?;
        }

        let last = match self.volume {
            MixVolume::Fixed(volume) => {
                apply_double_biquad_filter_and_mix(
                    output,
                    input,
                    &self.coefficients,
                    &mut taps,
                    sample_count,
                    volume,
                );
                None
            }
            MixVolume::Ramp { from, to } => Some(apply_double_biquad_filter_and_mix_ramp(
                output,
                input,
                &self.coefficients,
                &mut taps,
                sample_count,
                from,
                to,
            )),
        };

        // Written back in tap order; a handle shared by both taps ends up with tap 1's state.
        for (handle, state) in self.states.iter().zip(taps) {
            states.store(*handle, state)?;
        }

        match last {
            Some(last) => write_ramp_tail(states, self.voice_state, self.last_sample_index, last),
            None => Ok(()),
        }
    }
}
