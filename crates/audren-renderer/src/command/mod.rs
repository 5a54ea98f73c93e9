//! Renderer commands that run biquad filters over mix buffers.
//!
//! Each command is a plain parameter block. The closed set of kinds is dispatched through
//! [`Command`]; the per-kind behaviour lives behind [`RendererCommand`].

mod biquad_filter;
mod biquad_filter_and_mix;
mod multi_tap_biquad_filter_and_mix;

pub use biquad_filter::{BiquadFilterCommand, FilterKernel};
pub use biquad_filter_and_mix::BiquadFilterAndMixCommand;
pub use multi_tap_biquad_filter_and_mix::MultiTapBiquadFilterAndMixCommand;

use std::fmt;

use audren_dsp::BiquadFilterState;

use crate::error::CommandError;
use crate::processor::CommandListProcessor;
use crate::state_arena::{StateArena, StateHandle, VoiceHandle};
use crate::MAX_MIX_BUFFERS;

pub trait RendererCommand {
    /// Short type name used in logs.
    fn name(&self) -> &'static str;

    /// Append a diagnostic line describing this command.
    fn dump(&self, processor: &CommandListProcessor<'_>, out: &mut String);

    fn verify(&self, processor: &CommandListProcessor<'_>) -> bool;

    fn process(&self, processor: &mut CommandListProcessor<'_>) -> Result<(), CommandError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BiquadFilter(BiquadFilterCommand),
    BiquadFilterAndMix(BiquadFilterAndMixCommand),
    MultiTapBiquadFilterAndMix(MultiTapBiquadFilterAndMixCommand),
}

impl RendererCommand for Command {
    fn name(&self) -> &'static str {
        match self {
            Command::BiquadFilter(cmd) => cmd.name(),
            Command::BiquadFilterAndMix(cmd) => cmd.name(),
            Command::MultiTapBiquadFilterAndMix(cmd) => cmd.name(),
        }
    }

    fn dump(&self, processor: &CommandListProcessor<'_>, out: &mut String) {
        match self {
            Command::BiquadFilter(cmd) => cmd.dump(processor, out),
            Command::BiquadFilterAndMix(cmd) => cmd.dump(processor, out),
            Command::MultiTapBiquadFilterAndMix(cmd) => cmd.dump(processor, out),
        }
    }

    fn verify(&self, processor: &CommandListProcessor<'_>) -> bool {
        match self {
            Command::BiquadFilter(cmd) => cmd.verify(processor),
            Command::BiquadFilterAndMix(cmd) => cmd.verify(processor),
            Command::MultiTapBiquadFilterAndMix(cmd) => cmd.verify(processor),
        }
    }

    fn process(&self, processor: &mut CommandListProcessor<'_>) -> Result<(), CommandError> {
        match self {
            Command::BiquadFilter(cmd) => cmd.process(processor),
            Command::BiquadFilterAndMix(cmd) => cmd.process(processor),
            Command::MultiTapBiquadFilterAndMix(cmd) => cmd.process(processor),
        }
    }
}

impl From<BiquadFilterCommand> for Command {
    fn from(cmd: BiquadFilterCommand) -> Self {
        Command::BiquadFilter(cmd)
    }
}

impl From<BiquadFilterAndMixCommand> for Command {
    fn from(cmd: BiquadFilterAndMixCommand) -> Self {
        Command::BiquadFilterAndMix(cmd)
    }
}

impl From<MultiTapBiquadFilterAndMixCommand> for Command {
    fn from(cmd: MultiTapBiquadFilterAndMixCommand) -> Self {
        Command::MultiTapBiquadFilterAndMix(cmd)
    }
}

/// Volume applied by the filter-and-mix commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixVolume {
    Fixed(f32),
    /// Linear ramp from `from` toward `to` across the frame.
    Ramp { from: f32, to: f32 },
}

impl MixVolume {
    /// Build from the (previous, current) pair the voice layer supplies. Without a ramp the
    /// current volume is used for the whole frame.
    pub fn from_pair(previous: f32, current: f32, has_volume_ramp: bool) -> Self {
        if has_volume_ramp {
            MixVolume::Ramp {
                from: previous,
                to: current,
            }
        } else {
            MixVolume::Fixed(current)
        }
    }

    pub fn has_volume_ramp(&self) -> bool {
        matches!(self, MixVolume::Ramp { .. })
    }
}

impl Default for MixVolume {
    fn default() -> Self {
        MixVolume::Fixed(1.0)
    }
}

/// Mix buffer index as dump lines print it: two-digit upper-case hex, with a leading sign for
/// negative indices rather than the two's complement.
pub(crate) struct BufferIndex(pub(crate) i16);

impl fmt::Display for BufferIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-{:X}", self.0.unsigned_abs())
        } else {
            write!(f, "{:02X}", self.0)
        }
    }
}

/// Pick the state a filter-and-mix tap starts this frame from, and store it back as the
/// current state.
///
/// Exactly one branch applies: `needs_init` zeroes the state; otherwise the first mix buffer
/// of the frame snapshots the current state into `previous`; later mix buffers restore it from
/// `previous`.
pub(crate) fn prepare_state(
    states: &mut StateArena,
    state: StateHandle,
    previous: StateHandle,
    needs_init: bool,
    is_first_mix_buffer: bool,
) -> Result<BiquadFilterState, CommandError> {
    let prepared = if needs_init {
        BiquadFilterState::zeroed()
    } else if is_first_mix_buffer {
        let current = states.load(state)?;
        states.store(previous, current)?;
        current
    } else {
        states.load(previous)?
    };
    states.store(state, prepared)?;
    Ok(prepared)
}

/// Resolve every handle a command may write before it writes anything, so a failing command
/// leaves the arena as it found it.
///
/// `voice` is only checked when `volume` ramps and `last_sample_index` names a tail slot.
pub(crate) fn check_handles(
    states: &StateArena,
    handles: &[StateHandle],
    volume: MixVolume,
    voice: VoiceHandle,
    last_sample_index: i32,
) -> Result<(), CommandError> {
    for &handle in handles {
        states.load(handle)?;
    }
    if volume.has_volume_ramp() && ramp_tail_slot(last_sample_index).is_some() {
        states
            .voice(voice)
            .ok_or(CommandError::InvalidVoiceHandle(voice))?;
    }
    Ok(())
}

fn ramp_tail_slot(last_sample_index: i32) -> Option<usize> {
    usize::try_from(last_sample_index)
        .ok()
        .filter(|&i| i < MAX_MIX_BUFFERS)
}

/// Record the last mixed sample of a ramp in the voice's tail array. Indices outside
/// `0..MAX_MIX_BUFFERS` are ignored.
pub(crate) fn write_ramp_tail(
    states: &mut StateArena,
    voice: VoiceHandle,
    last_sample_index: i32,
    last: f32,
) -> Result<(), CommandError> {
    let Some(index) = ramp_tail_slot(last_sample_index) else {
        tracing::trace!(last_sample_index, "ramp tail index out of range, not recorded");
        return Ok(());
    };
    let voice = states.voice_checked_mut(voice)?;
    voice.previous_samples[index] = last as i32;
    Ok(())
}
