//! Owned storage for state that outlives a frame's command list.
//!
//! Commands reference biquad states and voice states by handle instead of by address. A handle
//! is an index into this arena; the processor resolves it for the duration of one `process`
//! call.

use audren_dsp::BiquadFilterState;

use crate::error::CommandError;
use crate::MAX_MIX_BUFFERS;

/// Index of a [`BiquadFilterState`] in a [`StateArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateHandle(pub u32);

/// Index of a [`VoiceState`] in a [`StateArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u32);

/// The part of a voice's state the biquad commands write to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceState {
    /// Last mixed sample per mix buffer, used by the voice layer for ramp continuity.
    pub previous_samples: [i32; MAX_MIX_BUFFERS],
}

impl Default for VoiceState {
    fn default() -> Self {
        Self {
            previous_samples: [0; MAX_MIX_BUFFERS],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateArena {
    biquad_states: Vec<BiquadFilterState>,
    voices: Vec<VoiceState>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena with `biquad_state_count` zeroed states and `voice_count` zeroed voices.
    /// Handles `0..count` are valid immediately.
    pub fn with_counts(biquad_state_count: usize, voice_count: usize) -> Self {
        Self {
            biquad_states: vec![BiquadFilterState::zeroed(); biquad_state_count],
            voices: vec![VoiceState::default(); voice_count],
        }
    }

    pub fn alloc_biquad_state(&mut self) -> StateHandle {
        let handle = StateHandle(self.biquad_states.len() as u32);
        self.biquad_states.push(BiquadFilterState::zeroed());
        handle
    }

    pub fn alloc_voice(&mut self) -> VoiceHandle {
        let handle = VoiceHandle(self.voices.len() as u32);
        self.voices.push(VoiceState::default());
        handle
    }

    pub fn biquad_state_count(&self) -> usize {
        self.biquad_states.len()
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn biquad_states(&self) -> &[BiquadFilterState] {
        &self.biquad_states
    }

    pub fn voices(&self) -> &[VoiceState] {
        &self.voices
    }

    pub fn biquad_state(&self, handle: StateHandle) -> Option<&BiquadFilterState> {
        self.biquad_states.get(handle.0 as usize)
    }

    pub fn biquad_state_mut(&mut self, handle: StateHandle) -> Option<&mut BiquadFilterState> {
        self.biquad_states.get_mut(handle.0 as usize)
    }

    pub fn voice(&self, handle: VoiceHandle) -> Option<&VoiceState> {
        self.voices.get(handle.0 as usize)
    }

    pub fn voice_mut(&mut self, handle: VoiceHandle) -> Option<&mut VoiceState> {
        self.voices.get_mut(handle.0 as usize)
    }

    /// Copy a state out of the arena.
    pub(crate) fn load(&self, handle: StateHandle) -> Result<BiquadFilterState, CommandError> {
        self.biquad_state(handle)
            .copied()
            .ok_or(CommandError::InvalidStateHandle(handle))
    }

    /// Write a state back into the arena.
    pub(crate) fn store(
        &mut self,
        handle: StateHandle,
        state: BiquadFilterState,
    ) -> Result<(), CommandError> {
        let slot = self
            .biquad_state_mut(handle)
            .ok_or(CommandError::InvalidStateHandle(handle))?;
        *slot = state;
        Ok(())
    }

    pub(crate) fn voice_checked_mut(
        &mut self,
        handle: VoiceHandle,
    ) -> Result<&mut VoiceState, CommandError> {
        self.voice_mut(handle)
            .ok_or(CommandError::InvalidVoiceHandle(handle))
    }

    /// Replace the contents wholesale (snapshot restore).
    pub(crate) fn restore(&mut self, biquad_states: Vec<BiquadFilterState>, voices: Vec<VoiceState>) {
        self.biquad_states = biquad_states;
        self.voices = voices;
    }
}
