//! Audio renderer command layer for biquad filtering.
//!
//! Commands ([`command`]) are parameter blocks that a [`CommandListProcessor`] runs once per
//! frame, in list order, against a flat arena of mix buffers. State that outlives the frame
//! (biquad delay lines, voice tail samples) lives in a [`StateArena`] and is referenced by
//! handle. Splitter destinations ([`splitter`]) hold the per-destination send volumes and
//! filters that feed these commands.
//!
//! DSP kernels live in `audren-dsp`; this crate owns scheduling-free plumbing around them.

#![forbid(unsafe_code)]

pub mod behavior;
pub mod command;
pub mod config;
pub mod error;
pub mod processor;
pub mod snapshot;
pub mod splitter;
pub mod state_arena;

/// Mix buffers a voice or splitter destination can send to.
pub const MAX_MIX_BUFFERS: usize = 24;

/// Biquad filters per voice or splitter destination.
pub const MAX_BIQUAD_FILTERS: usize = 2;

pub use behavior::{BehaviorInfo, CURRENT_REVISION};
pub use command::{
    BiquadFilterAndMixCommand, BiquadFilterCommand, Command, FilterKernel, MixVolume,
    MultiTapBiquadFilterAndMixCommand, RendererCommand,
};
pub use config::RendererConfig;
pub use error::{CommandError, ConfigError, SnapshotError, SnapshotResult};
pub use processor::{CommandListProcessor, MixBufferArena, ProcessSummary};
pub use snapshot::{StateSnapshot, SnapshotVersion};
pub use splitter::{
    SplitterBiquadFilter, SplitterDestinationData, SplitterDestinationInParameter,
    SplitterDestinationPool, UNUSED_MIX_ID,
};
pub use state_arena::{StateArena, StateHandle, VoiceHandle, VoiceState};
