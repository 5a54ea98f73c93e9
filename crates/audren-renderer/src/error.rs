use thiserror::Error;

use crate::state_arena::{StateHandle, VoiceHandle};

/// Why a command could not run against the current frame.
///
/// These replace the raw-address failures of the DSP firmware (which are undefined behavior
/// there). The command-list processor logs them and moves on to the next command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(
        "mix buffer {index} out of range (buffer_count={buffer_count}, sample_count={sample_count})"
    )]
    InvalidMixBuffer {
        index: i16,
        buffer_count: u32,
        sample_count: u32,
    },

    #[error("biquad state handle {0:?} does not name a live state")]
    InvalidStateHandle(StateHandle),

    #[error("voice handle {0:?} does not name a live voice")]
    InvalidVoiceHandle(VoiceHandle),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported renderer revision {0} (expected 1..={max})", max = crate::behavior::CURRENT_REVISION)]
    UnsupportedRevision(u32),

    #[error("unsupported sample rate {0} Hz (expected 32000 or 48000)")]
    UnsupportedSampleRate(u32),

    #[error("sample count {sample_count} does not match sample rate {sample_rate} Hz (expected {expected})")]
    SampleCountMismatch {
        sample_rate: u32,
        sample_count: u32,
        expected: u32,
    },

    #[error("{field} must be in 1..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot magic")]
    InvalidMagic,

    #[error("snapshot device id mismatch (expected {expected:?}, found {found:?})")]
    DeviceIdMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported snapshot major version {found} (expected {expected})")]
    UnsupportedMajor { expected: u16, found: u16 },

    #[error("unexpected end of snapshot data")]
    UnexpectedEof,

    #[error("trailing bytes after snapshot field")]
    TrailingBytes,

    #[error("duplicate snapshot field tag {0}")]
    DuplicateTag(u16),

    #[error("snapshot field {tag} has length {len}, expected {expected}")]
    FieldLength { tag: u16, len: usize, expected: usize },

    #[error("snapshot holds {found} {what}, arena has room for {expected}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}
