//! Renderer sizing and revision, loaded from JSON or from `AUDREN_*` environment variables.

use serde::{Deserialize, Serialize};

use crate::behavior::{BehaviorInfo, CURRENT_REVISION};
use crate::error::ConfigError;
use crate::processor::MixBufferArena;
use crate::splitter::SplitterDestinationPool;
use crate::state_arena::StateArena;

pub const REVISION_ENV: &str = "AUDREN_REVISION";
pub const SAMPLE_RATE_ENV: &str = "AUDREN_SAMPLE_RATE";
pub const SAMPLE_COUNT_ENV: &str = "AUDREN_SAMPLE_COUNT";
pub const MIX_BUFFER_COUNT_ENV: &str = "AUDREN_MIX_BUFFER_COUNT";
pub const VOICE_COUNT_ENV: &str = "AUDREN_VOICE_COUNT";
pub const BIQUAD_STATE_COUNT_ENV: &str = "AUDREN_BIQUAD_STATE_COUNT";
pub const SPLITTER_DESTINATION_COUNT_ENV: &str = "AUDREN_SPLITTER_DESTINATION_COUNT";

/// Largest mix-buffer arena a renderer may allocate (final mixes plus sub-mixes).
pub const MAX_MIX_BUFFER_ARENA: u32 = 512;
pub const MAX_VOICE_COUNT: u32 = 1024;
pub const MAX_BIQUAD_STATE_COUNT: u32 = 8192;
pub const MAX_SPLITTER_DESTINATION_COUNT: u32 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub revision: u32,
    pub sample_rate: u32,
    pub sample_count: u32,
    pub mix_buffer_count: u32,
    pub voice_count: u32,
    pub biquad_state_count: u32,
    pub splitter_destination_count: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            revision: CURRENT_REVISION,
            sample_rate: 48_000,
            sample_count: 240,
            mix_buffer_count: 24,
            voice_count: 64,
            biquad_state_count: 128,
            splitter_destination_count: 32,
        }
    }
}

impl RendererConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by any `AUDREN_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let fields: [(&'static str, &mut u32); 7] = [
            (REVISION_ENV, &mut config.revision),
            (SAMPLE_RATE_ENV, &mut config.sample_rate),
            (SAMPLE_COUNT_ENV, &mut config.sample_count),
            (MIX_BUFFER_COUNT_ENV, &mut config.mix_buffer_count),
            (VOICE_COUNT_ENV, &mut config.voice_count),
            (BIQUAD_STATE_COUNT_ENV, &mut config.biquad_state_count),
            (SPLITTER_DESTINATION_COUNT_ENV, &mut config.splitter_destination_count),
        ];
        for (var, slot) in fields {
            let Some(raw) = lookup(var) else {
                continue;
            };
            *slot = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var, value: raw.clone() })?;
        }

        config.validate()?;
        tracing::debug!(?config, "renderer config loaded from environment");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=CURRENT_REVISION).contains(&self.revision) {
            return Err(ConfigError::UnsupportedRevision(self.revision));
        }

        let expected = match self.sample_rate {
            32_000 => 160,
            48_000 => 240,
            other => return Err(ConfigError::UnsupportedSampleRate(other)),
        };
        if self.sample_count != expected {
            return Err(ConfigError::SampleCountMismatch {
                sample_rate: self.sample_rate,
                sample_count: self.sample_count,
                expected,
            });
        }

        for (field, value, max) in [
            ("mix_buffer_count", self.mix_buffer_count, MAX_MIX_BUFFER_ARENA),
            ("voice_count", self.voice_count, MAX_VOICE_COUNT),
            ("biquad_state_count", self.biquad_state_count, MAX_BIQUAD_STATE_COUNT),
            (
                "splitter_destination_count",
                self.splitter_destination_count,
                MAX_SPLITTER_DESTINATION_COUNT,
            ),
        ] {
            if !(1..=max).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value, max });
            }
        }
        Ok(())
    }

    pub fn behavior(&self) -> BehaviorInfo {
        BehaviorInfo::new(self.revision)
    }

    pub fn build_state_arena(&self) -> StateArena {
        StateArena::with_counts(self.biquad_state_count as usize, self.voice_count as usize)
    }

    pub fn build_mix_buffers(&self) -> MixBufferArena {
        MixBufferArena::new(self.mix_buffer_count, self.sample_count)
    }

    pub fn build_splitter_pool(&self) -> SplitterDestinationPool {
        SplitterDestinationPool::new(self.splitter_destination_count as usize)
    }
}
