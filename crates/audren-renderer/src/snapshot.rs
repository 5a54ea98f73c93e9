//! Save-state encoding for persistent renderer state.
//!
//! Layout:
//!
//! ```text
//! b"ADRS" | device id (4 bytes) | major u16 | minor u16 | field*
//! field = tag u16 | len u32 | len bytes
//! ```
//!
//! All integers are little-endian. Fields are written in ascending tag order; readers skip
//! tags they do not know, so minor versions may add fields.

use std::collections::BTreeMap;

use audren_dsp::BiquadFilterState;

use crate::error::{SnapshotError, SnapshotResult};
use crate::state_arena::{StateArena, VoiceState};
use crate::MAX_MIX_BUFFERS;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"ADRS";
const HEADER_LEN: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub major: u16,
    pub minor: u16,
}

impl SnapshotVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

pub trait StateSnapshot {
    const DEVICE_ID: [u8; 4];
    const DEVICE_VERSION: SnapshotVersion;

    fn save_state(&self) -> Vec<u8>;

    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()>;
}

/// Little-endian byte builder.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Little-endian cursor over a byte slice.
#[derive(Debug)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn bytes(&mut self, len: usize) -> SnapshotResult<&'a [u8]> {
        if self.bytes.len() < len {
            return Err(SnapshotError::UnexpectedEof);
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> SnapshotResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u16(&mut self) -> SnapshotResult<u16> {
        self.array().map(u16::from_le_bytes)
    }

    pub fn u32(&mut self) -> SnapshotResult<u32> {
        self.array().map(u32::from_le_bytes)
    }

    pub fn i32(&mut self) -> SnapshotResult<i32> {
        self.array().map(i32::from_le_bytes)
    }

    pub fn i64(&mut self) -> SnapshotResult<i64> {
        self.array().map(i64::from_le_bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn finish(self) -> SnapshotResult<()> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(SnapshotError::TrailingBytes)
        }
    }
}

pub struct SnapshotWriter {
    device_id: [u8; 4],
    version: SnapshotVersion,
    fields: BTreeMap<u16, Vec<u8>>,
}

impl SnapshotWriter {
    pub fn new(device_id: [u8; 4], version: SnapshotVersion) -> Self {
        Self {
            device_id,
            version,
            fields: BTreeMap::new(),
        }
    }

    pub fn field_u32(&mut self, tag: u16, v: u32) {
        self.field_bytes(tag, v.to_le_bytes().to_vec());
    }

    /// A later write to the same tag replaces the earlier one.
    pub fn field_bytes(&mut self, tag: u16, v: Vec<u8>) {
        self.fields.insert(tag, v);
    }

    pub fn finish(self) -> Vec<u8> {
        let mut enc = Encoder::new()
            .bytes(&SNAPSHOT_MAGIC)
            .bytes(&self.device_id)
            .u16(self.version.major)
            .u16(self.version.minor);
        for (tag, value) in self.fields {
            enc = enc.u16(tag).u32(value.len() as u32).bytes(&value);
        }
        enc.finish()
    }
}

#[derive(Debug)]
pub struct SnapshotReader<'a> {
    version: SnapshotVersion,
    fields: BTreeMap<u16, &'a [u8]>,
}

impl<'a> SnapshotReader<'a> {
    pub fn parse(bytes: &'a [u8], device_id: [u8; 4]) -> SnapshotResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::UnexpectedEof);
        }
        let mut d = Decoder::new(bytes);
        if d.bytes(4)? != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic);
        }
        let mut found = [0u8; 4];
        found.copy_from_slice(d.bytes(4)?);
        if found != device_id {
            return Err(SnapshotError::DeviceIdMismatch {
                expected: device_id,
                found,
            });
        }
        let version = SnapshotVersion::new(d.u16()?, d.u16()?);

        let mut fields = BTreeMap::new();
        while !d.is_empty() {
            let tag = d.u16()?;
            let len = d.u32()? as usize;
            let value = d.bytes(len)?;
            if fields.insert(tag, value).is_some() {
                return Err(SnapshotError::DuplicateTag(tag));
            }
        }
        d.finish()?;

        Ok(Self { version, fields })
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    pub fn ensure_device_major(&self, major: u16) -> SnapshotResult<()> {
        if self.version.major != major {
            return Err(SnapshotError::UnsupportedMajor {
                expected: major,
                found: self.version.major,
            });
        }
        Ok(())
    }

    pub fn bytes(&self, tag: u16) -> Option<&'a [u8]> {
        self.fields.get(&tag).copied()
    }

    pub fn u32(&self, tag: u16) -> SnapshotResult<Option<u32>> {
        let Some(value) = self.bytes(tag) else {
            return Ok(None);
        };
        if value.len() != 4 {
            return Err(SnapshotError::FieldLength {
                tag,
                len: value.len(),
                expected: 4,
            });
        }
        let mut d = Decoder::new(value);
        let v = d.u32()?;
        d.finish()?;
        Ok(Some(v))
    }
}

const TAG_BIQUAD_STATE_COUNT: u16 = 1;
const TAG_VOICE_COUNT: u16 = 2;
const TAG_BIQUAD_STATES: u16 = 3;
const TAG_VOICE_PREVIOUS_SAMPLES: u16 = 4;

const VOICE_STATE_BYTES: usize = MAX_MIX_BUFFERS * 4;

impl StateSnapshot for StateArena {
    const DEVICE_ID: [u8; 4] = *b"BQST";
    const DEVICE_VERSION: SnapshotVersion = SnapshotVersion::new(1, 0);

    fn save_state(&self) -> Vec<u8> {
        let mut w = SnapshotWriter::new(Self::DEVICE_ID, Self::DEVICE_VERSION);
        w.field_u32(TAG_BIQUAD_STATE_COUNT, self.biquad_state_count() as u32);
        w.field_u32(TAG_VOICE_COUNT, self.voice_count() as u32);

        // Raw register words, so every double comes back with the same bits.
        let mut enc = Encoder::new();
        for state in self.biquad_states() {
            for word in state.words() {
                enc = enc.i64(word);
            }
        }
        w.field_bytes(TAG_BIQUAD_STATES, enc.finish());

        let mut enc = Encoder::new();
        for voice in self.voices() {
            for sample in voice.previous_samples {
                enc = enc.i32(sample);
            }
        }
        w.field_bytes(TAG_VOICE_PREVIOUS_SAMPLES, enc.finish());

        w.finish()
    }

    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        let r = SnapshotReader::parse(bytes, Self::DEVICE_ID)?;
        r.ensure_device_major(Self::DEVICE_VERSION.major)?;

        let state_count = r.u32(TAG_BIQUAD_STATE_COUNT)?.unwrap_or(0) as usize;
        let voice_count = r.u32(TAG_VOICE_COUNT)?.unwrap_or(0) as usize;
        if state_count != self.biquad_state_count() {
            return Err(SnapshotError::CountMismatch {
                what: "biquad states",
                expected: self.biquad_state_count(),
                found: state_count,
            });
        }
        if voice_count != self.voice_count() {
            return Err(SnapshotError::CountMismatch {
                what: "voices",
                expected: self.voice_count(),
                found: voice_count,
            });
        }

        let raw = r.bytes(TAG_BIQUAD_STATES).unwrap_or_default();
        let expected = state_count * BiquadFilterState::SIZE_BYTES;
        if raw.len() != expected {
            return Err(SnapshotError::FieldLength {
                tag: TAG_BIQUAD_STATES,
                len: raw.len(),
                expected,
            });
        }
        let mut d = Decoder::new(raw);
        let mut biquad_states = Vec::with_capacity(state_count);
        for _ in 0..state_count {
            let words = [d.i64()?, d.i64()?, d.i64()?, d.i64()?];
            biquad_states.push(BiquadFilterState::from_words(words));
        }
        d.finish()?;

        let raw = r.bytes(TAG_VOICE_PREVIOUS_SAMPLES).unwrap_or_default();
        let expected = voice_count * VOICE_STATE_BYTES;
        if raw.len() != expected {
            return Err(SnapshotError::FieldLength {
                tag: TAG_VOICE_PREVIOUS_SAMPLES,
                len: raw.len(),
                expected,
            });
        }
        let mut d = Decoder::new(raw);
        let mut voices = Vec::with_capacity(voice_count);
        for _ in 0..voice_count {
            let mut voice = VoiceState::default();
            for sample in voice.previous_samples.iter_mut() {
                *sample = d.i32()?;
            }
            voices.push(voice);
        }
        d.finish()?;

        self.restore(biquad_states, voices);
        Ok(())
    }
}
