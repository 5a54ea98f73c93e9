//! Per-frame execution context for renderer commands.
//!
//! The mix-buffer arena is one flat `i32` slice holding `buffer_count` buffers of
//! `sample_count` samples each; buffer `i` lives at `i * sample_count`. Commands only touch the
//! input and output spans they name.

use crate::command::{Command, RendererCommand};
use crate::error::CommandError;
use crate::state_arena::StateArena;

/// Owned backing storage for a frame's mix buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixBufferArena {
    samples: Vec<i32>,
    buffer_count: u32,
    sample_count: u32,
}

impl MixBufferArena {
    pub fn new(buffer_count: u32, sample_count: u32) -> Self {
        let len = buffer_count as usize * sample_count as usize;
        Self {
            samples: vec![0; len],
            buffer_count,
            sample_count,
        }
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn buffer(&self, index: u32) -> Option<&[i32]> {
        let range = self.range(index)?;
        self.samples.get(range)
    }

    pub fn buffer_mut(&mut self, index: u32) -> Option<&mut [i32]> {
        let range = self.range(index)?;
        self.samples.get_mut(range)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    /// Zero every buffer (start of a frame).
    pub fn clear(&mut self) {
        self.samples.fill(0);
    }

    fn range(&self, index: u32) -> Option<std::ops::Range<usize>> {
        if index >= self.buffer_count {
            return None;
        }
        let start = index as usize * self.sample_count as usize;
        Some(start..start + self.sample_count as usize)
    }
}

/// Input span, output span and state arena for one command, borrowed disjointly.
pub(crate) struct FrameIo<'p> {
    pub input: &'p [i32],
    pub output: &'p mut [i32],
    pub states: &'p mut StateArena,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// What every command's `process` sees: the frame's sample count, the mix-buffer arena and the
/// persistent state arena.
#[derive(Debug)]
pub struct CommandListProcessor<'a> {
    sample_count: u32,
    buffer_count: u32,
    mix_buffers: &'a mut [i32],
    states: &'a mut StateArena,
    /// Copy of the input span when a command filters a buffer in place.
    scratch: Vec<i32>,
}

impl<'a> CommandListProcessor<'a> {
    pub fn new(mix_buffers: &'a mut [i32], sample_count: u32, states: &'a mut StateArena) -> Self {
        let buffer_count = match sample_count {
            0 => 0,
            n => (mix_buffers.len() / n as usize) as u32,
        };
        Self {
            sample_count,
            buffer_count,
            mix_buffers,
            states,
            scratch: Vec::with_capacity(sample_count as usize),
        }
    }

    pub fn from_arena(mix_buffers: &'a mut MixBufferArena, states: &'a mut StateArena) -> Self {
        let sample_count = mix_buffers.sample_count();
        Self::new(mix_buffers.as_mut_slice(), sample_count, states)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    pub fn mix_buffer(&self, index: u32) -> Option<&[i32]> {
        if index >= self.buffer_count {
            return None;
        }
        let count = self.sample_count as usize;
        let start = index as usize * count;
        self.mix_buffers.get(start..start + count)
    }

    pub fn states(&self) -> &StateArena {
        self.states
    }

    /// Append every command's diagnostic line, in list order.
    pub fn dump_list(&self, commands: &[Command]) -> String {
        let mut out = String::new();
        for command in commands {
            command.dump(self, &mut out);
        }
        out
    }

    /// Run `commands` once each, in order.
    ///
    /// A command that fails verification or references a buffer or handle that does not exist is
    /// logged and skipped; the rest of the list still runs.
    pub fn process_list(&mut self, commands: &[Command]) -> ProcessSummary {
        let mut summary = ProcessSummary::default();
        for (index, command) in commands.iter().enumerate() {
            if !command.verify(self) {
                tracing::warn!(index, command = command.name(), "command failed verification");
                summary.skipped += 1;
                continue;
            }
            match command.process(self) {
                Ok(()) => summary.processed += 1,
                Err(err) => {
                    tracing::warn!(index, command = command.name(), "command skipped: {err}");
                    summary.skipped += 1;
                }
            }
        }
        tracing::trace!(
            processed = summary.processed,
            skipped = summary.skipped,
            sample_count = self.sample_count,
            "command list processed"
        );
        summary
    }

    fn span_offset(&self, index: i16) -> Result<usize, CommandError> {
        match u32::try_from(index) {
            Ok(i) if i < self.buffer_count => Ok(i as usize * self.sample_count as usize),
            _ => Err(CommandError::InvalidMixBuffer {
                index,
                buffer_count: self.buffer_count,
                sample_count: self.sample_count,
            }),
        }
    }

    /// Resolve the `input`/`output` buffer indices to spans of `sample_count` samples.
    ///
    /// When both indices name the same buffer the input span is a scratch copy, so kernels can
    /// write the output while still reading the original input.
    pub(crate) fn frame_io(&mut self, input: i16, output: i16) -> Result<FrameIo<'_>, CommandError> {
        let count = self.sample_count as usize;
        if count == 0 {
            return Ok(FrameIo {
                input: &[],
                output: &mut [],
                states: &mut *self.states,
                sample_count: 0,
            });
        }

        let in_off = self.span_offset(input)?;
        let out_off = self.span_offset(output)?;

        let Self {
            mix_buffers,
            states,
            scratch,
            ..
        } = self;

        let (input, output): (&[i32], &mut [i32]) = if in_off == out_off {
            scratch.clear();
            scratch.extend_from_slice(&mix_buffers[in_off..in_off + count]);
            (scratch.as_slice(), &mut mix_buffers[out_off..out_off + count])
        } else if in_off < out_off {
            let (head, tail) = mix_buffers.split_at_mut(out_off);
            (&head[in_off..in_off + count], &mut tail[..count])
        } else {
            let (head, tail) = mix_buffers.split_at_mut(in_off);
            (&tail[..count], &mut head[out_off..out_off + count])
        };

        Ok(FrameIo {
            input,
            output,
            states: &mut **states,
            sample_count: count,
        })
    }
}
