// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;

/// Default bound on the number of frames kept per sample.
pub const DEFAULT_MAX_NFRAMES: usize = 64;

/// Most frames a size hint can reserve room for at once. Deeper stacks
/// still fit up to the limit; they just grow the buffer as they're pushed.
pub const MAX_RESERVED_NFRAMES: usize = 1024;

/// A call-stack entry with its strings held as handles into the profile's
/// string table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Frame {
    pub name: StringId,
    pub filename: StringId,
    pub address: u64,
    pub line: i64,
}

/// Bounded list of frames for the sample being built, leaf first.
///
/// Once full, further frames are dropped and counted rather than replacing
/// what was already captured.
#[derive(Clone, Debug)]
pub struct StackBuffer {
    frames: Vec<Frame>,
    max_frames: usize,
    dropped: u64,
}

impl StackBuffer {
    /// # Errors
    /// Fails if `max_frames` is zero.
    pub fn new(max_frames: usize) -> Result<Self, SampleError> {
        if max_frames == 0 {
            return Err(SampleError::ZeroMaxFrames);
        }
        // Don't reserve up front for a pathological limit.
        let frames = Vec::with_capacity(max_frames.min(DEFAULT_MAX_NFRAMES));
        Ok(Self {
            frames,
            max_frames,
            dropped: 0,
        })
    }

    pub fn push(&mut self, frame: Frame) -> Result<(), SampleError> {
        if self.is_full() {
            return Err(self.reject());
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Counts a frame that didn't fit and returns the error to report.
    pub fn reject(&mut self) -> SampleError {
        self.dropped += 1;
        SampleError::StackTruncated {
            limit: self.max_frames,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_frames
    }

    /// Makes room for `additional` frames, clamped to the limit and to
    /// [MAX_RESERVED_NFRAMES]. The hint never changes how many frames are
    /// accepted, and failing to reserve is not an error.
    pub fn reserve(&mut self, additional: usize) {
        let wanted = additional.min(self.max_frames).min(MAX_RESERVED_NFRAMES);
        let _ = self
            .frames
            .try_reserve(wanted.saturating_sub(self.frames.len()));
    }

    /// Empties the buffer. The dropped counter only resets with
    /// [StackBuffer::reset_dropped].
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn reset_dropped(&mut self) {
        self.dropped = 0;
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Number of frames rejected because the buffer was full.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
