// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;

/// The reusable storage behind the one sample a profile builds at a time.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    values: Vec<i64>,
    stack: StackBuffer,
    labels: LabelBuffer,
}

impl SampleBuffer {
    pub fn new(schema: &ValueSchema, max_frames: usize) -> Result<Self, SampleError> {
        Ok(Self {
            values: vec![0; schema.len()],
            stack: StackBuffer::new(max_frames)?,
            labels: LabelBuffer::new(),
        })
    }

    /// Clears frames and labels, zeroes every value, and reserves room for
    /// up to `expected_frames` frames (never past the stack's limit).
    pub fn begin(&mut self, expected_frames: usize) {
        self.clear();
        self.stack.reset_dropped();
        self.stack.reserve(expected_frames);
    }

    pub fn clear(&mut self) {
        self.values.fill(0);
        self.stack.clear();
        self.labels.clear();
    }

    #[inline]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [i64] {
        &mut self.values
    }

    #[inline]
    pub fn stack(&self) -> &StackBuffer {
        &self.stack
    }

    #[inline]
    pub fn stack_mut(&mut self) -> &mut StackBuffer {
        &mut self.stack
    }

    #[inline]
    pub fn labels(&self) -> &LabelBuffer {
        &self.labels
    }

    #[inline]
    pub fn labels_mut(&mut self) -> &mut LabelBuffer {
        &mut self.labels
    }
}
