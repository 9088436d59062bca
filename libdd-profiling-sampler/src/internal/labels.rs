// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::api::LabelKey;
use arrayvec::ArrayVec;

/// The most labels a single sample can carry.
pub const MAX_LABELS: usize = 8;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LabelValue {
    Str(StringId),
    Num(i64),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Label {
    pub key: LabelKey,
    pub value: LabelValue,
}

impl Label {
    pub fn str(key: LabelKey, value: StringId) -> Self {
        Self {
            key,
            value: LabelValue::Str(value),
        }
    }

    pub fn num(key: LabelKey, value: i64) -> Self {
        Self {
            key,
            value: LabelValue::Num(value),
        }
    }
}

/// Labels for the sample being built, in insertion order. Duplicate keys are
/// not collapsed here.
#[derive(Clone, Debug, Default)]
pub struct LabelBuffer {
    labels: ArrayVec<Label, MAX_LABELS>,
}

impl LabelBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: Label) -> Result<(), SampleError> {
        self.labels
            .try_push(label)
            .map_err(|_| SampleError::LabelsFull { limit: MAX_LABELS })
    }

    /// Pushes every label or none of them.
    pub fn push_all(&mut self, labels: &[Label]) -> Result<(), SampleError> {
        if self.remaining() < labels.len() {
            return Err(SampleError::LabelsFull { limit: MAX_LABELS });
        }
        self.labels.extend(labels.iter().copied());
        Ok(())
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.labels.remaining_capacity()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
