// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Types exchanged at the boundary of the crate: what callers configure a
//! profile with, and what a [`crate::SampleSink`] receives on flush.

mod label_key;
mod measurement;

pub use label_key::LabelKey;
pub use measurement::{MeasurementKind, MeasurementKinds};

use crate::collections::string_table::StringTable;
use crate::internal;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ValueType<'a> {
    pub r#type: &'a str,
    pub unit: &'a str,
}

impl<'a> ValueType<'a> {
    #[inline(always)]
    pub const fn new(r#type: &'a str, unit: &'a str) -> Self {
        Self { r#type, unit }
    }
}

/// One resolved call-stack entry.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Location<'a> {
    pub name: &'a str,
    pub filename: &'a str,
    pub address: u64,
    pub line: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LabelValue<'a> {
    Str(&'a str),
    Num(i64),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Label<'a> {
    pub key: LabelKey,
    pub value: LabelValue<'a>,
}

/// A finalized sample, borrowed from the [`crate::Profile`] that produced it.
///
/// Frames and labels hold string handles; they are resolved against the
/// profile's string pool only when iterated, so producing a `Sample` never
/// copies or allocates.
#[derive(Copy, Clone)]
pub struct Sample<'a> {
    frames: &'a [internal::Frame],
    labels: &'a [internal::Label],
    values: &'a [i64],
    strings: &'a StringTable,
}

impl<'a> Sample<'a> {
    pub(crate) fn new(
        frames: &'a [internal::Frame],
        labels: &'a [internal::Label],
        values: &'a [i64],
        strings: &'a StringTable,
    ) -> Self {
        Self {
            frames,
            labels,
            values,
            strings,
        }
    }

    /// The locations of the stack, leaf first.
    pub fn locations(&self) -> impl ExactSizeIterator<Item = Location<'a>> + 'a {
        let strings = self.strings;
        self.frames.iter().map(move |frame| Location {
            name: strings.fetch(frame.name),
            filename: strings.fetch(frame.filename),
            address: frame.address,
            line: frame.line,
        })
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = Label<'a>> + 'a {
        let strings = self.strings;
        self.labels.iter().map(move |label| Label {
            key: label.key,
            value: match label.value {
                internal::LabelValue::Str(id) => LabelValue::Str(strings.fetch(id)),
                internal::LabelValue::Num(num) => LabelValue::Num(num),
            },
        })
    }

    #[inline]
    pub fn values(&self) -> &'a [i64] {
        self.values
    }

    #[inline]
    pub fn num_locations(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }
}

impl std::fmt::Debug for Sample<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sample")
            .field("locations", &self.locations().collect::<Vec<_>>())
            .field("labels", &self.labels().collect::<Vec<_>>())
            .field("values", &self.values)
            .finish()
    }
}
