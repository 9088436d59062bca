// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The deduplicated building blocks of an aggregated profile. Ids are not
//! stored on the items; they are the item's offset in the set that holds it.

use crate::collections::identifiable::*;
use crate::pprof;
use std::num::NonZeroU32;

pub trait PprofItem: Item {
    /// The pprof message this item becomes, e.g. Function -> pprof::Function.
    type PprofMessage: prost::Message;

    fn to_pprof(&self, id: Self::Id) -> Self::PprofMessage;
}

/// Converts a set of items into pprof messages, handing out the ids that
/// [Dedup::dedup] returned for them.
pub fn into_pprof_iter<T: PprofItem>(
    collection: FxIndexSet<T>,
) -> impl Iterator<Item = T::PprofMessage> {
    collection
        .into_iter()
        .enumerate()
        .map(|(offset, item)| item.to_pprof(<T as Item>::Id::from_offset(offset)))
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Function {
    pub name: StringId,
    pub filename: StringId,
}

impl Item for Function {
    type Id = FunctionId;
}

impl PprofItem for Function {
    type PprofMessage = pprof::Function;

    fn to_pprof(&self, id: Self::Id) -> Self::PprofMessage {
        pprof::Function {
            id: id.to_raw_id(),
            name: self.name.to_raw_id(),
            filename: self.filename.to_raw_id(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FunctionId(NonZeroU32);

impl Id for FunctionId {
    type RawId = u64;

    fn from_offset(offset: usize) -> Self {
        #[allow(clippy::expect_used)]
        let id = small_non_zero_pprof_id(offset).expect("FunctionId to fit into a u32");
        Self(id)
    }

    fn to_raw_id(&self) -> Self::RawId {
        self.0.get().into()
    }
}

/// One line per location; inlined frames are never produced.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Location {
    pub function_id: FunctionId,
    pub address: u64,
    pub line: i64,
}

impl Item for Location {
    type Id = LocationId;
}

impl PprofItem for Location {
    type PprofMessage = pprof::Location;

    fn to_pprof(&self, id: Self::Id) -> Self::PprofMessage {
        pprof::Location {
            id: id.to_raw_id(),
            address: self.address,
            lines: vec![pprof::Line {
                function_id: self.function_id.to_raw_id(),
                line: self.line,
            }],
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LocationId(NonZeroU32);

impl Id for LocationId {
    type RawId = u64;

    fn from_offset(offset: usize) -> Self {
        #[allow(clippy::expect_used)]
        let id = small_non_zero_pprof_id(offset).expect("LocationId to fit into a u32");
        Self(id)
    }

    fn to_raw_id(&self) -> Self::RawId {
        self.0.get().into()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StackTrace {
    /// The leaf is at locations[0].
    pub locations: Box<[LocationId]>,
}

impl Item for StackTrace {
    type Id = StackTraceId;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct StackTraceId(u32);

impl StackTraceId {
    #[inline]
    pub fn to_offset(self) -> usize {
        self.0 as usize
    }
}

impl Id for StackTraceId {
    type RawId = usize;

    fn from_offset(inner: usize) -> Self {
        #[allow(clippy::expect_used)]
        let index: u32 = inner.try_into().expect("StackTraceId to fit into a u32");
        Self(index)
    }

    fn to_raw_id(&self) -> Self::RawId {
        self.0 as Self::RawId
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum LabelValue {
    Str(StringId),
    Num(i64),
}

/// A label whose key and string value live in the aggregator's own table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Label {
    pub key: StringId,
    pub value: LabelValue,
}

impl From<&Label> for pprof::Label {
    fn from(label: &Label) -> pprof::Label {
        let key = label.key.to_raw_id();
        match label.value {
            LabelValue::Str(str) => Self {
                key,
                str: str.to_raw_id(),
                num: 0,
            },
            LabelValue::Num(num) => Self { key, str: 0, num },
        }
    }
}

impl Item for Label {
    type Id = LabelId;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LabelId(u32);

impl LabelId {
    #[inline]
    pub fn to_offset(self) -> usize {
        self.0 as usize
    }
}

impl Id for LabelId {
    type RawId = usize;

    fn from_offset(inner: usize) -> Self {
        #[allow(clippy::expect_used)]
        let index: u32 = inner.try_into().expect("LabelId to fit into a u32");
        Self(index)
    }

    fn to_raw_id(&self) -> Self::RawId {
        self.0 as Self::RawId
    }
}

/// A canonical representation for sets of labels: two samples with the same
/// labels pushed in a different order share one set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct LabelSet {
    // Guaranteed to be sorted by [Self::new]
    sorted_labels: Box<[LabelId]>,
}

impl LabelSet {
    pub fn new(mut labels: Vec<LabelId>) -> Self {
        labels.sort_unstable();
        Self {
            sorted_labels: labels.into_boxed_slice(),
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, LabelId> {
        self.sorted_labels.iter()
    }
}

impl Item for LabelSet {
    type Id = LabelSetId;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct LabelSetId(u32);

impl LabelSetId {
    #[inline]
    pub fn to_offset(self) -> usize {
        self.0 as usize
    }
}

impl Id for LabelSetId {
    type RawId = usize;

    fn from_offset(inner: usize) -> Self {
        #[allow(clippy::expect_used)]
        let index: u32 = inner.try_into().expect("LabelSetId to fit into a u32");
        Self(index)
    }

    fn to_raw_id(&self) -> Self::RawId {
        self.0 as Self::RawId
    }
}

/// What makes two samples the same for aggregation purposes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Observation {
    pub labels: LabelSetId,
    pub stack_trace: StackTraceId,
}
