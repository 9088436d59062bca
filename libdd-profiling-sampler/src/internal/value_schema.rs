// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::api::{MeasurementKind, MeasurementKinds, ValueType};
use arrayvec::ArrayVec;
use enum_map::{Enum, EnumMap};

/// The most slots a schema can have: every kind enabled.
pub const MAX_VALUE_SLOTS: usize = 12;

/// One numeric column of a sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Enum)]
pub enum ValueSlot {
    CpuTime,
    CpuCount,
    WallTime,
    WallCount,
    ExceptionCount,
    LockAcquireTime,
    LockAcquireCount,
    LockReleaseTime,
    LockReleaseCount,
    AllocSpace,
    AllocCount,
    HeapSpace,
}

impl ValueSlot {
    pub const fn kind(self) -> MeasurementKind {
        match self {
            ValueSlot::CpuTime | ValueSlot::CpuCount => MeasurementKind::Cpu,
            ValueSlot::WallTime | ValueSlot::WallCount => MeasurementKind::Wall,
            ValueSlot::ExceptionCount => MeasurementKind::Exception,
            ValueSlot::LockAcquireTime | ValueSlot::LockAcquireCount => {
                MeasurementKind::LockAcquire
            }
            ValueSlot::LockReleaseTime | ValueSlot::LockReleaseCount => {
                MeasurementKind::LockRelease
            }
            ValueSlot::AllocSpace | ValueSlot::AllocCount => MeasurementKind::Allocation,
            ValueSlot::HeapSpace => MeasurementKind::Heap,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ValueSlot::CpuTime => "cpu_time",
            ValueSlot::CpuCount => "cpu_count",
            ValueSlot::WallTime => "wall_time",
            ValueSlot::WallCount => "wall_count",
            ValueSlot::ExceptionCount => "exception_count",
            ValueSlot::LockAcquireTime => "lock_acquire_time",
            ValueSlot::LockAcquireCount => "lock_acquire_count",
            ValueSlot::LockReleaseTime => "lock_release_time",
            ValueSlot::LockReleaseCount => "lock_release_count",
            ValueSlot::AllocSpace => "alloc_space",
            ValueSlot::AllocCount => "alloc_count",
            ValueSlot::HeapSpace => "heap_space",
        }
    }

    /// The pprof sample type this slot is reported as.
    pub const fn value_type(self) -> ValueType<'static> {
        match self {
            ValueSlot::CpuTime => ValueType::new("cpu-time", "nanoseconds"),
            ValueSlot::CpuCount => ValueType::new("cpu-samples", "count"),
            ValueSlot::WallTime => ValueType::new("wall-time", "nanoseconds"),
            ValueSlot::WallCount => ValueType::new("wall-samples", "count"),
            ValueSlot::ExceptionCount => ValueType::new("exception-samples", "count"),
            ValueSlot::LockAcquireTime => ValueType::new("lock-acquire-wait", "nanoseconds"),
            ValueSlot::LockAcquireCount => ValueType::new("lock-acquire", "count"),
            ValueSlot::LockReleaseTime => ValueType::new("lock-release-hold", "nanoseconds"),
            ValueSlot::LockReleaseCount => ValueType::new("lock-release", "count"),
            ValueSlot::AllocSpace => ValueType::new("alloc-space", "bytes"),
            ValueSlot::AllocCount => ValueType::new("alloc-samples", "count"),
            ValueSlot::HeapSpace => ValueType::new("heap-space", "bytes"),
        }
    }
}

/// The slots a kind contributes, in order.
pub const fn slots_of(kind: MeasurementKind) -> &'static [ValueSlot] {
    match kind {
        MeasurementKind::Cpu => &[ValueSlot::CpuTime, ValueSlot::CpuCount],
        MeasurementKind::Wall => &[ValueSlot::WallTime, ValueSlot::WallCount],
        MeasurementKind::Exception => &[ValueSlot::ExceptionCount],
        MeasurementKind::LockAcquire => &[ValueSlot::LockAcquireTime, ValueSlot::LockAcquireCount],
        MeasurementKind::LockRelease => &[ValueSlot::LockReleaseTime, ValueSlot::LockReleaseCount],
        MeasurementKind::Allocation => &[ValueSlot::AllocSpace, ValueSlot::AllocCount],
        MeasurementKind::Heap => &[ValueSlot::HeapSpace],
    }
}

/// Maps the enabled measurement kinds of a profile to offsets in its values
/// vector. Built once per profile and never mutated.
///
/// # Example
/// ```
/// # use libdd_profiling_sampler::internal::{ValueSchema, ValueSlot};
/// # use libdd_profiling_sampler::MeasurementKind;
/// let schema = ValueSchema::new(MeasurementKind::Wall | MeasurementKind::Heap).unwrap();
/// assert_eq!(schema.len(), 3);
/// assert_eq!(schema.offset(ValueSlot::WallCount), Some(1));
/// assert_eq!(schema.offset(ValueSlot::HeapSpace), Some(2));
/// assert_eq!(schema.offset(ValueSlot::CpuTime), None);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValueSchema {
    kinds: MeasurementKinds,
    slots: ArrayVec<ValueSlot, MAX_VALUE_SLOTS>,
    offsets: EnumMap<ValueSlot, Option<usize>>,
}

impl ValueSchema {
    /// # Errors
    /// Fails if `kinds` is empty.
    pub fn new(kinds: MeasurementKinds) -> Result<Self, SampleError> {
        if kinds.is_empty() {
            return Err(SampleError::EmptyTypeMask);
        }

        let mut slots = ArrayVec::new();
        let mut offsets = EnumMap::default();
        for slot in kinds.iter().flat_map(slots_of).copied() {
            offsets[slot] = Some(slots.len());
            slots.push(slot);
        }

        Ok(Self {
            kinds,
            slots,
            offsets,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: a schema cannot be built without slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn kinds(&self) -> MeasurementKinds {
        self.kinds
    }

    #[inline]
    pub fn contains(&self, kind: MeasurementKind) -> bool {
        self.kinds.contains(kind)
    }

    pub fn slots(&self) -> &[ValueSlot] {
        &self.slots
    }

    #[inline]
    pub fn offset(&self, slot: ValueSlot) -> Option<usize> {
        self.offsets[slot]
    }

    /// The sample types in column order.
    pub fn value_types(&self) -> impl ExactSizeIterator<Item = ValueType<'static>> + '_ {
        self.slots.iter().map(|slot| slot.value_type())
    }

    /// Writes `values` into the slots of `kind`, in slot order. Nothing is
    /// written unless the kind is enabled.
    pub(crate) fn write(
        &self,
        target: &mut [i64],
        kind: MeasurementKind,
        values: &[i64],
    ) -> Result<(), SampleError> {
        if !self.contains(kind) {
            return Err(SampleError::KindNotEnabled { kind });
        }
        debug_assert_eq!(target.len(), self.len());
        debug_assert_eq!(slots_of(kind).len(), values.len());
        for (slot, value) in slots_of(kind).iter().zip(values) {
            if let Some(offset) = self.offsets[*slot] {
                target[offset] = *value;
            }
        }
        Ok(())
    }
}
