// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A category of data a profile can track. The discriminants are the bits
/// used in a [`MeasurementKinds`] mask.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum MeasurementKind {
    Cpu = 1 << 0,
    Wall = 1 << 1,
    Exception = 1 << 2,
    LockAcquire = 1 << 3,
    LockRelease = 1 << 4,
    Allocation = 1 << 5,
    Heap = 1 << 6,
}

impl MeasurementKind {
    /// Every kind, in canonical order. Value slots are laid out in this
    /// order no matter how the kinds were selected.
    pub const ALL: [MeasurementKind; 7] = [
        MeasurementKind::Cpu,
        MeasurementKind::Wall,
        MeasurementKind::Exception,
        MeasurementKind::LockAcquire,
        MeasurementKind::LockRelease,
        MeasurementKind::Allocation,
        MeasurementKind::Heap,
    ];

    #[inline]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MeasurementKind::Cpu => "cpu",
            MeasurementKind::Wall => "wall",
            MeasurementKind::Exception => "exception",
            MeasurementKind::LockAcquire => "lock_acquire",
            MeasurementKind::LockRelease => "lock_release",
            MeasurementKind::Allocation => "allocation",
            MeasurementKind::Heap => "heap",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`MeasurementKind`]s, stored as a bitmask.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct MeasurementKinds(u32);

impl MeasurementKinds {
    pub const EMPTY: MeasurementKinds = MeasurementKinds(0);
    pub const ALL: MeasurementKinds = MeasurementKinds(
        MeasurementKind::Cpu.bit()
            | MeasurementKind::Wall.bit()
            | MeasurementKind::Exception.bit()
            | MeasurementKind::LockAcquire.bit()
            | MeasurementKind::LockRelease.bit()
            | MeasurementKind::Allocation.bit()
            | MeasurementKind::Heap.bit(),
    );

    /// Builds a mask from raw bits, or `None` if any bit doesn't belong to a
    /// known kind.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Builds a mask from raw bits, dropping the bits that don't belong to a
    /// known kind.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, kind: MeasurementKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn with(self, kind: MeasurementKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn insert(&mut self, kind: MeasurementKind) {
        self.0 |= kind.bit();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the kinds in the set, in canonical order.
    pub fn iter(self) -> impl Iterator<Item = MeasurementKind> {
        MeasurementKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl fmt::Debug for MeasurementKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<MeasurementKind> for MeasurementKinds {
    fn from(kind: MeasurementKind) -> Self {
        Self(kind.bit())
    }
}

impl BitOr for MeasurementKinds {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<MeasurementKind> for MeasurementKinds {
    type Output = Self;

    fn bitor(self, rhs: MeasurementKind) -> Self {
        self.with(rhs)
    }
}

impl BitOr for MeasurementKind {
    type Output = MeasurementKinds;

    fn bitor(self, rhs: Self) -> MeasurementKinds {
        MeasurementKinds::from(self).with(rhs)
    }
}

impl BitOrAssign<MeasurementKind> for MeasurementKinds {
    fn bitor_assign(&mut self, rhs: MeasurementKind) {
        self.insert(rhs);
    }
}

impl FromIterator<MeasurementKind> for MeasurementKinds {
    fn from_iter<T: IntoIterator<Item = MeasurementKind>>(iter: T) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}
