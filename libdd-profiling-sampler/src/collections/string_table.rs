// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::identifiable::{FxIndexSet, Id, StringId};

/// Holds unique strings and provides [StringId]s that correspond to the order
/// that the strings were inserted.
///
/// Callers keep [StringId]s rather than references, so nothing can outlive
/// the table's storage. Resolving an id hands out a `&str` whose lifetime is
/// tied to the borrow of the table.
pub struct StringTable {
    /// The ordered set of unique strings. The order becomes the StringId.
    strings: FxIndexSet<Box<str>>,
    /// Sum of the lengths of every string held, in bytes.
    bytes: usize,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    /// Creates a new string table, which initially holds the empty string and
    /// no others.
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut strings = FxIndexSet::with_capacity_and_hasher(capacity.max(1), Default::default());
        // Always hold the empty string as item 0.
        strings.insert(Box::from(""));
        Self { strings, bytes: 0 }
    }

    /// Returns the number of strings currently held in the string table,
    /// including the empty string.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Total bytes of string data owned by the table.
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.bytes
    }

    /// Adds the string to the string table if it isn't present already, and
    /// returns a [StringId] that corresponds to the order that this string
    /// was originally inserted.
    pub fn intern(&mut self, str: &str) -> StringId {
        match self.strings.get_index_of(str) {
            Some(offset) => StringId::from_offset(offset),
            None => {
                let (offset, _) = self.strings.insert_full(Box::from(str));
                self.bytes += str.len();
                StringId::from_offset(offset)
            }
        }
    }

    /// Returns the id of `str` if it has been interned, without inserting it.
    pub fn lookup(&self, str: &str) -> Option<StringId> {
        self.strings.get_index_of(str).map(StringId::from_offset)
    }

    pub fn get(&self, id: StringId) -> Option<&str> {
        self.strings.get_index(id.to_offset()).map(|s| &**s)
    }

    /// Like [StringTable::get], but resolves unknown ids to the empty string.
    #[inline]
    pub fn fetch(&self, id: StringId) -> &str {
        self.get(id).unwrap_or("")
    }

    /// Drops every string except the empty string. Ids handed out before the
    /// call must not be resolved afterwards; they may now name other strings.
    pub fn clear(&mut self) {
        self.strings.truncate(1);
        self.bytes = 0;
    }

    /// Iterates the strings in id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.strings.iter().map(|s| &**s)
    }
}
