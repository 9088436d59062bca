// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod identifiable;
pub mod string_table;

pub use identifiable::{Dedup, FxIndexMap, FxIndexSet, Id, Item, StringId};
pub use string_table::StringTable;
