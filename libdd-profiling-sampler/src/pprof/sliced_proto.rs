// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Single-entry slices of [`super::Profile`].
//!
//! A top-level protobuf message has no length header, so emitting one of
//! these per item produces the same bytes as one `Profile` holding every item
//! in its repeated field. The aggregator streams entries straight into the
//! compressor this way instead of materializing a whole `Profile` first.
//!
//! The fields are `required` so that default-valued entries are still
//! written. The string table relies on it: "" must be emitted as entry 0.

use super::*;

#[derive(Eq, Hash, PartialEq, ::prost::Message)]
pub struct ProfileSampleTypesEntry {
    #[prost(message, required, tag = "1")]
    pub sample_types_entry: ValueType,
}

#[derive(Eq, Hash, PartialEq, ::prost::Message)]
pub struct ProfileSamplesEntry {
    #[prost(message, required, tag = "2")]
    pub samples_entry: Sample,
}

#[derive(Eq, Hash, PartialEq, ::prost::Message)]
pub struct ProfileLocationsEntry {
    #[prost(message, required, tag = "4")]
    pub locations_entry: Location,
}

#[derive(Eq, Hash, PartialEq, ::prost::Message)]
pub struct ProfileFunctionsEntry {
    #[prost(message, required, tag = "5")]
    pub functions_entry: Function,
}

#[derive(Eq, Hash, PartialEq, ::prost::Message)]
pub struct ProfileStringTableEntry {
    #[prost(string, required, tag = "6")]
    pub string_table_entry: String,
}

// Not repeated, so one combined message is enough.
#[derive(Eq, Hash, PartialEq, ::prost::Message)]
pub struct ProfileSimpler {
    #[prost(int64, tag = "9")]
    pub time_nanos: i64,
    #[prost(int64, tag = "10")]
    pub duration_nanos: i64,
}

impl From<ValueType> for ProfileSampleTypesEntry {
    fn from(item: ValueType) -> Self {
        Self {
            sample_types_entry: item,
        }
    }
}

impl From<Sample> for ProfileSamplesEntry {
    fn from(item: Sample) -> Self {
        Self {
            samples_entry: item,
        }
    }
}

impl From<Location> for ProfileLocationsEntry {
    fn from(item: Location) -> Self {
        Self {
            locations_entry: item,
        }
    }
}

impl From<Function> for ProfileFunctionsEntry {
    fn from(item: Function) -> Self {
        Self {
            functions_entry: item,
        }
    }
}

impl From<&str> for ProfileStringTableEntry {
    fn from(item: &str) -> Self {
        Self {
            string_table_entry: item.to_owned(),
        }
    }
}
