// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod labels;
mod sample;
mod stack;
mod value_schema;

pub use labels::*;
pub use sample::*;
pub use stack::*;
pub use value_schema::*;

use crate::collections::StringId;
use crate::error::SampleError;
