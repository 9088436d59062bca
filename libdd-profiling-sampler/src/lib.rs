// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-process sample buffer for statistical profilers.
//!
//! A [`Profile`] composes one sample at a time: the caller opens a sample
//! with [`Profile::start_sample`], pushes values, frames and labels into it,
//! then hands it to a [`SampleSink`] with [`Profile::flush_sample`]. The
//! buffers are reused across samples, strings are interned in a pool owned by
//! the profile, and the layout of the values is fixed when the profile is
//! built from a set of [`MeasurementKind`]s.
//!
//! ```
//! use libdd_profiling_sampler::{MeasurementKind, ProfileBuilder};
//!
//! let mut profile = ProfileBuilder::new()
//!     .add_type(MeasurementKind::Cpu)
//!     .add_type(MeasurementKind::Wall)
//!     .build()
//!     .unwrap();
//!
//! profile.start_sample(2);
//! profile.push_cputime(1000, 1).unwrap();
//! profile.push_walltime(2000, 1).unwrap();
//! profile.push_frame("main", "app.py", 0x1, 10).unwrap();
//! profile.flush_sample().unwrap();
//! assert_eq!(profile.samples(), 1);
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod api;
pub mod collections;
pub mod config;
pub mod error;
pub mod exporter;
pub mod internal;
pub mod pprof;
pub mod profile;
pub mod serializer;
pub mod sink;

pub use api::{LabelKey, MeasurementKind, MeasurementKinds};
pub use error::{ErrorKind, SampleError};
pub use profile::{Profile, ProfileBuilder, SampleState};
pub use sink::{Aggregator, EncodedProfile, SampleSink};
