// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Where flushed samples go.

mod aggregator;

pub use aggregator::*;

use crate::api;
use std::time::SystemTime;

/// Receives every sample a [`crate::Profile`] flushes.
///
/// The sample borrows the profile's buffers and string pool; a sink that
/// needs the data past the call must copy or intern it.
pub trait SampleSink {
    fn add_sample(&mut self, sample: api::Sample<'_>) -> anyhow::Result<()>;

    /// Drops everything accumulated so far. Called by [`crate::Profile::reset`].
    fn reset(&mut self);
}

impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    fn add_sample(&mut self, sample: api::Sample<'_>) -> anyhow::Result<()> {
        (**self).add_sample(sample)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// A serialized profile: lz4-framed pprof bytes plus the interval they cover.
#[derive(Debug)]
pub struct EncodedProfile {
    pub start: SystemTime,
    pub end: SystemTime,
    pub buffer: Vec<u8>,
}
