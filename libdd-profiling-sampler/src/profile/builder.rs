// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::Profile;
use crate::api::{MeasurementKind, MeasurementKinds};
use crate::config::SamplerConfig;
use crate::error::SampleError;
use crate::internal::{SampleBuffer, ValueSchema, DEFAULT_MAX_NFRAMES};
use crate::sink::{Aggregator, SampleSink};
use std::sync::Arc;

/// Validates the measurement kinds and frame limit before producing a
/// [`Profile`].
///
/// Until a type is added or set, every [`MeasurementKind`] is enabled. The
/// first [`ProfileBuilder::add_type`] starts over from an empty set.
#[derive(Clone, Copy, Debug)]
pub struct ProfileBuilder {
    kinds: Option<MeasurementKinds>,
    max_nframes: usize,
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileBuilder {
    pub const fn new() -> Self {
        ProfileBuilder {
            kinds: None,
            max_nframes: DEFAULT_MAX_NFRAMES,
        }
    }

    pub fn from_config(config: &SamplerConfig) -> Self {
        let builder = Self::new().set_max_nframes(config.max_nframes);
        match &config.sample_types {
            Some(kinds) => builder.set_types(kinds.iter().copied().collect::<MeasurementKinds>()),
            None => builder,
        }
    }

    pub fn add_type(mut self, kind: MeasurementKind) -> Self {
        self.kinds = Some(self.kinds.unwrap_or_default().with(kind));
        self
    }

    /// Adds every kind whose bit is set in `bits`. Unknown bits are ignored.
    pub fn add_type_mask(mut self, bits: u32) -> Self {
        let kinds = MeasurementKinds::from_bits_truncate(bits);
        self.kinds = Some(self.kinds.unwrap_or_default() | kinds);
        self
    }

    /// Replaces the kinds added so far.
    pub fn set_types(mut self, kinds: impl Into<MeasurementKinds>) -> Self {
        self.kinds = Some(kinds.into());
        self
    }

    pub fn set_max_nframes(mut self, max_nframes: usize) -> Self {
        self.max_nframes = max_nframes;
        self
    }

    /// The kinds the profile will be built with.
    pub fn kinds(&self) -> MeasurementKinds {
        self.kinds.unwrap_or(MeasurementKinds::ALL)
    }

    pub fn max_nframes(&self) -> usize {
        self.max_nframes
    }

    /// # Errors
    /// Fails with a construction error if no kind is enabled or the frame
    /// limit is zero.
    pub fn build(self) -> Result<Profile, SampleError> {
        self.build_with_sink(Aggregator::new)
    }

    /// Like [ProfileBuilder::build], but samples are flushed to the sink
    /// `make_sink` returns. It receives the schema the profile will use.
    pub fn build_with_sink<S, F>(self, make_sink: F) -> Result<Profile<S>, SampleError>
    where
        S: SampleSink,
        F: FnOnce(Arc<ValueSchema>) -> S,
    {
        let schema = Arc::new(ValueSchema::new(self.kinds())?);
        let sample = SampleBuffer::new(&schema, self.max_nframes)?;
        let sink = make_sink(schema.clone());
        tracing::debug!(
            kinds = ?schema.kinds(),
            num_values = schema.len(),
            max_nframes = self.max_nframes,
            "built profile"
        );
        Ok(Profile::from_parts(schema, sample, sink))
    }
}
