// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod items;

use self::items::*;
use super::{EncodedProfile, SampleSink};
use crate::api::{self, LabelKey};
use crate::collections::identifiable::*;
use crate::collections::string_table::StringTable;
use crate::internal::ValueSchema;
use crate::pprof;
use crate::pprof::sliced_proto::*;
use crate::serializer::CompressedProtobufSerializer;
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// The default [`SampleSink`]: folds samples with the same stack and labels
/// into one by summing their values, and serializes the result as pprof.
pub struct Aggregator {
    schema: Arc<ValueSchema>,
    functions: FxIndexSet<Function>,
    labels: FxIndexSet<Label>,
    label_sets: FxIndexSet<LabelSet>,
    locations: FxIndexSet<Location>,
    observations: FxIndexMap<Observation, Box<[i64]>>,
    sample_types: Box<[(StringId, StringId)]>,
    stack_traces: FxIndexSet<StackTrace>,
    start_time: SystemTime,
    strings: StringTable,
    label_keys: [StringId; LabelKey::COUNT],
}

impl SampleSink for Aggregator {
    fn add_sample(&mut self, sample: api::Sample<'_>) -> anyhow::Result<()> {
        anyhow::ensure!(
            sample.values().len() == self.sample_types.len(),
            "expected {} sample types, but sample had {} sample types",
            self.sample_types.len(),
            sample.values().len(),
        );

        Self::validate_sample_labels(&sample)?;
        let labels: Vec<_> = sample
            .labels()
            .map(|label| {
                let key = self.label_keys[label.key as usize];
                let value = match label.value {
                    api::LabelValue::Str(s) => LabelValue::Str(self.strings.intern(s)),
                    api::LabelValue::Num(num) => LabelValue::Num(num),
                };
                self.labels.dedup(Label { key, value })
            })
            .collect();
        let labels = self.label_sets.dedup(LabelSet::new(labels));

        let locations = sample
            .locations()
            .map(|location| self.add_location(&location))
            .collect();
        let stack_trace = self.stack_traces.dedup(StackTrace { locations });

        self.add_observation(
            Observation {
                labels,
                stack_trace,
            },
            sample.values(),
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.reset_and_return_previous(None);
    }
}

/// Public API
impl Aggregator {
    /// Creates an empty aggregator that reports the sample types of `schema`.
    pub fn new(schema: Arc<ValueSchema>) -> Self {
        Self::with_start_time(schema, SystemTime::now())
    }

    pub fn with_start_time(schema: Arc<ValueSchema>, start_time: SystemTime) -> Self {
        let mut strings = StringTable::new();
        let sample_types = schema
            .value_types()
            .map(|value_type| {
                (
                    strings.intern(value_type.r#type),
                    strings.intern(value_type.unit),
                )
            })
            .collect();
        let label_keys = LabelKey::ALL.map(|key| strings.intern(key.as_str()));

        Self {
            schema,
            functions: Default::default(),
            labels: Default::default(),
            label_sets: Default::default(),
            locations: Default::default(),
            observations: Default::default(),
            sample_types,
            stack_traces: Default::default(),
            start_time,
            strings,
            label_keys,
        }
    }

    /// Resets all data except the sample types.
    /// Returns the previous aggregator.
    pub fn reset_and_return_previous(&mut self, start_time: Option<SystemTime>) -> Aggregator {
        let mut previous = Self::with_start_time(
            self.schema.clone(),
            start_time.unwrap_or_else(SystemTime::now),
        );
        std::mem::swap(self, &mut previous);
        previous
    }

    #[inline]
    pub fn schema(&self) -> &ValueSchema {
        &self.schema
    }

    #[inline]
    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// Number of distinct (stack, labels) pairs observed.
    #[inline]
    pub fn num_aggregated_samples(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Serialize the aggregated profile, adding the end time and duration.
    /// # Arguments
    /// * `end_time` - Optional end time of the profile. Passing None will use the current time.
    /// * `duration` - Optional duration of the profile. Passing None will try to calculate the
    ///   duration based on the end time minus the start time. If the clock went backwards the
    ///   duration is zero.
    pub fn serialize_into_compressed_pprof(
        mut self,
        end_time: Option<SystemTime>,
        duration: Option<Duration>,
    ) -> anyhow::Result<EncodedProfile> {
        let end = end_time.unwrap_or_else(SystemTime::now);
        let start = self.start_time;
        let duration_nanos = duration
            .unwrap_or_else(|| end.duration_since(start).unwrap_or(Duration::ZERO))
            .as_nanos()
            .min(i64::MAX as u128) as i64;

        const INITIAL_PPROF_BUFFER_SIZE: usize = 32 * 1024;
        let mut encoder = CompressedProtobufSerializer::with_capacity(INITIAL_PPROF_BUFFER_SIZE);

        let num_samples = self.observations.len();
        for (observation, values) in std::mem::take(&mut self.observations) {
            let labels = self
                .get_label_set(observation.labels)?
                .iter()
                .map(|id| self.get_label(*id).map(pprof::Label::from))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let location_ids = self
                .get_stack_trace(observation.stack_trace)?
                .locations
                .iter()
                .map(Id::to_raw_id)
                .collect();

            let item = pprof::Sample {
                location_ids,
                values: values.into_vec(),
                labels,
            };
            encoder.encode(ProfileSamplesEntry::from(item))?;
        }

        for (r#type, unit) in self.sample_types.iter() {
            let item = pprof::ValueType {
                r#type: r#type.to_raw_id(),
                unit: unit.to_raw_id(),
            };
            encoder.encode(ProfileSampleTypesEntry::from(item))?;
        }

        for item in into_pprof_iter(self.locations) {
            encoder.encode(ProfileLocationsEntry::from(item))?;
        }

        for item in into_pprof_iter(self.functions) {
            encoder.encode(ProfileFunctionsEntry::from(item))?;
        }

        for item in self.strings.iter() {
            encoder.encode(ProfileStringTableEntry::from(item))?;
        }

        encoder.encode(ProfileSimpler {
            time_nanos: start
                .duration_since(SystemTime::UNIX_EPOCH)
                .map_or(0, |duration| {
                    duration.as_nanos().min(i64::MAX as u128) as i64
                }),
            duration_nanos,
        })?;

        let buffer = encoder.finish()?;
        tracing::debug!(
            num_samples,
            compressed_bytes = buffer.len(),
            "serialized aggregated profile"
        );
        Ok(EncodedProfile { start, end, buffer })
    }
}

/// Private helper functions
impl Aggregator {
    fn add_function(&mut self, name: &str, filename: &str) -> FunctionId {
        let name = self.strings.intern(name);
        let filename = self.strings.intern(filename);
        self.functions.dedup(Function { name, filename })
    }

    fn add_location(&mut self, location: &api::Location) -> LocationId {
        let function_id = self.add_function(location.name, location.filename);
        self.locations.dedup(Location {
            function_id,
            address: location.address,
            line: location.line,
        })
    }

    fn add_observation(&mut self, observation: Observation, values: &[i64]) {
        match self.observations.get_mut(&observation) {
            Some(sums) => sums
                .iter_mut()
                .zip(values)
                .for_each(|(sum, value)| *sum = sum.saturating_add(*value)),
            None => {
                self.observations.insert(observation, values.into());
            }
        }
    }

    fn get_label(&self, id: LabelId) -> anyhow::Result<&Label> {
        self.labels
            .get_index(id.to_offset())
            .context("LabelId to have a valid interned index")
    }

    fn get_label_set(&self, id: LabelSetId) -> anyhow::Result<&LabelSet> {
        self.label_sets
            .get_index(id.to_offset())
            .context("LabelSetId to have a valid interned index")
    }

    fn get_stack_trace(&self, id: StackTraceId) -> anyhow::Result<&StackTrace> {
        self.stack_traces
            .get_index(id.to_offset())
            .with_context(|| format!("StackTraceId {id:?} to exist in profile"))
    }

    fn validate_sample_labels(sample: &api::Sample<'_>) -> anyhow::Result<()> {
        let mut seen: HashMap<LabelKey, api::Label> = HashMap::with_capacity(sample.num_labels());
        for label in sample.labels() {
            if let Some(duplicate) = seen.insert(label.key, label) {
                anyhow::bail!("Duplicate label on sample: {:?} {:?}", duplicate, label);
            }
        }
        Ok(())
    }
}
