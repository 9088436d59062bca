// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod builder;
#[cfg(test)]
mod tests;

pub use builder::ProfileBuilder;

use crate::api::{self, LabelKey, MeasurementKind};
use crate::collections::identifiable::StringId;
use crate::collections::string_table::StringTable;
use crate::error::SampleError;
use crate::internal::{Frame, Label, SampleBuffer, ValueSchema, MAX_LABELS};
use crate::sink::{Aggregator, SampleSink};
use std::sync::Arc;

/// Whether a sample is currently being composed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SampleState {
    /// No sample is open; the next call should be
    /// [`Profile::start_sample`].
    #[default]
    Ready,
    /// Between [`Profile::start_sample`] and [`Profile::flush_sample`].
    Open,
}

/// Composes one sample at a time and hands finished samples to a
/// [`SampleSink`].
///
/// A profile is single-writer: it has no internal locking, and callers that
/// sample from several threads should keep one profile per thread. After the
/// buffers are sized by [`Profile::start_sample`], pushes and flushes don't
/// allocate on the profile side except to intern new strings.
pub struct Profile<S: SampleSink = Aggregator> {
    schema: Arc<ValueSchema>,
    strings: StringTable,
    sample: SampleBuffer,
    state: SampleState,
    samples: u64,
    sink: S,
}

impl<S: SampleSink> std::fmt::Debug for Profile<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("state", &self.state)
            .field("samples", &self.samples)
            .field("kinds", &self.schema.kinds())
            .field("max_nframes", &self.max_nframes())
            .field("num_frames", &self.num_frames())
            .field("num_labels", &self.num_labels())
            .field("num_strings", &self.strings.len())
            .finish_non_exhaustive()
    }
}

/// Sample lifecycle
impl<S: SampleSink> Profile<S> {
    /// Opens a new sample, clearing frames and labels and zeroing values.
    /// `expected_nframes` only sizes the frame buffer; it's never a cap.
    ///
    /// An open, unflushed sample is discarded.
    pub fn start_sample(&mut self, expected_nframes: usize) {
        if self.state == SampleState::Open {
            tracing::trace!(
                num_frames = self.sample.stack().len(),
                num_labels = self.sample.labels().len(),
                "discarding unflushed sample"
            );
        }
        self.sample.begin(expected_nframes);
        self.state = SampleState::Open;
    }

    /// Hands the open sample to the sink and returns to
    /// [`SampleState::Ready`]. The buffers are cleared whether or not the
    /// sink accepted the sample; the sample counter only grows on success.
    pub fn flush_sample(&mut self) -> Result<(), SampleError> {
        self.ensure_open()?;
        let sample = api::Sample::new(
            self.sample.stack().frames(),
            self.sample.labels().labels(),
            self.sample.values(),
            &self.strings,
        );
        let result = self.sink.add_sample(sample);
        self.sample.clear();
        self.state = SampleState::Ready;

        match result {
            Ok(()) => {
                self.samples += 1;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("sink rejected sample: {err:#}");
                Err(SampleError::Encode(err))
            }
        }
    }

    /// Abandons the open sample, if any, without flushing it.
    pub fn clear_buffers(&mut self) {
        self.sample.clear();
        self.state = SampleState::Ready;
    }

    /// Resets the sample counter. Buffers are left alone.
    pub fn zero_stats(&mut self) {
        self.samples = 0;
    }

    /// Returns the profile to the state it was built in: no open sample, a
    /// zero counter, an empty string pool, and a reset sink. The schema and
    /// frame limit are kept. Every [StringId] handed out before is invalid.
    pub fn reset(&mut self) {
        self.clear_buffers();
        self.zero_stats();
        self.sample.stack_mut().reset_dropped();
        self.strings.clear();
        self.sink.reset();
        tracing::debug!("reset profile");
    }
}

/// Values
impl<S: SampleSink> Profile<S> {
    pub fn push_cputime(&mut self, cpu_time_ns: i64, count: i64) -> Result<(), SampleError> {
        self.write_values(MeasurementKind::Cpu, &[cpu_time_ns, count])
    }

    pub fn push_walltime(&mut self, wall_time_ns: i64, count: i64) -> Result<(), SampleError> {
        self.write_values(MeasurementKind::Wall, &[wall_time_ns, count])
    }

    pub fn push_acquire(&mut self, acquire_time_ns: i64, count: i64) -> Result<(), SampleError> {
        self.write_values(MeasurementKind::LockAcquire, &[acquire_time_ns, count])
    }

    pub fn push_release(&mut self, release_time_ns: i64, count: i64) -> Result<(), SampleError> {
        self.write_values(MeasurementKind::LockRelease, &[release_time_ns, count])
    }

    pub fn push_alloc(&mut self, size: i64, count: i64) -> Result<(), SampleError> {
        self.write_values(MeasurementKind::Allocation, &[size, count])
    }

    pub fn push_heap(&mut self, size: i64) -> Result<(), SampleError> {
        self.write_values(MeasurementKind::Heap, &[size])
    }

    /// Sets the exception count and labels the sample with the exception
    /// type. Either both are recorded or neither is.
    pub fn push_exceptioninfo(
        &mut self,
        exception_type: &str,
        count: i64,
    ) -> Result<(), SampleError> {
        self.ensure_open()?;
        self.ensure_enabled(MeasurementKind::Exception)?;
        self.ensure_label_room(1)?;
        let value = self.strings.intern(exception_type);
        self.sample
            .labels_mut()
            .push(Label::str(LabelKey::ExceptionType, value))?;
        self.write_values(MeasurementKind::Exception, &[count])
    }
}

/// Stack
impl<S: SampleSink> Profile<S> {
    /// Appends a frame. Frames must be pushed leaf first.
    ///
    /// Once `max_nframes` frames are held, the frame is dropped and
    /// [SampleError::StackTruncated] is returned; the frames already pushed
    /// are kept.
    pub fn push_frame(
        &mut self,
        name: &str,
        filename: &str,
        address: u64,
        line: i64,
    ) -> Result<(), SampleError> {
        self.ensure_open()?;
        // Checked before interning so dropped frames don't grow the pool.
        if self.sample.stack().is_full() {
            let err = self.sample.stack_mut().reject();
            tracing::trace!(
                dropped = self.sample.stack().dropped(),
                "stack full, dropping frame"
            );
            return Err(err);
        }
        let frame = Frame {
            name: self.strings.intern(name),
            filename: self.strings.intern(filename),
            address,
            line,
        };
        self.sample.stack_mut().push(frame)
    }
}

/// Labels
impl<S: SampleSink> Profile<S> {
    pub fn push_label_str(&mut self, key: LabelKey, value: &str) -> Result<(), SampleError> {
        self.ensure_open()?;
        self.ensure_label_room(1)?;
        let value = self.strings.intern(value);
        self.sample.labels_mut().push(Label::str(key, value))
    }

    pub fn push_label_num(&mut self, key: LabelKey, value: i64) -> Result<(), SampleError> {
        self.ensure_open()?;
        self.sample.labels_mut().push(Label::num(key, value))
    }

    /// Pushes the thread id, native id and name labels, or none of them.
    pub fn push_threadinfo(
        &mut self,
        thread_id: i64,
        thread_native_id: i64,
        thread_name: &str,
    ) -> Result<(), SampleError> {
        self.ensure_open()?;
        self.ensure_label_room(3)?;
        let name = self.strings.intern(thread_name);
        self.sample.labels_mut().push_all(&[
            Label::num(LabelKey::ThreadId, thread_id),
            Label::num(LabelKey::ThreadNativeId, thread_native_id),
            Label::str(LabelKey::ThreadName, name),
        ])
    }

    /// Pushes the task id and name labels, or neither.
    pub fn push_taskinfo(&mut self, task_id: i64, task_name: &str) -> Result<(), SampleError> {
        self.ensure_open()?;
        self.ensure_label_room(2)?;
        let name = self.strings.intern(task_name);
        self.sample.labels_mut().push_all(&[
            Label::num(LabelKey::TaskId, task_id),
            Label::str(LabelKey::TaskName, name),
        ])
    }

    /// Span ids are unsigned; pprof labels only carry signed numbers, so the
    /// bits are reinterpreted.
    pub fn push_span_id(&mut self, span_id: u64) -> Result<(), SampleError> {
        self.push_label_num(LabelKey::SpanId, span_id as i64)
    }

    pub fn push_local_root_span_id(&mut self, local_root_span_id: u64) -> Result<(), SampleError> {
        self.push_label_num(LabelKey::LocalRootSpanId, local_root_span_id as i64)
    }

    pub fn push_trace_type(&mut self, trace_type: &str) -> Result<(), SampleError> {
        self.push_label_str(LabelKey::TraceType, trace_type)
    }

    pub fn push_trace_resource_container(&mut self, container: &str) -> Result<(), SampleError> {
        self.push_label_str(LabelKey::TraceResourceContainer, container)
    }

    pub fn push_trace_endpoint(&mut self, endpoint: &str) -> Result<(), SampleError> {
        self.push_label_str(LabelKey::TraceEndpoint, endpoint)
    }

    pub fn push_class_name(&mut self, class_name: &str) -> Result<(), SampleError> {
        self.push_label_str(LabelKey::ClassName, class_name)
    }

    pub fn push_lock_name(&mut self, lock_name: &str) -> Result<(), SampleError> {
        self.push_label_str(LabelKey::LockName, lock_name)
    }
}

/// String pool
impl<S: SampleSink> Profile<S> {
    /// Interns `str`, returning a handle that stays valid until
    /// [Profile::reset]. The empty string is always [StringId::ZERO].
    #[inline]
    pub fn intern(&mut self, str: &str) -> StringId {
        self.strings.intern(str)
    }

    #[inline]
    pub fn resolve(&self, id: StringId) -> Option<&str> {
        self.strings.get(id)
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }
}

/// Accessors
impl<S: SampleSink> Profile<S> {
    /// Number of samples the sink accepted since the last
    /// [Profile::zero_stats] or [Profile::reset].
    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[inline]
    pub fn state(&self) -> SampleState {
        self.state
    }

    #[inline]
    pub fn schema(&self) -> &Arc<ValueSchema> {
        &self.schema
    }

    #[inline]
    pub fn max_nframes(&self) -> usize {
        self.sample.stack().max_frames()
    }

    /// The values of the sample being built, in schema order.
    #[inline]
    pub fn values(&self) -> &[i64] {
        self.sample.values()
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.sample.stack().len()
    }

    #[inline]
    pub fn num_labels(&self) -> usize {
        self.sample.labels().len()
    }

    /// Frames rejected from the current sample because the stack was full.
    #[inline]
    pub fn dropped_frames(&self) -> u64 {
        self.sample.stack().dropped()
    }

    /// The sample being built, as the sink would receive it.
    pub fn current_sample(&self) -> api::Sample<'_> {
        api::Sample::new(
            self.sample.stack().frames(),
            self.sample.labels().labels(),
            self.sample.values(),
            &self.strings,
        )
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Private helper functions
impl<S: SampleSink> Profile<S> {
    pub(crate) fn from_parts(schema: Arc<ValueSchema>, sample: SampleBuffer, sink: S) -> Self {
        Self {
            schema,
            strings: StringTable::new(),
            sample,
            state: SampleState::Ready,
            samples: 0,
            sink,
        }
    }

    #[inline]
    fn ensure_open(&self) -> Result<(), SampleError> {
        match self.state {
            SampleState::Open => Ok(()),
            SampleState::Ready => Err(SampleError::NoOpenSample),
        }
    }

    #[inline]
    fn ensure_enabled(&self, kind: MeasurementKind) -> Result<(), SampleError> {
        if self.schema.contains(kind) {
            Ok(())
        } else {
            Err(SampleError::KindNotEnabled { kind })
        }
    }

    #[inline]
    fn ensure_label_room(&self, needed: usize) -> Result<(), SampleError> {
        if self.sample.labels().remaining() < needed {
            return Err(SampleError::LabelsFull { limit: MAX_LABELS });
        }
        Ok(())
    }

    fn write_values(&mut self, kind: MeasurementKind, values: &[i64]) -> Result<(), SampleError> {
        self.ensure_open()?;
        self.schema.write(self.sample.values_mut(), kind, values)
    }
}
