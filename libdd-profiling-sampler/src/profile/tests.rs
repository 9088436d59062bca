// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::api::MeasurementKinds;
use crate::error::ErrorKind;
use crate::internal::{slots_of, ValueSlot};
use proptest::prelude::*;

/// Keeps an owned copy of every sample it receives.
#[derive(Default)]
struct Recorder {
    samples: Vec<Recorded>,
    resets: usize,
}

#[derive(Debug, Eq, PartialEq)]
struct Recorded {
    frames: Vec<(String, String, u64, i64)>,
    labels: Vec<(LabelKey, String)>,
    values: Vec<i64>,
}

impl SampleSink for Recorder {
    fn add_sample(&mut self, sample: api::Sample<'_>) -> anyhow::Result<()> {
        let frames = sample
            .locations()
            .map(|l| (l.name.to_owned(), l.filename.to_owned(), l.address, l.line))
            .collect();
        let labels = sample
            .labels()
            .map(|l| {
                let value = match l.value {
                    api::LabelValue::Str(s) => s.to_owned(),
                    api::LabelValue::Num(n) => n.to_string(),
                };
                (l.key, value)
            })
            .collect();
        self.samples.push(Recorded {
            frames,
            labels,
            values: sample.values().to_vec(),
        });
        Ok(())
    }

    fn reset(&mut self) {
        self.samples.clear();
        self.resets += 1;
    }
}

fn recording(builder: ProfileBuilder) -> Profile<Recorder> {
    builder.build_with_sink(|_| Recorder::default()).unwrap()
}

fn cpu_wall() -> ProfileBuilder {
    ProfileBuilder::new()
        .add_type(MeasurementKind::Cpu)
        .add_type(MeasurementKind::Wall)
}

#[test]
fn cpu_wall_scenario() {
    let mut profile = cpu_wall().build().unwrap();
    let schema = profile.schema().clone();
    assert_eq!(
        schema.slots(),
        &[
            ValueSlot::CpuTime,
            ValueSlot::CpuCount,
            ValueSlot::WallTime,
            ValueSlot::WallCount
        ]
    );

    profile.start_sample(1);
    profile.push_cputime(1000, 1).unwrap();
    profile.push_walltime(2000, 1).unwrap();
    profile.push_frame("main", "app.py", 0x1, 10).unwrap();
    assert_eq!(profile.values(), &[1000, 1, 2000, 1]);
    profile.flush_sample().unwrap();

    assert_eq!(profile.samples(), 1);
    assert_eq!(profile.state(), SampleState::Ready);
    assert_eq!(profile.sink().num_aggregated_samples(), 1);
}

#[test]
fn recorded_values_match_schema() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.push_cputime(1000, 1).unwrap();
    profile.push_walltime(2000, 1).unwrap();
    profile.push_frame("main", "app.py", 0x1, 10).unwrap();
    profile.flush_sample().unwrap();

    let recorded = &profile.sink().samples[0];
    assert_eq!(recorded.values, [1000, 1, 2000, 1]);
    assert_eq!(
        recorded.frames,
        [("main".to_owned(), "app.py".to_owned(), 0x1, 10)]
    );
}

#[test]
fn empty_sample_flushes() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.flush_sample().unwrap();
    assert_eq!(profile.samples(), 1);

    let recorded = &profile.sink().samples[0];
    assert!(recorded.frames.is_empty());
    assert!(recorded.labels.is_empty());
    assert_eq!(recorded.values, [0, 0, 0, 0]);
}

#[test]
fn values_are_overwritten_not_summed() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.push_walltime(10, 1).unwrap();
    profile.push_walltime(20, 2).unwrap();
    assert_eq!(profile.values(), &[0, 0, 20, 2]);
}

#[test]
fn start_sample_discards_unflushed() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.push_cputime(5, 1).unwrap();
    profile.push_frame("a", "a.py", 0, 1).unwrap();
    profile.push_label_num(LabelKey::ThreadId, 1).unwrap();

    profile.start_sample(0);
    assert_eq!(profile.state(), SampleState::Open);
    assert_eq!(profile.values(), &[0, 0, 0, 0]);
    assert_eq!(profile.num_frames(), 0);
    assert_eq!(profile.num_labels(), 0);
    profile.flush_sample().unwrap();

    assert_eq!(profile.sink().samples.len(), 1);
    assert_eq!(profile.sink().samples[0].values, [0, 0, 0, 0]);
}

#[test]
fn huge_frame_hint_is_harmless() {
    let mut profile = recording(cpu_wall().set_max_nframes(usize::MAX));
    profile.start_sample(usize::MAX);
    profile.push_cputime(1, 1).unwrap();
    for line in 0..3 {
        profile.push_frame("f", "f.py", 0, line).unwrap();
    }
    profile.flush_sample().unwrap();
    assert_eq!(profile.sink().samples[0].frames.len(), 3);
    assert_eq!(profile.samples(), 1);
}

#[test]
fn max_nframes_frames_are_kept_in_order() {
    let mut profile = recording(cpu_wall().set_max_nframes(4));
    profile.start_sample(4);
    for line in 0..4 {
        profile.push_frame("f", "f.py", 0, line).unwrap();
    }
    assert_eq!(profile.dropped_frames(), 0);
    profile.flush_sample().unwrap();

    let lines: Vec<_> = profile.sink().samples[0]
        .frames
        .iter()
        .map(|f| f.3)
        .collect();
    assert_eq!(lines, [0, 1, 2, 3]);
}

#[test]
fn overflowing_frames_keep_the_leaf() {
    let mut profile = recording(cpu_wall().set_max_nframes(4));
    // The hint is larger than the limit and must not raise it.
    profile.start_sample(100);
    for line in 0..4 {
        profile.push_frame("leaf-ward", "f.py", 0, line).unwrap();
    }
    let before = profile.strings().len();
    let err = profile.push_frame("root", "root.py", 0, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert!(matches!(err, SampleError::StackTruncated { limit: 4 }));
    // Dropped frames aren't interned.
    assert_eq!(profile.strings().len(), before);
    assert_eq!(profile.num_frames(), 4);
    assert_eq!(profile.dropped_frames(), 1);
    profile.flush_sample().unwrap();

    let frames = &profile.sink().samples[0].frames;
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.0 == "leaf-ward"));
    assert_eq!(frames[0].3, 0);

    // The dropped count is per sample.
    profile.start_sample(0);
    assert_eq!(profile.dropped_frames(), 0);
}

#[test]
fn ninth_label_fails() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    for n in 0..8 {
        profile.push_label_num(LabelKey::TaskId, n).unwrap();
    }
    let snapshot = |profile: &Profile<Recorder>| -> Vec<String> {
        let sample = profile.current_sample();
        sample.labels().map(|label| format!("{label:?}")).collect()
    };
    let before = snapshot(&profile);

    let err = profile.push_label_str(LabelKey::LockName, "mutex").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    let err = profile.push_label_num(LabelKey::SpanId, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

    assert_eq!(before, snapshot(&profile));
    assert_eq!(profile.num_labels(), 8);
    // The rejected string label didn't touch the pool.
    assert_eq!(profile.strings().lookup("mutex"), None);
}

#[test]
fn disabled_kind_fails_without_writing() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.push_cputime(1, 2).unwrap();
    profile.push_walltime(3, 4).unwrap();

    let cases: [fn(&mut Profile<Recorder>) -> Result<(), SampleError>; 5] = [
        |p| p.push_acquire(9, 9),
        |p| p.push_release(9, 9),
        |p| p.push_alloc(9, 9),
        |p| p.push_heap(9),
        |p| p.push_exceptioninfo("ValueError", 9),
    ];
    for push in cases {
        let err = push(&mut profile).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
        assert!(matches!(err, SampleError::KindNotEnabled { .. }));
        assert_eq!(profile.values(), &[1, 2, 3, 4]);
    }
    // The exception label wasn't pushed either.
    assert_eq!(profile.num_labels(), 0);
}

#[test]
fn pushes_outside_a_sample_fail() {
    let mut profile = recording(cpu_wall());
    let checks = [
        profile.push_cputime(1, 1),
        profile.push_heap(1),
        profile.push_frame("main", "app.py", 0, 1),
        profile.push_label_num(LabelKey::ThreadId, 1),
        profile.push_threadinfo(1, 2, "main"),
        profile.flush_sample(),
    ];
    for result in checks {
        let err = result.unwrap_err();
        assert!(matches!(err, SampleError::NoOpenSample));
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }
    assert_eq!(profile.samples(), 0);
    assert!(profile.sink().samples.is_empty());
    // Nothing was interned for the rejected calls.
    assert_eq!(profile.strings().len(), 1);
}

#[test]
fn clear_buffers_abandons_the_sample() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.push_cputime(1, 1).unwrap();
    profile.push_frame("main", "app.py", 0, 1).unwrap();
    profile.clear_buffers();

    assert_eq!(profile.state(), SampleState::Ready);
    assert_eq!(profile.values(), &[0, 0, 0, 0]);
    assert_eq!(profile.num_frames(), 0);
    assert!(matches!(
        profile.flush_sample(),
        Err(SampleError::NoOpenSample)
    ));
    assert!(profile.sink().samples.is_empty());
}

#[test]
fn zero_stats_only_resets_the_counter() {
    let mut profile = recording(cpu_wall());
    profile.start_sample(0);
    profile.flush_sample().unwrap();
    profile.start_sample(0);
    profile.push_walltime(7, 1).unwrap();

    profile.zero_stats();
    assert_eq!(profile.samples(), 0);
    assert_eq!(profile.state(), SampleState::Open);
    assert_eq!(profile.values(), &[0, 0, 7, 1]);
}

#[test]
fn reset_matches_a_fresh_profile() {
    let builder = cpu_wall().set_max_nframes(2);
    let mut profile = recording(builder);
    profile.start_sample(0);
    profile.push_cputime(1, 1).unwrap();
    profile.push_frame("a", "a.py", 1, 1).unwrap();
    profile.push_frame("b", "b.py", 2, 2).unwrap();
    profile.push_frame("c", "c.py", 3, 3).unwrap_err();
    profile.push_threadinfo(1, 100, "MainThread").unwrap();
    profile.flush_sample().unwrap();
    profile.start_sample(0);
    profile.push_walltime(5, 1).unwrap();

    profile.reset();
    let fresh = recording(builder);

    assert_eq!(profile.schema(), fresh.schema());
    assert_eq!(profile.state(), fresh.state());
    assert_eq!(profile.samples(), fresh.samples());
    assert_eq!(profile.values(), fresh.values());
    assert_eq!(profile.num_frames(), fresh.num_frames());
    assert_eq!(profile.num_labels(), fresh.num_labels());
    assert_eq!(profile.dropped_frames(), fresh.dropped_frames());
    assert_eq!(profile.max_nframes(), fresh.max_nframes());
    assert_eq!(profile.strings().len(), fresh.strings().len());
    assert!(profile.strings().iter().eq(fresh.strings().iter()));
    assert!(profile.sink().samples.is_empty());
    assert_eq!(profile.sink().resets, 1);
}

#[test]
fn interning_is_stable() {
    let mut profile = recording(cpu_wall());
    let a = profile.intern("app.py");
    let len = profile.strings().len();
    let bytes = profile.strings().total_bytes();
    let b = profile.intern("app.py");
    assert_eq!(a, b);
    assert_eq!(profile.strings().len(), len);
    assert_eq!(profile.strings().total_bytes(), bytes);
    assert_eq!(profile.resolve(a), Some("app.py"));
    assert_eq!(profile.intern(""), StringId::ZERO);

    // Frames pushed with the same names share the pool entries.
    profile.start_sample(0);
    profile.push_frame("main", "app.py", 0, 1).unwrap();
    profile.push_frame("main", "app.py", 0, 2).unwrap();
    assert_eq!(profile.strings().len(), len + 1);
}

#[test]
fn sink_failure_is_reported_and_buffers_cleared() {
    struct Failing;
    impl SampleSink for Failing {
        fn add_sample(&mut self, _: api::Sample<'_>) -> anyhow::Result<()> {
            anyhow::bail!("encoder is closed")
        }
        fn reset(&mut self) {}
    }

    let mut profile = cpu_wall().build_with_sink(|_| Failing).unwrap();
    profile.start_sample(0);
    profile.push_cputime(1, 1).unwrap();
    profile.push_frame("main", "app.py", 0, 1).unwrap();
    let err = profile.flush_sample().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EncodeFailure);
    assert!(err.to_string().contains("encoder is closed"));
    assert_eq!(profile.samples(), 0);
    assert_eq!(profile.state(), SampleState::Ready);
    assert_eq!(profile.values(), &[0, 0, 0, 0]);
    assert_eq!(profile.num_frames(), 0);
}

#[test]
fn metadata_labels() {
    let mut profile = recording(ProfileBuilder::new());
    profile.start_sample(0);
    profile.push_threadinfo(7, 4242, "MainThread").unwrap();
    profile.push_taskinfo(3, "worker").unwrap();
    profile.push_span_id(u64::MAX).unwrap();
    profile.push_local_root_span_id(11).unwrap();
    profile.push_trace_type("web").unwrap();
    // Eight labels: full.
    let err = profile.push_trace_endpoint("/users").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    profile.flush_sample().unwrap();

    let labels = &profile.sink().samples[0].labels;
    let expected = [
        (LabelKey::ThreadId, "7"),
        (LabelKey::ThreadNativeId, "4242"),
        (LabelKey::ThreadName, "MainThread"),
        (LabelKey::TaskId, "3"),
        (LabelKey::TaskName, "worker"),
        (LabelKey::SpanId, "-1"),
        (LabelKey::LocalRootSpanId, "11"),
        (LabelKey::TraceType, "web"),
    ];
    let labels: Vec<_> = labels.iter().map(|(k, v)| (*k, v.as_str())).collect();
    assert_eq!(labels, expected);
}

#[test]
fn grouped_labels_are_atomic() {
    let mut profile = recording(ProfileBuilder::new());
    profile.start_sample(0);
    for _ in 0..6 {
        profile.push_class_name("Foo").unwrap();
    }
    let err = profile.push_threadinfo(1, 2, "t").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(profile.num_labels(), 6);

    profile.push_taskinfo(1, "task").unwrap();
    assert_eq!(profile.num_labels(), 8);
}

#[test]
fn exception_info() {
    let mut profile = recording(ProfileBuilder::new().set_types(MeasurementKind::Exception));
    profile.start_sample(0);
    profile.push_exceptioninfo("ValueError", 3).unwrap();
    profile.push_lock_name("db_lock").unwrap();
    profile.push_trace_resource_container("GET /").unwrap();
    profile.flush_sample().unwrap();

    let recorded = &profile.sink().samples[0];
    assert_eq!(recorded.values, [3]);
    assert_eq!(
        recorded.labels[0],
        (LabelKey::ExceptionType, "ValueError".to_owned())
    );
    assert_eq!(recorded.labels.len(), 3);
}

#[test]
fn every_kind_lands_in_its_slot() {
    let mut profile = recording(ProfileBuilder::new().set_types(MeasurementKinds::ALL));
    profile.start_sample(0);
    profile.push_cputime(1, 2).unwrap();
    profile.push_walltime(3, 4).unwrap();
    profile.push_exceptioninfo("E", 5).unwrap();
    profile.push_acquire(6, 7).unwrap();
    profile.push_release(8, 9).unwrap();
    profile.push_alloc(10, 11).unwrap();
    profile.push_heap(12).unwrap();
    assert_eq!(profile.values(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
}

#[test]
fn profile_is_send() {
    fn is_send<T: Send>() {}
    is_send::<Profile>();
    is_send::<Profile<Recorder>>();
}

fn kind_orders() -> impl Strategy<Value = (Vec<MeasurementKind>, Vec<MeasurementKind>)> {
    prop::sample::subsequence(MeasurementKind::ALL.to_vec(), 1..=MeasurementKind::ALL.len())
        .prop_flat_map(|kinds| (Just(kinds.clone()).prop_shuffle(), Just(kinds).prop_shuffle()))
}

fn slots_added_in_order(kinds: &[MeasurementKind]) -> Vec<ValueSlot> {
    let builder = kinds
        .iter()
        .fold(ProfileBuilder::new(), |builder, kind| builder.add_type(*kind));
    recording(builder).schema().slots().to_vec()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: if cfg!(miri) { 8 } else { 64 },
        ..ProptestConfig::default()
    })]

    #[test]
    fn schema_ignores_add_type_order((first, second) in kind_orders()) {
        let a = slots_added_in_order(&first);
        let b = slots_added_in_order(&second);
        prop_assert_eq!(&a, &b);

        // Canonical: slots ascend in declaration order, grouped by kind.
        prop_assert!(a.windows(2).all(|w| (w[0] as usize) < (w[1] as usize)));
        let expected: usize = first.iter().map(|kind| slots_of(*kind).len()).sum();
        prop_assert_eq!(a.len(), expected);
        for kind in MeasurementKind::ALL {
            let enabled = first.contains(&kind);
            prop_assert_eq!(a.iter().any(|slot| slot.kind() == kind), enabled);
        }
    }
}
