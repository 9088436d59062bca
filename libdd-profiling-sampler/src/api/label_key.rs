// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Well-known label keys a sample can carry.
///
/// The string form is what ends up as the label key in the encoded profile,
/// so it must stay in sync with what the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKey {
    ExceptionType,
    ThreadId,
    ThreadNativeId,
    ThreadName,
    TaskId,
    TaskName,
    SpanId,
    LocalRootSpanId,
    TraceType,
    TraceResourceContainer,
    TraceEndpoint,
    ClassName,
    LockName,
}

impl LabelKey {
    pub const COUNT: usize = 13;

    /// Every key, in declaration order, so `ALL[key as usize] == key`.
    pub const ALL: [LabelKey; Self::COUNT] = [
        LabelKey::ExceptionType,
        LabelKey::ThreadId,
        LabelKey::ThreadNativeId,
        LabelKey::ThreadName,
        LabelKey::TaskId,
        LabelKey::TaskName,
        LabelKey::SpanId,
        LabelKey::LocalRootSpanId,
        LabelKey::TraceType,
        LabelKey::TraceResourceContainer,
        LabelKey::TraceEndpoint,
        LabelKey::ClassName,
        LabelKey::LockName,
    ];

    /// Returns the string representation of this label key.
    ///
    /// # Example
    /// ```
    /// # use libdd_profiling_sampler::LabelKey;
    /// assert_eq!(LabelKey::ThreadId.as_str(), "thread id");
    /// assert_eq!(LabelKey::LocalRootSpanId.as_str(), "local root span id");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            LabelKey::ExceptionType => "exception type",
            LabelKey::ThreadId => "thread id",
            LabelKey::ThreadNativeId => "thread native id",
            LabelKey::ThreadName => "thread name",
            LabelKey::TaskId => "task id",
            LabelKey::TaskName => "task name",
            LabelKey::SpanId => "span id",
            LabelKey::LocalRootSpanId => "local root span id",
            LabelKey::TraceType => "trace type",
            LabelKey::TraceResourceContainer => "trace resource container",
            LabelKey::TraceEndpoint => "trace endpoint",
            LabelKey::ClassName => "class name",
            LabelKey::LockName => "lock name",
        }
    }
}

impl AsRef<str> for LabelKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LabelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
