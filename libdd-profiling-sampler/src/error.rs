// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::api::MeasurementKind;

/// Coarse classification of a [`SampleError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The profile could not be built from the requested configuration.
    Construction,
    /// The operation is not valid in the current state, or targets a
    /// measurement kind the profile doesn't track.
    PreconditionViolation,
    /// A fixed-capacity buffer is full. Data already buffered is kept.
    CapacityExceeded,
    /// The sink failed to accept the sample.
    EncodeFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("at least one measurement kind must be enabled")]
    EmptyTypeMask,
    #[error("max_nframes must be greater than zero")]
    ZeroMaxFrames,
    #[error("measurement kind `{kind}` is not enabled for this profile")]
    KindNotEnabled { kind: MeasurementKind },
    #[error("no sample is open; call start_sample first")]
    NoOpenSample,
    #[error("label set is full ({limit} labels)")]
    LabelsFull { limit: usize },
    #[error("stack is full ({limit} frames); frame dropped")]
    StackTruncated { limit: usize },
    #[error("failed to encode sample: {0}")]
    Encode(#[source] anyhow::Error),
}

impl SampleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SampleError::EmptyTypeMask | SampleError::ZeroMaxFrames => ErrorKind::Construction,
            SampleError::KindNotEnabled { .. } | SampleError::NoOpenSample => {
                ErrorKind::PreconditionViolation
            }
            SampleError::LabelsFull { .. } | SampleError::StackTruncated { .. } => {
                ErrorKind::CapacityExceeded
            }
            SampleError::Encode(_) => ErrorKind::EncodeFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(SampleError::ZeroMaxFrames.kind(), ErrorKind::Construction);
        assert_eq!(
            SampleError::LabelsFull { limit: 8 }.kind(),
            ErrorKind::CapacityExceeded
        );
        let err = SampleError::Encode(anyhow::anyhow!("sink closed"));
        assert_eq!(err.kind(), ErrorKind::EncodeFailure);
        assert_eq!(err.to_string(), "failed to encode sample: sink closed");
    }

    #[test]
    fn messages_name_the_kind() {
        let err = SampleError::KindNotEnabled {
            kind: MeasurementKind::LockAcquire,
        };
        assert_eq!(
            err.to_string(),
            "measurement kind `lock_acquire` is not enabled for this profile"
        );
    }
}
