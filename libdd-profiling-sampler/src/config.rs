// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::api::MeasurementKind;
use crate::internal::DEFAULT_MAX_NFRAMES;
use serde::{Deserialize, Serialize};

pub const MAX_FRAMES_ENV: &str = "DD_PROFILING_MAX_FRAMES";
pub const STACK_ENABLED_ENV: &str = "DD_PROFILING_STACK_ENABLED";
pub const EXCEPTION_ENABLED_ENV: &str = "DD_PROFILING_EXCEPTION_ENABLED";
pub const LOCK_ENABLED_ENV: &str = "DD_PROFILING_LOCK_ENABLED";
pub const MEMORY_ENABLED_ENV: &str = "DD_PROFILING_MEMORY_ENABLED";
pub const HEAP_ENABLED_ENV: &str = "DD_PROFILING_HEAP_ENABLED";

pub mod parse_env {
    use std::str::FromStr;

    /// Where variables are read from; the process environment in production.
    pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

    pub fn process_env(name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    pub fn int<T: FromStr>(vars: Lookup, name: &str) -> Option<T> {
        vars(name)?.trim().parse::<T>().ok()
    }

    pub fn bool(vars: Lookup, name: &str) -> Option<bool> {
        match vars(name)?.as_str() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            _ => Some(false),
        }
    }

    pub fn str_not_empty(vars: Lookup, name: &str) -> Option<String> {
        vars(name).filter(|s| !s.is_empty())
    }
}

/// How a [`crate::ProfileBuilder`] should be set up.
///
/// `sample_types` of `None` enables every kind.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub sample_types: Option<Vec<MeasurementKind>>,
    pub max_nframes: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_types: None,
            max_nframes: DEFAULT_MAX_NFRAMES,
        }
    }
}

impl SamplerConfig {
    /// Reads the configuration from the `DD_PROFILING_*` environment
    /// variables.
    pub fn from_env() -> Self {
        Self::from_lookup(&parse_env::process_env)
    }

    /// Like [SamplerConfig::from_env], reading variables through `vars`.
    ///
    /// Kind toggles default to enabled; if none is set, every kind is
    /// enabled. Unparsable frame limits fall back to the default.
    pub fn from_lookup(vars: parse_env::Lookup) -> Self {
        let max_nframes = parse_env::int(vars, MAX_FRAMES_ENV).unwrap_or(DEFAULT_MAX_NFRAMES);

        let toggles: [(&str, &[MeasurementKind]); 5] = [
            (
                STACK_ENABLED_ENV,
                &[MeasurementKind::Cpu, MeasurementKind::Wall],
            ),
            (EXCEPTION_ENABLED_ENV, &[MeasurementKind::Exception]),
            (
                LOCK_ENABLED_ENV,
                &[MeasurementKind::LockAcquire, MeasurementKind::LockRelease],
            ),
            (MEMORY_ENABLED_ENV, &[MeasurementKind::Allocation]),
            (HEAP_ENABLED_ENV, &[MeasurementKind::Heap]),
        ];
        let settings: Vec<_> = toggles
            .iter()
            .map(|(name, kinds)| (parse_env::bool(vars, name), *kinds))
            .collect();

        let sample_types = if settings.iter().all(|(enabled, _)| enabled.is_none()) {
            None
        } else {
            let kinds = settings
                .into_iter()
                .filter(|(enabled, _)| enabled.unwrap_or(true))
                .flat_map(|(_, kinds)| kinds.iter().copied())
                .collect();
            Some(kinds)
        };

        Self {
            sample_types,
            max_nframes,
        }
    }
}
