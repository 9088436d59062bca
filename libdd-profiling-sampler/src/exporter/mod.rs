// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process-identifying metadata attached to every uploaded profile.
//!
//! Building the request and sending it is left to the embedding exporter;
//! this module only produces the tags.

mod tags;

pub use tags::{parse_tags, Tag};

use crate::config::parse_env;
use enum_map::{Enum, EnumMap};
use uuid::Uuid;

pub const ENV_ENV: &str = "DD_ENV";
pub const SERVICE_ENV: &str = "DD_SERVICE";
pub const VERSION_ENV: &str = "DD_VERSION";
pub const TAGS_ENV: &str = "DD_TAGS";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Enum)]
pub enum ExportTagKey {
    Language,
    Env,
    Service,
    Version,
    RuntimeVersion,
    Runtime,
    RuntimeId,
    ProfilerVersion,
    ProfileSeq,
}

impl ExportTagKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExportTagKey::Language => "language",
            ExportTagKey::Env => "env",
            ExportTagKey::Service => "service",
            ExportTagKey::Version => "version",
            ExportTagKey::RuntimeVersion => "runtime_version",
            ExportTagKey::Runtime => "runtime",
            ExportTagKey::RuntimeId => "runtime-id",
            ExportTagKey::ProfilerVersion => "profiler_version",
            ExportTagKey::ProfileSeq => "profile_seq",
        }
    }
}

/// The well-known tags of a process, its user tags, and the upload
/// sequence number.
///
/// The runtime id is a random v4 uuid unless one is set explicitly. The
/// sequence number starts at zero and grows by one per
/// [`ExportMetadata::next_upload_tags`] call.
#[derive(Clone, Debug)]
pub struct ExportMetadata {
    values: EnumMap<ExportTagKey, Option<String>>,
    user_tags: Vec<Tag>,
    profile_seq: u64,
}

impl Default for ExportMetadata {
    fn default() -> Self {
        let mut values: EnumMap<ExportTagKey, Option<String>> = EnumMap::default();
        values[ExportTagKey::RuntimeId] = Some(Uuid::new_v4().to_string());
        Self {
            values,
            user_tags: Vec::new(),
            profile_seq: 0,
        }
    }
}

impl ExportMetadata {
    pub fn new(language: &str) -> Self {
        let mut metadata = Self::default();
        metadata.values[ExportTagKey::Language] = Some(language.to_owned());
        metadata
    }

    /// Fills env, service, version and user tags from the `DD_*` variables.
    /// Malformed `DD_TAGS` entries are skipped with a warning.
    pub fn from_env(language: &str) -> Self {
        Self::from_lookup(language, &parse_env::process_env)
    }

    pub fn from_lookup(language: &str, vars: parse_env::Lookup) -> Self {
        let mut metadata = Self::new(language);
        for (key, name) in [
            (ExportTagKey::Env, ENV_ENV),
            (ExportTagKey::Service, SERVICE_ENV),
            (ExportTagKey::Version, VERSION_ENV),
        ] {
            metadata.values[key] = parse_env::str_not_empty(vars, name);
        }
        if let Some(tags) = parse_env::str_not_empty(vars, TAGS_ENV) {
            let (tags, error) = parse_tags(&tags);
            if let Some(error) = error {
                tracing::warn!("{error}");
            }
            metadata.user_tags = tags;
        }
        metadata
    }

    /// Sets a well-known tag. Empty values unset it.
    ///
    /// # Errors
    /// The sequence number can't be set; it's owned by the metadata.
    pub fn set(&mut self, key: ExportTagKey, value: &str) -> anyhow::Result<()> {
        anyhow::ensure!(
            key != ExportTagKey::ProfileSeq,
            "{} is assigned per upload and can't be set",
            key.as_str()
        );
        self.values[key] = (!value.is_empty()).then(|| value.to_owned());
        Ok(())
    }

    pub fn get(&self, key: ExportTagKey) -> Option<&str> {
        self.values[key].as_deref()
    }

    pub fn add_user_tag(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.user_tags.push(Tag::new(key, value)?);
        Ok(())
    }

    pub fn user_tags(&self) -> &[Tag] {
        &self.user_tags
    }

    #[inline]
    pub fn runtime_id(&self) -> Option<&str> {
        self.get(ExportTagKey::RuntimeId)
    }

    /// The sequence number the next upload will carry.
    #[inline]
    pub fn profile_seq(&self) -> u64 {
        self.profile_seq
    }

    /// The tags for the next upload: every well-known tag that has a value,
    /// then the user tags. Advances the sequence number.
    pub fn next_upload_tags(&mut self) -> anyhow::Result<Vec<Tag>> {
        let seq = self.profile_seq.to_string();
        let mut tags = Vec::with_capacity(self.values.len() + self.user_tags.len());
        for (key, value) in self.values.iter() {
            let value = match key {
                ExportTagKey::ProfileSeq => Some(seq.as_str()),
                _ => value.as_deref(),
            };
            if let Some(value) = value {
                tags.push(Tag::new(key.as_str(), value)?);
            }
        }
        tags.extend(self.user_tags.iter().cloned());
        self.profile_seq += 1;
        Ok(tags)
    }
}
