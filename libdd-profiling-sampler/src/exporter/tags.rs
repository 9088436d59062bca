// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag {
    /// Tags built from literals like "language:python" don't allocate.
    value: Cow<'static, str>,
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag").field("value", &self.value).finish()
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.value.as_ref()
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl Tag {
    /// Validates a tag. Only the rules that catch likely mistakes, such as
    /// an empty value, are enforced here; the backend handles the rest.
    fn from_value<'a, IntoCow>(chunk: IntoCow) -> anyhow::Result<Self>
    where
        IntoCow: Into<Cow<'a, str>>,
    {
        let chunk = chunk.into();
        anyhow::ensure!(!chunk.is_empty(), "tag is empty");

        let mut chars = chunk.chars();
        anyhow::ensure!(
            chars.next() != Some(':'),
            "tag '{chunk}' begins with a colon"
        );
        anyhow::ensure!(chars.last() != Some(':'), "tag '{chunk}' ends with a colon");

        let value = Cow::Owned(chunk.into_owned());
        Ok(Tag { value })
    }

    /// Creates a tag from a key and value.
    pub fn new<K, V>(key: K, value: V) -> anyhow::Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = key.as_ref();
        let value = value.as_ref();
        Tag::from_value(format!("{key}:{value}"))
    }
}

/// Parses tags separated by commas or spaces, such as the value of `DD_TAGS`:
///     "key1:value1,key2:value2"
///     "key1:value1 key2:value2"
///
/// Returns the tags that parsed, and a message describing the ones that
/// didn't, if any.
pub fn parse_tags(str: &str) -> (Vec<Tag>, Option<String>) {
    let mut tags = vec![];
    let mut errors = vec![];
    for chunk in str.split([',', ' ']).filter(|s| !s.is_empty()) {
        match Tag::from_value(chunk) {
            Ok(tag) => tags.push(tag),
            Err(err) => errors.push(err.to_string()),
        }
    }

    let error_message =
        (!errors.is_empty()).then(|| format!("Errors while parsing tags: {}", errors.join(", ")));
    (tags, error_message)
}
