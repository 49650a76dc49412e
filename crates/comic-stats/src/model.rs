// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the counter service.
//!
//! Aggregate statistics and ranking entries are passed through untouched, the
//! client only looks inside the `{success, data}` envelope and the view count.

use crate::error::CounterError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a single comic. The service accepts strings and integers alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComicId(String);

impl ComicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComicId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ComicId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ComicId> for ComicId {
    fn from(id: &ComicId) -> Self {
        id.clone()
    }
}

macro_rules! comic_id_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for ComicId {
                fn from(id: $int) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

comic_id_from_int!(u32, u64, usize, i32, i64);

/// Number of reads recorded for a comic
pub type ViewCount = u64;

/// Site-wide aggregate returned by `/stat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteStats(pub Value);

impl SiteStats {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// One row of the `/top` ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotComicEntry(pub Value);

impl HotComicEntry {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Response envelope shared by every endpoint: `{"success": bool, "data": ...}`.
///
/// `data` stays untyped until `success` has been checked, so a rejected answer
/// is reported as rejected whatever it carries.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    success: bool,
    data: Option<Value>,
}

impl Envelope {
    pub(crate) fn into_data<T: DeserializeOwned>(self) -> Result<T, CounterError> {
        if !self.success {
            return Err(CounterError::Rejected);
        }
        let data = self.data.ok_or(CounterError::MissingData)?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Payload of `/hit`
#[derive(Debug, Deserialize)]
pub(crate) struct HitData {
    pub(crate) views: ViewCount,
}
