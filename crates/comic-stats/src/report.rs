// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::CounterError;
use std::fmt;
use tracing::error;

/// Client operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SiteStats,
    ComicViews,
    HotComics,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SiteStats => "site_stats",
            Operation::ComicViews => "comic_views",
            Operation::HotComics => "hot_comics",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives every failure the client swallows before it returns a safe default.
pub trait FailureReporter: Send + Sync {
    fn report(&self, operation: Operation, error: &CounterError);
}

/// Writes failures to the `tracing` subscriber installed by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, operation: Operation, error: &CounterError) {
        error!(operation = operation.as_str(), "Counter request failed: {error}");
    }
}
