// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client for the comic hot-counter statistics service.
//!
//! The service exposes three JSON endpoints (`/stat`, `/hit`, `/top`) behind a
//! single base URL. [`RemoteCounterClient`] wraps them and maps every failure
//! to a safe default, so callers never handle errors. Read tracking goes
//! through a [`Beacon`], which sends the hit without waiting for an answer.
//!
//! ```rust,ignore
//! use comic_stats::RemoteCounterClient;
//!
//! let client = RemoteCounterClient::new(comic_stats::DEFAULT_BASE_URL)?;
//! client.record_comic_view("x42");
//! let views = client.comic_views("x42").await;
//! let top = client.hot_comics(5).await;
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod beacon;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod report;

pub use beacon::{Beacon, ReqwestBeacon};
pub use client::{RemoteCounterClient, RemoteCounterClientBuilder, DEFAULT_HOT_LIMIT};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ConfigError, CounterError};
pub use model::{ComicId, HotComicEntry, SiteStats, ViewCount};
pub use report::{FailureReporter, Operation, TracingReporter};
