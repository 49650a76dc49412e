// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::beacon::{Beacon, ReqwestBeacon};
use crate::config::ClientConfig;
use crate::error::{ConfigError, CounterError};
use crate::http::get_client;
use crate::model::{ComicId, Envelope, HitData, HotComicEntry, SiteStats, ViewCount};
use crate::report::{FailureReporter, Operation, TracingReporter};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of ranking entries returned when the caller does not ask for a limit
pub const DEFAULT_HOT_LIMIT: usize = 10;

const STAT_PATH: &str = "stat";
const HIT_PATH: &str = "hit";
const TOP_PATH: &str = "top";

/// Client for the remote comic counter service.
///
/// The plain operations never fail: transport errors, bad status codes,
/// undecodable bodies and `success: false` answers are handed to the
/// [`FailureReporter`] and turned into `None`, `0` or an empty list. The
/// `try_*` variants return the error instead.
///
/// Cloning is cheap and every clone talks to the same service.
#[derive(Clone)]
pub struct RemoteCounterClient {
    base_url: Url,
    http: reqwest::Client,
    beacon: Arc<dyn Beacon>,
    // set when the client built its own beacon, so it can be drained
    default_beacon: Option<ReqwestBeacon>,
    reporter: Arc<dyn FailureReporter>,
}

impl fmt::Debug for RemoteCounterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCounterClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteCounterClient {
    /// Client with default transport, beacon and reporter. Hits recorded
    /// through the default beacon can be awaited with
    /// [`drain_beacon`](Self::drain_beacon).
    pub fn new(base_url: &str) -> Result<Self, CounterError> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> RemoteCounterClientBuilder {
        RemoteCounterClientBuilder::new(base_url)
    }

    /// Client built from validated configuration, including proxy and timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let http = get_client(config);
        Ok(Self::assemble(base_url, http, None, None))
    }

    fn assemble(
        base_url: Url,
        http: reqwest::Client,
        beacon: Option<Arc<dyn Beacon>>,
        reporter: Option<Arc<dyn FailureReporter>>,
    ) -> Self {
        let (beacon, default_beacon) = match beacon {
            Some(beacon) => (beacon, None),
            None => {
                let default_beacon = ReqwestBeacon::new(http.clone());
                let beacon: Arc<dyn Beacon> = Arc::new(default_beacon.clone());
                (beacon, Some(default_beacon))
            }
        };
        let reporter = reporter.unwrap_or_else(|| Arc::new(TracingReporter));
        RemoteCounterClient {
            base_url: with_trailing_slash(base_url),
            http,
            beacon,
            default_beacon,
            reporter,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Site-wide statistics from `/stat`, or `None` on any failure.
    pub async fn site_stats(&self) -> Option<SiteStats> {
        match self.try_site_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                self.reporter.report(Operation::SiteStats, &e);
                None
            }
        }
    }

    /// Read count for one comic from `/hit`, or `0` on any failure.
    pub async fn comic_views(&self, id: impl Into<ComicId>) -> ViewCount {
        self.try_comic_views(id).await.unwrap_or_else(|e| {
            self.reporter.report(Operation::ComicViews, &e);
            0
        })
    }

    /// First `limit` entries of the `/top` ranking, or an empty list on any failure.
    pub async fn hot_comics(&self, limit: usize) -> Vec<HotComicEntry> {
        self.try_hot_comics(limit).await.unwrap_or_else(|e| {
            self.reporter.report(Operation::HotComics, &e);
            Vec::new()
        })
    }

    /// [`hot_comics`](Self::hot_comics) with [`DEFAULT_HOT_LIMIT`].
    pub async fn hot_comics_default(&self) -> Vec<HotComicEntry> {
        self.hot_comics(DEFAULT_HOT_LIMIT).await
    }

    /// Records one read of `id` through the beacon and returns immediately.
    /// Delivery is not confirmed.
    pub fn record_comic_view(&self, id: impl Into<ComicId>) {
        let id = id.into();
        match self.hit_url(&id) {
            Ok(url) => self.beacon.send(url),
            Err(e) => warn!("Dropping read of {id}: {e}"),
        }
    }

    /// Waits for hits still in flight on the default beacon. Does nothing when
    /// a beacon was injected through the builder; drain that one directly.
    pub async fn drain_beacon(&self) {
        if let Some(beacon) = &self.default_beacon {
            beacon.drain().await;
        }
    }

    pub async fn try_site_stats(&self) -> Result<SiteStats, CounterError> {
        self.fetch(self.endpoint(STAT_PATH)?).await
    }

    pub async fn try_comic_views(&self, id: impl Into<ComicId>) -> Result<ViewCount, CounterError> {
        let hit: HitData = self.fetch(self.hit_url(&id.into())?).await?;
        Ok(hit.views)
    }

    pub async fn try_hot_comics(&self, limit: usize) -> Result<Vec<HotComicEntry>, CounterError> {
        let mut entries: Vec<HotComicEntry> = self.fetch(self.endpoint(TOP_PATH)?).await?;
        entries.truncate(limit);
        Ok(entries)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CounterError> {
        Ok(self.base_url.join(path)?)
    }

    fn hit_url(&self, id: &ComicId) -> Result<Url, CounterError> {
        let mut url = self.endpoint(HIT_PATH)?;
        url.query_pairs_mut().append_pair("id", id.as_str());
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, CounterError> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CounterError::Status(status));
        }
        let body = response.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        envelope.into_data()
    }
}

/// Builder for [`RemoteCounterClient`] that lets hosts inject the transport,
/// the beacon and the failure reporter.
pub struct RemoteCounterClientBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
    beacon: Option<Arc<dyn Beacon>>,
    reporter: Option<Arc<dyn FailureReporter>>,
}

impl RemoteCounterClientBuilder {
    fn new(base_url: &str) -> Self {
        RemoteCounterClientBuilder {
            base_url: base_url.to_string(),
            http: None,
            beacon: None,
            reporter: None,
        }
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn beacon(mut self, beacon: Arc<dyn Beacon>) -> Self {
        self.beacon = Some(beacon);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<RemoteCounterClient, CounterError> {
        let base_url = Url::parse(self.base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(CounterError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let http = self.http.unwrap_or_default();
        Ok(RemoteCounterClient::assemble(
            base_url,
            http,
            self.beacon,
            self.reporter,
        ))
    }
}

// `Url::join` replaces the last path segment unless the base ends with '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    url
}
