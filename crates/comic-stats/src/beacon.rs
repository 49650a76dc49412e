// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Best-effort, unconfirmed delivery of tracking hits.
//!
//! A beacon never reports back to its caller: the request is handed off and
//! the response, if any, is discarded.

use reqwest::Url;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Fire-and-forget sender for tracking URLs.
pub trait Beacon: Send + Sync {
    /// Queues a GET to `url` and returns without waiting for it.
    fn send(&self, url: Url);
}

/// Beacon backed by a reqwest client, with each hit running as a detached tokio task.
///
/// Clones share the same set of in-flight hits.
#[derive(Debug, Clone)]
pub struct ReqwestBeacon {
    client: reqwest::Client,
    tracker: TaskTracker,
    // close/wait/reopen must not interleave between concurrent drains
    drain_lock: Arc<Mutex<()>>,
}

impl ReqwestBeacon {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestBeacon {
            client,
            tracker: TaskTracker::new(),
            drain_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Number of hits still in flight
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every hit sent so far has finished. The beacon stays usable
    /// afterwards and concurrent callers drain one after another.
    pub async fn drain(&self) {
        let _guard = self.drain_lock.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

impl Beacon for ReqwestBeacon {
    fn send(&self, url: Url) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No tokio runtime available, dropping beacon to {url}");
            return;
        };

        let client = self.client.clone();
        self.tracker.spawn_on(
            async move {
                match client.get(url.clone()).send().await {
                    Ok(response) => {
                        debug!("Beacon to {url} answered with {}", response.status());
                    }
                    Err(e) => {
                        debug!("Beacon to {url} failed: {e}");
                    }
                }
            },
            &handle,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_send_outside_runtime_is_dropped() {
        let beacon = ReqwestBeacon::new(reqwest::Client::new());
        beacon.send(Url::parse("http://127.0.0.1:1/hit?id=1").unwrap());

        assert_eq!(beacon.in_flight(), 0);
        assert!(logs_contain("No tokio runtime available"));
    }

    #[tokio::test]
    async fn test_drain_waits_for_unreachable_hit() {
        let beacon = ReqwestBeacon::new(reqwest::Client::new());
        // port 1 refuses connections, so the task finishes with a transport error
        beacon.send(Url::parse("http://127.0.0.1:1/hit?id=1").unwrap());
        beacon.drain().await;

        assert_eq!(beacon.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_beacon_reusable_after_drain() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hit?id=7")
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let beacon = ReqwestBeacon::new(reqwest::Client::new());
        let url = Url::parse(&format!("{}/hit?id=7", server.url())).unwrap();

        beacon.send(url.clone());
        beacon.drain().await;
        beacon.send(url);
        beacon.drain().await;

        mock.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_drains_complete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hit?id=9")
            .with_status(200)
            .expect(8)
            .create_async()
            .await;

        let beacon = ReqwestBeacon::new(reqwest::Client::new());
        let url = Url::parse(&format!("{}/hit?id=9", server.url())).unwrap();

        let mut drains = Vec::new();
        for _ in 0..4 {
            let beacon = beacon.clone();
            let url = url.clone();
            drains.push(tokio::spawn(async move {
                beacon.send(url.clone());
                beacon.send(url);
                beacon.drain().await;
            }));
        }
        for drain in drains {
            drain.await.unwrap();
        }

        assert_eq!(beacon.in_flight(), 0);
        mock.assert_async().await;
    }
}
