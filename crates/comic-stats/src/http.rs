// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::ClientConfig;
use core::time::Duration;
use reqwest::ClientBuilder;
use tracing::error;

/// Creates a reqwest client builder using rustls for TLS.
pub fn create_reqwest_client_builder() -> ClientBuilder {
    reqwest::Client::builder().use_rustls_tls()
}

/// Builds a client with an optional HTTPS proxy. Without a timeout the
/// transport defaults apply.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Option<Duration>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = create_reqwest_client_builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    builder.build()
}

/// Builds the client described by `config`, falling back to a direct
/// connection and then to reqwest defaults.
#[must_use]
pub fn get_client(config: &ClientConfig) -> reqwest::Client {
    match build_client(config.https_proxy.as_deref(), config.timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to parse proxy configuration: {e}, falling back to direct connection");
            match build_client(None, config.timeout) {
                Ok(client) => client,
                Err(inner) => {
                    error!("Failed to build HTTP client without proxy: {inner}, using reqwest defaults");
                    reqwest::Client::new()
                }
            }
        }
    }
}
