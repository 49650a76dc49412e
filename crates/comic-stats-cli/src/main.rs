// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use comic_stats::{
    http::get_client, ClientConfig, RemoteCounterClient, ReqwestBeacon, DEFAULT_HOT_LIMIT,
};

#[derive(Parser)]
#[command(name = "comic-stats")]
#[command(about = "Query and report comic read counts")]
#[command(version)]
struct Cli {
    /// Counter service base URL (overrides COMIC_STATS_URL)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print site-wide statistics
    Stat,
    /// Print the read count of one comic
    Views { id: String },
    /// Print the hottest comics
    Top {
        #[arg(short, long, default_value_t = DEFAULT_HOT_LIMIT)]
        limit: usize,
    },
    /// Record one read of a comic
    Hit { id: String },
}

/// Environment configuration with the command line override applied before validation.
fn load_config(base_url: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::read_env();
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.base_url)?;

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", config.log_level);
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(env_filter).context("could not parse log level")?)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    debug!("Logging subsystem enabled");

    let http = get_client(&config);
    let beacon = Arc::new(ReqwestBeacon::new(http.clone()));
    let client = RemoteCounterClient::builder(&config.base_url)
        .http_client(http)
        .beacon(beacon.clone())
        .build()?;

    match cli.command {
        Command::Stat => {
            let stats = client.try_site_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Views { id } => {
            let views = client.try_comic_views(id).await?;
            println!("{views}");
        }
        Command::Top { limit } => {
            let top = client.try_hot_comics(limit).await?;
            println!("{}", serde_json::to_string_pretty(&top)?);
        }
        Command::Hit { id } => {
            debug!("Recording read of {id}");
            client.record_comic_view(id);
            beacon.drain().await;
        }
    }

    Ok(())
}
