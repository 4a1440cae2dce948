// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Blocks startup until the downstream notification endpoint answers.

use crate::constants::readiness::POLL_INTERVAL_SECS;
use crate::error::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Wait until `url` answers with any HTTP response, polling every `POLL_INTERVAL_SECS`.
pub async fn wait_for_endpoint(url: &str, timeout: Duration) -> Result<()> {
    wait_for_endpoint_every(url, timeout, Duration::from_secs(POLL_INTERVAL_SECS)).await
}

async fn wait_for_endpoint_every(url: &str, timeout: Duration, interval: Duration) -> Result<()> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    loop {
        match client.get(url).send().await {
            Ok(response) => {
                debug!("Endpoint {} answered with {}", url, response.status());
                info!("Notification endpoint {} is contactable, continuing", url);
                return Ok(());
            }
            Err(e) => {
                info!(
                    "Notification endpoint {} is not up yet ({}), waiting {} seconds...",
                    url,
                    e,
                    interval.as_secs_f64()
                );
            }
        }

        sleep(interval).await;
    }
}
