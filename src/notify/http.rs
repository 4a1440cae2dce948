// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP client with retry budgets and exponential backoff.
//!
//! Every attempt consumes the `total` budget. Connection failures also consume
//! `connect`, read failures (timeouts, broken bodies) also consume `read`.
//! Responses with a retryable status consume only `total`. A request gives up
//! as soon as any budget drops below zero.
//!
//! Read failures and retryable statuses are only retried for idempotent
//! methods; a POST is retried only when the connection could not be made,
//! since the endpoint never saw the request.

use crate::config::HttpConfig;
use crate::constants::http::{BACKOFF_MAX_SECS, RETRY_STATUSES};
use crate::error::{Result, SyncError};
use reqwest::{Method, RequestBuilder, Response};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Connect,
    Read,
    Status(u16),
}

/// Remaining retry allowance for a single logical request
#[derive(Debug, Clone, PartialEq)]
struct RetryBudget {
    total: i64,
    connect: i64,
    read: i64,
    backoff_factor: f64,
    consecutive_failures: u32,
}

impl RetryBudget {
    fn new(config: &HttpConfig) -> Self {
        Self {
            total: i64::from(config.retry_total),
            connect: i64::from(config.retry_connect),
            read: i64::from(config.retry_read),
            backoff_factor: config.backoff_factor,
            consecutive_failures: 0,
        }
    }

    /// Record a failure; returns `false` once the budget is exhausted
    fn record(&mut self, failure: Failure) -> bool {
        self.total -= 1;
        match failure {
            Failure::Connect => self.connect -= 1,
            Failure::Read => self.read -= 1,
            Failure::Status(_) => {}
        }
        self.consecutive_failures += 1;
        self.total >= 0 && self.connect >= 0 && self.read >= 0
    }

    /// The first retry is immediate, then `factor * 2^(n-1)` seconds
    fn backoff(&self) -> Duration {
        if self.consecutive_failures <= 1 {
            return Duration::ZERO;
        }
        let exponent = (self.consecutive_failures - 1).min(32) as i32;
        let secs = (self.backoff_factor * 2f64.powi(exponent)).clamp(0.0, BACKOFF_MAX_SECS);
        Duration::from_secs_f64(secs)
    }
}

fn classify(error: &reqwest::Error) -> Option<Failure> {
    if error.is_connect() {
        Some(Failure::Connect)
    } else if error.is_timeout() || error.is_request() || error.is_body() {
        Some(Failure::Read)
    } else {
        None
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS | Method::TRACE
    )
}

fn is_retryable(method: &Method, failure: Failure) -> bool {
    match failure {
        Failure::Connect => true,
        Failure::Read => is_idempotent(method),
        Failure::Status(status) => is_idempotent(method) && RETRY_STATUSES.contains(&status),
    }
}

/// Shared outgoing HTTP client used for notifications and remote content
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: reqwest::Client,
    config: HttpConfig,
}

impl RetryingClient {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(Method::GET, url, || self.client.get(url)).await
    }

    /// POST `payload` as a JSON body; without a payload the body is empty
    pub async fn post_json(&self, url: &str, payload: Option<&serde_json::Value>) -> Result<Response> {
        self.execute(Method::POST, url, || {
            let request = self.client.post(url);
            match payload {
                Some(payload) => request.json(payload),
                None => request,
            }
        })
        .await
    }

    async fn execute<F>(&self, method: Method, url: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut budget = RetryBudget::new(&self.config);

        loop {
            let (failure, reason) = match build().send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let failure = Failure::Status(status);
                    if !is_retryable(&method, failure) {
                        return Ok(response);
                    }
                    if !budget.record(failure) {
                        return Err(SyncError::RetriesExhausted {
                            url: url.to_string(),
                            reason: format!("too many {} error responses", status),
                        });
                    }
                    (failure, format!("status {}", status))
                }
                Err(e) => {
                    let Some(failure) = classify(&e).filter(|f| is_retryable(&method, *f)) else {
                        return Err(SyncError::HttpError(e));
                    };
                    if !budget.record(failure) {
                        return Err(SyncError::RetriesExhausted {
                            url: url.to_string(),
                            reason: e.to_string(),
                        });
                    }
                    (failure, e.to_string())
                }
            };

            let delay = budget.backoff();
            warn!(
                "{} {} failed ({:?}: {}), retrying in {:?}",
                method, url, failure, reason, delay
            );
            sleep(delay).await;
            debug!("Retrying {} {}", method, url);
        }
    }
}
