// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, ensure, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::constants::{annotations, http, DEFAULT_STATUS_FILE};
use crate::types::ResourceKind;

/// HTTP method used for the downstream notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMethod {
    #[default]
    Get,
    Post,
}

impl FromStr for NotifyMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "GET" => Ok(NotifyMethod::Get),
            "POST" => Ok(NotifyMethod::Post),
            other => bail!("unsupported REQ_METHOD '{}', expected GET or POST", other),
        }
    }
}

/// Whether to synchronise once and exit or keep watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Watch,
}

/// Retry and timeout knobs shared by every outgoing HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub retry_total: u32,
    pub retry_connect: u32,
    pub retry_read: u32,
    pub backoff_factor: f64,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retry_total: http::RETRY_TOTAL,
            retry_connect: http::RETRY_CONNECT,
            retry_read: http::RETRY_READ,
            backoff_factor: http::RETRY_BACKOFF_FACTOR,
            timeout: Duration::from_secs_f64(http::TIMEOUT_SECS),
        }
    }
}

/// Downstream webhook settings; `url: None` disables notification entirely
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyConfig {
    pub url: Option<Url>,
    pub method: NotifyMethod,
    pub payload: Option<serde_json::Value>,
}

/// Sidecar configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Label key whose presence selects a resource
    pub label: String,
    /// Default destination directory
    pub folder: PathBuf,
    pub resources: Vec<ResourceKind>,
    /// Explicit namespace or `ALL`; `None` falls back to the pod's own namespace
    pub namespace: Option<String>,
    pub folder_annotation: String,
    pub notify: NotifyConfig,
    pub http: HttpConfig,
    pub mode: Mode,
    pub skip_tls_verify: bool,
    pub status_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let label = lookup("LABEL").context("LABEL environment variable not set")?;
        let folder = lookup("FOLDER")
            .map(PathBuf::from)
            .context("FOLDER environment variable not set")?;

        let resources = ResourceKind::parse_selection(
            &lookup("RESOURCE").unwrap_or_else(|| "configmap".to_string()),
        )?;

        let folder_annotation = lookup("FOLDER_ANNOTATIONS")
            .unwrap_or_else(|| annotations::DEFAULT_FOLDER.to_string());

        let url = lookup("REQ_URL")
            .map(|u| Url::parse(&u).with_context(|| format!("REQ_URL '{}' is not a valid URL", u)))
            .transpose()?;
        let method = lookup("REQ_METHOD")
            .map(|m| m.parse())
            .transpose()?
            .unwrap_or_default();
        // Payload is sent as JSON; plain text becomes a JSON string
        let payload = lookup("REQ_PAYLOAD").map(|p| {
            serde_json::from_str(&p).unwrap_or(serde_json::Value::String(p))
        });

        let backoff_factor: f64 =
            parse_or(&lookup, "REQ_RETRY_BACKOFF_FACTOR", http::RETRY_BACKOFF_FACTOR)?;
        ensure!(
            backoff_factor.is_finite() && backoff_factor >= 0.0,
            "REQ_RETRY_BACKOFF_FACTOR must be a non-negative number, got {}",
            backoff_factor
        );

        let http = HttpConfig {
            retry_total: parse_or(&lookup, "REQ_RETRY_TOTAL", http::RETRY_TOTAL)?,
            retry_connect: parse_or(&lookup, "REQ_RETRY_CONNECT", http::RETRY_CONNECT)?,
            retry_read: parse_or(&lookup, "REQ_RETRY_READ", http::RETRY_READ)?,
            backoff_factor,
            timeout: Duration::try_from_secs_f64(parse_or(&lookup, "REQ_TIMEOUT", http::TIMEOUT_SECS)?)
                .context("REQ_TIMEOUT must be a non-negative number of seconds")?,
        };

        let mode = match lookup("METHOD") {
            Some(m) if m == "LIST" => Mode::List,
            _ => Mode::Watch,
        };

        let skip_tls_verify = lookup("SKIP_TLS_VERIFY").is_some_and(|v| v == "true");
        let status_file = lookup("STATUS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATUS_FILE));

        Ok(Config {
            label,
            folder,
            resources,
            namespace: lookup("NAMESPACE"),
            folder_annotation,
            notify: NotifyConfig {
                url,
                method,
                payload,
            },
            http,
            mode,
            skip_tls_verify,
            status_file,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
