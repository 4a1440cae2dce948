// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use crate::types::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Watch stream for {kind} failed: {source}")]
    WatchError {
        kind: ResourceKind,
        #[source]
        source: kube_runtime::watcher::Error,
    },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Request to {url} gave up after exhausting retries: {reason}")]
    RetriesExhausted { url: String, reason: String },

    #[error("Invalid content for key {key}: {reason}")]
    InvalidContent { key: String, reason: String },

    #[error("Filesystem error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Watcher for {0} died")]
    WatcherDied(ResourceKind),
}

pub type Result<T> = std::result::Result<T, SyncError>;
