// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Downstream reload notification and the persisted outcome flag.

use crate::config::{NotifyConfig, NotifyMethod};
use crate::error::{Result, SyncError};
use crate::notify::http::RetryingClient;
use crate::sync::files::replace_file;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Outcome of the most recent POST notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationState {
    #[default]
    Unset,
    Succeeded,
    Failed,
}

impl NotificationState {
    /// Text persisted to the status file, `None` while unset
    pub fn as_status_text(&self) -> Option<&'static str> {
        match self {
            NotificationState::Unset => None,
            NotificationState::Succeeded => Some("true"),
            NotificationState::Failed => Some("false"),
        }
    }
}

/// File holding the literal `true` or `false`, read by external health checks
#[derive(Debug, Clone)]
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, state: NotificationState) -> Result<()> {
        let Some(text) = state.as_status_text() else {
            return Ok(());
        };
        replace_file(&self.path, text.as_bytes()).await
    }
}

/// Sends the configured webhook after materialization.
///
/// Clones share the same [`NotificationState`].
#[derive(Debug, Clone)]
pub struct Notifier {
    config: NotifyConfig,
    http: RetryingClient,
    status_file: Option<StatusFile>,
    state: Arc<Mutex<NotificationState>>,
}

impl Notifier {
    pub fn new(config: NotifyConfig, http: RetryingClient, status_file: Option<StatusFile>) -> Self {
        Self {
            config,
            http,
            status_file,
            state: Arc::new(Mutex::new(NotificationState::Unset)),
        }
    }

    pub fn state(&self) -> NotificationState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reset the flag to `true` at startup, discarding whatever a previous run left behind
    pub async fn initialize_status(&self) -> Result<()> {
        if let Some(file) = &self.status_file {
            match tokio::fs::remove_file(file.path()).await {
                Ok(()) => debug!("Removed stale status file {}", file.path().display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(SyncError::IoError {
                        path: file.path().to_path_buf(),
                        source,
                    })
                }
            }
        }
        self.set_state(NotificationState::Succeeded);
        self.persist_state().await
    }

    /// Send the notification. Does nothing when no URL is configured.
    ///
    /// Only POST outcomes update the notification state.
    pub async fn notify(&self) -> Result<()> {
        let Some(url) = &self.config.url else {
            debug!("No notification URL configured, skipping");
            return Ok(());
        };

        match self.config.method {
            NotifyMethod::Get => {
                let response = self.http.get(url.as_str()).await?;
                let status = response.status();
                if status.is_success() {
                    debug!("GET request sent to {}. Response: {}", url, status);
                } else {
                    warn!("GET request to {} returned {}", url, status);
                }
                Ok(())
            }
            NotifyMethod::Post => {
                let result = self.http.post_json(url.as_str(), self.config.payload.as_ref()).await;
                let outcome = match result {
                    Ok(response) if response.status().as_u16() == 200 => {
                        info!("POST request successfully sent to {}. Response: {}", url, response.status());
                        Ok(())
                    }
                    Ok(response) => {
                        error!("POST request failed to send to {}. Response: {}", url, response.status());
                        Err(SyncError::UnexpectedStatus {
                            url: url.to_string(),
                            status: response.status().as_u16(),
                        })
                    }
                    Err(e) => {
                        error!("POST request failed to send to {}: {}", url, e);
                        Err(e)
                    }
                };

                self.set_state(if outcome.is_ok() {
                    NotificationState::Succeeded
                } else {
                    NotificationState::Failed
                });
                if let Err(e) = self.persist_state().await {
                    error!("Failed to write notification status: {}", e);
                }
                outcome
            }
        }
    }

    fn set_state(&self, state: NotificationState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    async fn persist_state(&self) -> Result<()> {
        match &self.status_file {
            Some(file) => file.write(self.state()).await,
            None => Ok(()),
        }
    }
}
