// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs one watcher task per resource kind and fails as soon as any of them exits.
//!
//! There is no restart policy here: the process is expected to be restarted
//! by whatever runs it.

use crate::constants::supervisor::POLL_INTERVAL_SECS;
use crate::error::{Result, SyncError};
use crate::kubernetes::ResourceSource;
use crate::sync::watcher::ChangeWatcher;
use crate::types::ResourceKind;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A running watcher task and the token used to stop it
#[derive(Debug)]
pub struct WatcherHandle {
    kind: ResourceKind,
    task: JoinHandle<Result<()>>,
    cancel: CancellationToken,
}

impl WatcherHandle {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_alive(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ask the watcher to stop; it notices at its next await point
    pub fn terminate(&self) {
        self.cancel.cancel();
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Debug)]
pub struct Supervisor {
    handles: Vec<WatcherHandle>,
    poll_interval: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn handles(&self) -> &[WatcherHandle] {
        &self.handles
    }

    /// Start `watcher` as an independent task
    pub fn spawn<S: ResourceSource>(&mut self, watcher: ChangeWatcher<S>) {
        let kind = watcher.kind();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(watcher.run(cancel.clone()));
        info!("Started watcher for {}", kind);
        self.handles.push(WatcherHandle { kind, task, cancel });
    }

    /// Poll watcher liveness until one exits, then stop the rest and return
    /// the reason.
    pub async fn run(&mut self) -> SyncError {
        if self.handles.is_empty() {
            return SyncError::ConfigError("no resource kinds to watch".to_string());
        }

        loop {
            if let Some(index) = self.handles.iter().position(|h| !h.is_alive()) {
                let kind = self.handles[index].kind;
                self.report_exit(index).await;

                for (i, sibling) in self.handles.iter().enumerate() {
                    if i == index {
                        continue;
                    }
                    if sibling.is_alive() {
                        info!("Stopping watcher for {}", sibling.kind);
                        sibling.terminate();
                    } else {
                        info!("Watcher for {} also died...", sibling.kind);
                    }
                }

                return SyncError::WatcherDied(kind);
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn report_exit(&mut self, index: usize) {
        let handle = &mut self.handles[index];
        let kind = handle.kind;
        match (&mut handle.task).await {
            Ok(Ok(())) => error!("Watcher for {} died. Stopping and exiting", kind),
            Ok(Err(e)) => error!("Watcher for {} died: {}. Stopping and exiting", kind, e),
            Err(e) => error!(
                "Watcher task for {} panicked or was aborted: {}. Stopping and exiting",
                kind, e
            ),
        }
    }
}
