// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Long-running change watcher for one resource kind.
//!
//! Events are applied one at a time in delivery order. A clean end of the
//! stream or a recoverable error leads to the stream being reopened; an
//! internal server error on the API side stops the watcher.

use crate::error::{Result, SyncError};
use crate::kubernetes::{EventStream, ResourceSource};
use crate::sync::materializer::Materializer;
use crate::types::ResourceKind;
use futures::StreamExt;
use kube::runtime::watcher;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Whether a watch error must stop the watcher instead of reopening the stream
pub fn is_fatal(error: &watcher::Error) -> bool {
    let code = match error {
        watcher::Error::InitialListFailed(kube::Error::Api(response))
        | watcher::Error::WatchStartFailed(kube::Error::Api(response))
        | watcher::Error::WatchFailed(kube::Error::Api(response)) => response.code,
        watcher::Error::WatchError(response) => response.code,
        _ => return false,
    };
    code == 500
}

pub struct ChangeWatcher<S: ResourceSource> {
    source: S,
    materializer: Materializer,
}

impl<S: ResourceSource> ChangeWatcher<S> {
    pub fn new(source: S, materializer: Materializer) -> Self {
        Self {
            source,
            materializer,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.source.kind()
    }

    /// Watch until a fatal error occurs or `cancel` fires
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let kind = self.kind();

        loop {
            info!("Opening watch stream for {}", kind);
            let stream = self.source.watch();

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Watcher for {} cancelled", kind);
                    return Ok(());
                }
                result = self.stream_events(stream) => match result {
                    Ok(()) => info!("Watch stream for {} closed, reopening", kind),
                    Err(e) => {
                        error!("Watcher for {} stopping: {}", kind, e);
                        return Err(e);
                    }
                },
            }
        }
    }

    async fn stream_events(&self, mut stream: EventStream) -> Result<()> {
        let kind = self.kind();

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => self.materializer.apply_event(kind, &event).await,
                Err(e) if is_fatal(&e) => return Err(SyncError::WatchError { kind, source: e }),
                Err(e) => warn!("Error watching {}, the stream will resync: {}", kind, e),
            }
        }

        Ok(())
    }
}
