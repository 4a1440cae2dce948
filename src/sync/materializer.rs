// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applies resource snapshots and change events to the filesystem.

use crate::notify::Notifier;
use crate::sync::content::{file_name_for_key, ContentResolver};
use crate::sync::files::{remove_file, write_file};
use crate::types::{ResourceEvent, ResourceKind, ResourceSnapshot};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Which resources are mirrored and where their files go
#[derive(Debug, Clone)]
pub struct MaterializeSettings {
    /// Label key that must be present on a resource
    pub label: String,
    /// Annotation overriding the destination directory
    pub folder_annotation: String,
    /// Destination directory when no override is present
    pub folder: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Materializer {
    settings: MaterializeSettings,
    resolver: ContentResolver,
    notifier: Notifier,
}

impl Materializer {
    pub fn new(settings: MaterializeSettings, resolver: ContentResolver, notifier: Notifier) -> Self {
        Self {
            settings,
            resolver,
            notifier,
        }
    }

    /// Destination directory for a selected resource with data, `None` when it is skipped
    fn destination_for(&self, kind: ResourceKind, resource: &ResourceSnapshot) -> Option<PathBuf> {
        if resource.labels.is_none() {
            debug!("{} {} has no labels, skipping", kind, resource.full_name());
            return None;
        }
        info!("Working on {} {}", kind, resource.full_name());

        if !resource.has_label(&self.settings.label) {
            debug!("{} {} lacks label {}, skipping", kind, resource.full_name(), self.settings.label);
            return None;
        }

        let destination = resource.destination(&self.settings.folder_annotation, &self.settings.folder);
        if destination != self.settings.folder {
            info!(
                "Found a folder override annotation, placing the {} in: {}",
                kind,
                destination.display()
            );
        }

        if resource.data.is_empty() {
            info!("{} {} does not have data", kind, resource.full_name());
            return None;
        }

        Some(destination)
    }

    /// Resolve and write one entry; failures are logged and reported as `false`
    async fn write_entry(
        &self,
        kind: ResourceKind,
        resource: &ResourceSnapshot,
        destination: &Path,
        key: &str,
        value: &[u8],
    ) -> bool {
        let resolved = match self.resolver.resolve(kind, key, value).await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(
                    "Failed to resolve key {} of {} {}: {}",
                    key,
                    kind,
                    resource.full_name(),
                    e
                );
                return false;
            }
        };

        match write_file(destination, &resolved.file_name, &resolved.content).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Failed to write key {} of {} {}: {}",
                    key,
                    kind,
                    resource.full_name(),
                    e
                );
                false
            }
        }
    }

    /// Remove the file belonging to one entry; a missing file still counts as handled
    async fn remove_entry(
        &self,
        kind: ResourceKind,
        resource: &ResourceSnapshot,
        destination: &Path,
        key: &str,
    ) -> bool {
        match remove_file(destination, file_name_for_key(key)).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Failed to remove key {} of {} {}: {}",
                    key,
                    kind,
                    resource.full_name(),
                    e
                );
                false
            }
        }
    }

    async fn notify(&self, kind: ResourceKind, resource: &ResourceSnapshot) {
        if let Err(e) = self.notifier.notify().await {
            warn!(
                "Notification after {} {} failed: {}",
                kind,
                resource.full_name(),
                e
            );
        }
    }

    /// Apply one watch event: write every entry on ADDED/MODIFIED, remove every
    /// entry on anything else, notifying once per handled entry.
    #[instrument(
        skip(self, event),
        fields(resource = %event.resource.full_name(), event = %event.event_type)
    )]
    pub async fn apply_event(&self, kind: ResourceKind, event: &ResourceEvent) {
        let resource = &event.resource;
        let Some(destination) = self.destination_for(kind, resource) else {
            return;
        };

        for (key, value) in &resource.data {
            info!("File in {} {} {}", kind, key, event.event_type);
            let handled = if event.event_type.is_upsert() {
                self.write_entry(kind, resource, &destination, key, value).await
            } else {
                self.remove_entry(kind, resource, &destination, key).await
            };
            if handled {
                self.notify(kind, resource).await;
            }
        }
    }

    /// Write every entry of a listed resource and notify once if anything was written.
    /// Returns whether the resource was materialized.
    #[instrument(skip(self, resource), fields(resource = %resource.full_name()))]
    pub async fn apply_snapshot(&self, kind: ResourceKind, resource: &ResourceSnapshot) -> bool {
        let Some(destination) = self.destination_for(kind, resource) else {
            return false;
        };

        let mut written = 0;
        for (key, value) in &resource.data {
            if self.write_entry(kind, resource, &destination, key, value).await {
                written += 1;
            }
        }

        if written == 0 {
            return false;
        }
        self.notify(kind, resource).await;
        true
    }
}
