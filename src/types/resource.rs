// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::ALL_NAMESPACES;
use crate::error::SyncError;

/// The cluster object type a watcher is responsible for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Secret,
    ConfigMap,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "secret",
            ResourceKind::ConfigMap => "configmap",
        }
    }

    /// Parse the `RESOURCE` selector: a single kind or `both`
    pub fn parse_selection(value: &str) -> Result<Vec<ResourceKind>, SyncError> {
        if value.trim().eq_ignore_ascii_case("both") {
            return Ok(vec![ResourceKind::Secret, ResourceKind::ConfigMap]);
        }
        Ok(vec![value.parse()?])
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secret" => Ok(ResourceKind::Secret),
            "configmap" | "config-map" => Ok(ResourceKind::ConfigMap),
            other => Err(SyncError::ConfigError(format!(
                "unknown resource kind '{}', expected secret, configmap or both",
                other
            ))),
        }
    }
}

/// Which namespaces list and watch calls cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    All,
    Namespace(String),
}

impl NamespaceScope {
    pub fn from_config(value: &str) -> Self {
        if value == ALL_NAMESPACES {
            NamespaceScope::All
        } else {
            NamespaceScope::Namespace(value.to_string())
        }
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::All => f.write_str("all namespaces"),
            NamespaceScope::Namespace(ns) => write!(f, "namespace {}", ns),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Added,
    Modified,
    Deleted,
}

impl EventType {
    /// Whether the event writes files; every other type removes them
    pub fn is_upsert(&self) -> bool {
        matches!(self, EventType::Added | EventType::Modified)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventType::Added => "ADDED",
            EventType::Modified => "MODIFIED",
            EventType::Deleted => "DELETED",
        })
    }
}

/// The parts of a config map or secret that drive materialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub namespace: Option<String>,
    pub name: String,
    /// `None` when the object carries no labels at all
    pub labels: Option<BTreeMap<String, String>>,
    pub annotations: BTreeMap<String, String>,
    pub data: BTreeMap<String, Vec<u8>>,
}

impl ResourceSnapshot {
    /// `namespace/name`, used as log context
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.namespace.as_deref().unwrap_or_default(), self.name)
    }

    /// Only the presence of the key matters, never its value
    pub fn has_label(&self, key: &str) -> bool {
        self.labels.as_ref().is_some_and(|l| l.contains_key(key))
    }

    /// Destination directory: the folder annotation if present, otherwise `root`
    pub fn destination(&self, folder_annotation: &str, root: &Path) -> PathBuf {
        self.annotations
            .get(folder_annotation)
            .map(PathBuf::from)
            .unwrap_or_else(|| root.to_path_buf())
    }
}

/// One observed change to a tracked resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEvent {
    pub event_type: EventType,
    pub resource: ResourceSnapshot,
}

impl ResourceEvent {
    pub fn new(event_type: EventType, resource: ResourceSnapshot) -> Self {
        Self {
            event_type,
            resource,
        }
    }
}
