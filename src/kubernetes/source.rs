// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! List and watch access to the tracked resource kinds.

use crate::error::Result;
use crate::types::{EventType, NamespaceScope, ResourceEvent, ResourceKind, ResourceSnapshot};
use futures::future::ready;
use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use tracing::instrument;

/// Stream of change events; errors are classified by the consumer
pub type EventStream = BoxStream<'static, std::result::Result<ResourceEvent, watcher::Error>>;

/// Snapshot and change feed for one resource kind
pub trait ResourceSource: Send + Sync + 'static {
    fn kind(&self) -> ResourceKind;

    /// Enumerate every instance currently in scope
    fn list(&self) -> impl Future<Output = Result<Vec<ResourceSnapshot>>> + Send;

    /// Open a change feed. Existing instances are delivered as ADDED first.
    fn watch(&self) -> EventStream;
}

/// A k8s-openapi type that can be mirrored to files
pub trait TrackedObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    const KIND: ResourceKind;

    fn into_snapshot(self) -> ResourceSnapshot;
}

impl TrackedObject for ConfigMap {
    const KIND: ResourceKind = ResourceKind::ConfigMap;

    fn into_snapshot(self) -> ResourceSnapshot {
        ResourceSnapshot {
            namespace: self.metadata.namespace,
            name: self.metadata.name.unwrap_or_default(),
            labels: self.metadata.labels,
            annotations: self.metadata.annotations.unwrap_or_default(),
            data: self
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect(),
        }
    }
}

impl TrackedObject for Secret {
    const KIND: ResourceKind = ResourceKind::Secret;

    /// `ByteString` values are already base64-decoded by deserialization
    fn into_snapshot(self) -> ResourceSnapshot {
        ResourceSnapshot {
            namespace: self.metadata.namespace,
            name: self.metadata.name.unwrap_or_default(),
            labels: self.metadata.labels,
            annotations: self.metadata.annotations.unwrap_or_default(),
            data: self
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.0))
                .collect(),
        }
    }
}

/// Translate a watcher event; bookkeeping markers carry no object
fn to_resource_event<K: TrackedObject>(event: watcher::Event<K>) -> Option<ResourceEvent> {
    match event {
        watcher::Event::InitApply(obj) => Some(ResourceEvent::new(EventType::Added, obj.into_snapshot())),
        watcher::Event::Apply(obj) => Some(ResourceEvent::new(EventType::Modified, obj.into_snapshot())),
        watcher::Event::Delete(obj) => Some(ResourceEvent::new(EventType::Deleted, obj.into_snapshot())),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}

/// API-server backed source for one k8s-openapi type.
///
/// The label key is also sent as an existence selector so the server only
/// returns candidates.
pub struct KubeSource<K: TrackedObject> {
    api: Api<K>,
    label: String,
}

impl<K: TrackedObject> KubeSource<K> {
    pub fn new(client: Client, scope: &NamespaceScope, label: &str) -> Self {
        let api = match scope {
            NamespaceScope::All => Api::all(client),
            NamespaceScope::Namespace(ns) => Api::namespaced(client, ns),
        };
        Self {
            api,
            label: label.to_string(),
        }
    }
}

impl<K: TrackedObject> ResourceSource for KubeSource<K> {
    fn kind(&self) -> ResourceKind {
        K::KIND
    }

    #[instrument(skip(self), fields(kind = %K::KIND))]
    async fn list(&self) -> Result<Vec<ResourceSnapshot>> {
        let list = self
            .api
            .list(&ListParams::default().labels(&self.label))
            .await?;
        Ok(list.items.into_iter().map(K::into_snapshot).collect())
    }

    fn watch(&self) -> EventStream {
        let config = watcher::Config::default().labels(&self.label);
        watcher(self.api.clone(), config)
            .default_backoff()
            .filter_map(|item| ready(item.map(to_resource_event::<K>).transpose()))
            .boxed()
    }
}
