// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kube_file_sync::config::{Config, Mode};
use kube_file_sync::kubernetes::{create_client, resolve_scope, KubeSource};
use kube_file_sync::notify::{wait_for_endpoint, Notifier, RetryingClient, StatusFile};
use kube_file_sync::sync::{
    list_once, ChangeWatcher, ContentResolver, MaterializeSettings, Materializer, Supervisor,
};
use kube_file_sync::types::{NamespaceScope, ResourceKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let http = RetryingClient::new(config.http.clone())?;
    let notifier = Notifier::new(
        config.notify.clone(),
        http.clone(),
        Some(StatusFile::new(&config.status_file)),
    );
    notifier.initialize_status().await?;

    info!("Starting collector");
    info!(
        "Configuration loaded: label={}, folder={}, folder_annotation={}, resources={:?}",
        config.label,
        config.folder.display(),
        config.folder_annotation,
        config.resources
    );

    let client = create_client(config.skip_tls_verify).await?;
    let scope = resolve_scope(config.namespace.as_deref(), client.default_namespace());
    info!("Watching {}", scope);

    let materializer = Materializer::new(
        MaterializeSettings {
            label: config.label.clone(),
            folder_annotation: config.folder_annotation.clone(),
            folder: config.folder.clone(),
        },
        ContentResolver::new(http),
        notifier,
    );

    match config.mode {
        Mode::List => {
            for kind in &config.resources {
                sync_once(*kind, &client, &scope, &config.label, &materializer).await?;
            }
            info!("One-shot synchronization finished");
            Ok(())
        }
        Mode::Watch => {
            if let Some(url) = &config.notify.url {
                wait_for_endpoint(url.as_str(), config.http.timeout).await?;
            }

            let mut supervisor = Supervisor::new();
            for kind in &config.resources {
                let watcher_materializer = materializer.clone();
                match kind {
                    ResourceKind::Secret => supervisor.spawn(ChangeWatcher::new(
                        KubeSource::<Secret>::new(client.clone(), &scope, &config.label),
                        watcher_materializer,
                    )),
                    ResourceKind::ConfigMap => supervisor.spawn(ChangeWatcher::new(
                        KubeSource::<ConfigMap>::new(client.clone(), &scope, &config.label),
                        watcher_materializer,
                    )),
                }
            }

            Err(supervisor.run().await.into())
        }
    }
}

async fn sync_once(
    kind: ResourceKind,
    client: &Client,
    scope: &NamespaceScope,
    label: &str,
    materializer: &Materializer,
) -> Result<()> {
    match kind {
        ResourceKind::Secret => {
            list_once(&KubeSource::<Secret>::new(client.clone(), scope, label), materializer).await?
        }
        ResourceKind::ConfigMap => {
            list_once(&KubeSource::<ConfigMap>::new(client.clone(), scope, label), materializer)
                .await?
        }
    };
    Ok(())
}
