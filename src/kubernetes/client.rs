// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation

use crate::error::{Result, SyncError};
use crate::types::NamespaceScope;
use kube::{Client, Config as KConfig};
use tracing::{info, warn};

/// Create a client from the in-cluster service account or the local kubeconfig
pub async fn create_client(skip_tls_verify: bool) -> Result<Client> {
    let mut config = KConfig::infer()
        .await
        .map_err(|e| SyncError::ConfigError(format!("Failed to infer Kubernetes config: {}", e)))?;

    if skip_tls_verify {
        warn!("SKIP_TLS_VERIFY is set, not verifying the API server certificate");
        config.accept_invalid_certs = true;
    }

    let client = Client::try_from(config)?;
    info!(
        "Config for cluster API loaded, default namespace is {}",
        client.default_namespace()
    );
    Ok(client)
}

/// The configured namespace, or the client's own namespace when none was given
pub fn resolve_scope(configured: Option<&str>, default_namespace: &str) -> NamespaceScope {
    NamespaceScope::from_config(configured.unwrap_or(default_namespace))
}
