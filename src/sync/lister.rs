// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One-shot synchronization of every matching resource.

use crate::error::Result;
use crate::kubernetes::ResourceSource;
use crate::sync::materializer::Materializer;
use tracing::{info, instrument};

/// List every instance of the source's kind and materialize the selected ones.
/// Returns how many resources were written.
#[instrument(skip(source, materializer), fields(kind = %source.kind()))]
pub async fn list_once<S: ResourceSource>(source: &S, materializer: &Materializer) -> Result<usize> {
    let kind = source.kind();
    let resources = source.list().await?;
    info!("Found {} {} resources", resources.len(), kind);

    let mut synced = 0;
    for resource in &resources {
        if materializer.apply_snapshot(kind, resource).await {
            synced += 1;
        }
    }

    info!("Synced {} {} resources", synced, kind);
    Ok(synced)
}
