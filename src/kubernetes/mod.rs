// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and resource access.

pub mod client;
pub mod source;

pub use client::{create_client, resolve_scope};
pub use source::{EventStream, KubeSource, ResourceSource, TrackedObject};
