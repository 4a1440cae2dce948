// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kind-neutral views of the cluster objects being mirrored.

pub mod resource;

pub use resource::{EventType, NamespaceScope, ResourceEvent, ResourceKind, ResourceSnapshot};
