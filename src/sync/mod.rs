// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mirroring of config maps and secrets onto the filesystem.

pub mod content;
pub mod files;
pub mod lister;
pub mod materializer;
pub mod supervisor;
pub mod watcher;

pub use content::{ContentResolver, ResolvedContent};
pub use lister::list_once;
pub use materializer::{MaterializeSettings, Materializer};
pub use supervisor::{Supervisor, WatcherHandle};
pub use watcher::ChangeWatcher;
