// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Outgoing HTTP: retrying client, reload notification, endpoint readiness.

pub mod http;
pub mod notifier;
pub mod readiness;

pub use http::RetryingClient;
pub use notifier::{NotificationState, Notifier, StatusFile};
pub use readiness::wait_for_endpoint;
