// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Annotation keys recognised on synced resources
pub mod annotations {
    /// Default annotation redirecting a resource's files to another directory
    pub const DEFAULT_FOLDER: &str = "k8s-sidecar-target-directory";
}

/// Key suffix marking a value as a URL whose response body becomes the file content
pub const URL_SUFFIX: &str = ".url";

/// Namespace sentinel selecting every namespace
pub const ALL_NAMESPACES: &str = "ALL";

/// Default location of the reload status file
pub const DEFAULT_STATUS_FILE: &str = "/app/reload_successful.txt";

/// Supervisor liveness polling
pub mod supervisor {
    /// Seconds between watcher liveness checks
    pub const POLL_INTERVAL_SECS: u64 = 5;
}

/// Downstream readiness polling
pub mod readiness {
    /// Seconds between attempts to reach the notification endpoint
    pub const POLL_INTERVAL_SECS: u64 = 5;
}

/// HTTP retry defaults, each overridable from the environment
pub mod http {
    pub const RETRY_TOTAL: u32 = 5;
    pub const RETRY_CONNECT: u32 = 5;
    pub const RETRY_READ: u32 = 5;
    pub const RETRY_BACKOFF_FACTOR: f64 = 0.2;
    pub const TIMEOUT_SECS: f64 = 30.0;
    /// Upper bound for a single backoff sleep
    pub const BACKOFF_MAX_SECS: f64 = 120.0;
    /// Response statuses that are retried against the total budget
    pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];
}
