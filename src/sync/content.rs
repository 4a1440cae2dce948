// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns a data entry into a file name and the bytes to write.

use crate::constants::URL_SUFFIX;
use crate::error::{Result, SyncError};
use crate::notify::RetryingClient;
use crate::types::ResourceKind;
use tracing::{debug, instrument};

/// File name and content produced for one data entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Name of the file a data key maps to: the key itself, minus a trailing `.url`
pub fn file_name_for_key(key: &str) -> &str {
    key.strip_suffix(URL_SUFFIX).unwrap_or(key)
}

#[derive(Debug, Clone)]
pub struct ContentResolver {
    http: RetryingClient,
}

impl ContentResolver {
    pub fn new(http: RetryingClient) -> Self {
        Self { http }
    }

    /// Resolve one entry. Keys ending in `.url` are fetched: the value is the
    /// URL and the response body becomes the content.
    #[instrument(skip(self, value), fields(kind = %kind))]
    pub async fn resolve(&self, kind: ResourceKind, key: &str, value: &[u8]) -> Result<ResolvedContent> {
        let Some(file_name) = key.strip_suffix(URL_SUFFIX) else {
            return Ok(ResolvedContent {
                file_name: key.to_string(),
                content: value.to_vec(),
            });
        };

        if file_name.is_empty() {
            return Err(SyncError::InvalidContent {
                key: key.to_string(),
                reason: "key has no file name before the .url suffix".to_string(),
            });
        }

        let url = std::str::from_utf8(value)
            .map_err(|e| SyncError::InvalidContent {
                key: key.to_string(),
                reason: format!("{} value is not a UTF-8 URL: {}", kind, e),
            })?
            .trim();

        debug!("Fetching content for {} from {}", file_name, url);
        let response = self.http.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(ResolvedContent {
            file_name: file_name.to_string(),
            content: response.bytes().await?.to_vec(),
        })
    }
}
