// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed client for the Cloud Health backend.
//!
//! Operations are grouped by resource in [`crate::api`]; each issues one
//! HTTP call through the shared [`Transport`] and normalizes any rejection
//! with its own fallback message.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::SessionManager;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::transport::Transport;

pub struct CloudHealthClient {
    transport: Transport,
}

impl CloudHealthClient {
    pub fn new(config: &ClientConfig, session: SessionManager) -> ApiResult<Self> {
        let transport = Transport::new(config, session)
            .map_err(|e| e.into_api_error("Failed to initialize HTTP client"))?;
        Ok(Self::from_transport(transport))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn session(&self) -> &SessionManager {
        self.transport.session()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        fallback: &str,
    ) -> ApiResult<T> {
        self.transport
            .get(path, query)
            .await
            .map_err(|e| e.into_api_error(fallback))
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: Option<&B>, fallback: &str) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.transport
            .post(path, body)
            .await
            .map_err(|e| e.into_api_error(fallback))
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B, fallback: &str) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.transport
            .put(path, body)
            .await
            .map_err(|e| e.into_api_error(fallback))
    }
}

/// Percent-encode a single path segment (instance ids, bucket names).
pub(crate) fn path_segment(raw: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment.invalid/") else {
        return raw.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(path_segment("i-0abc123"), "i-0abc123");
        assert_eq!(path_segment("my bucket/logs"), "my%20bucket%2Flogs");
    }
}
