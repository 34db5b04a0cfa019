// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared HTTP transport for every API operation.
//!
//! - Attaches `Authorization: Bearer <token>` when a token is persisted
//! - Tags each request with a fresh `X-Request-Id`
//! - A 401 response expires the session before the error is returned
//! - Never retries

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::SessionManager;
use crate::config::ClientConfig;
use crate::error::{ErrorBody, TransportError};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub struct Transport {
    http: Client,
    base_url: String,
    session: SessionManager,
}

impl Transport {
    pub fn new(config: &ClientConfig, session: SessionManager) -> Result<Self, TransportError> {
        Self::with_timeout(&config.api_base_url, config.request_timeout, session)
    }

    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        session: SessionManager,
    ) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let request = self.request(Method::GET, path).query(query);
        self.send(Method::GET, path, request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(Method::POST, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(Method::POST, path, request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        debug!(method = %method, url = %self.url(path), "API request");

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, path, error = %e, "API request failed");
            TransportError::from(e)
        })?;

        let status = response.status();
        debug!(method = %method, path, status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            let body = ErrorBody::parse(&response.text().await.unwrap_or_default());
            if self.session.expire() {
                warn!(method = %method, path, "Backend returned 401, session cleared");
            }
            return Err(TransportError::Unauthorized { body });
        }

        if !status.is_success() {
            let body = ErrorBody::parse(&response.text().await.unwrap_or_default());
            return Err(TransportError::Status { status, body });
        }

        let bytes = response.bytes().await.map_err(TransportError::from)?;
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(payload)
            .map_err(|e| TransportError::Decode(format!("{method} {path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{authenticated_session, MockBackend};
    use axum::{http::HeaderMap, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn url_joins_without_double_slashes() {
        let session = SessionManager::restore(Arc::new(MemoryStore::new()));
        let transport =
            Transport::with_timeout("http://localhost:8000/api/v1/", Duration::from_secs(1), session)
                .unwrap();
        assert_eq!(
            transport.url("/ec2/instances"),
            "http://localhost:8000/api/v1/ec2/instances"
        );
        assert_eq!(
            transport.url("s3/buckets"),
            "http://localhost:8000/api/v1/s3/buckets"
        );
    }

    #[tokio::test]
    async fn attaches_bearer_and_request_id() {
        let router = Router::new().route(
            "/echo",
            get(|headers: HeaderMap| async move {
                Json(json!({
                    "authorization": headers.get("authorization").and_then(|v| v.to_str().ok()),
                    "request_id": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
                }))
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok-abc");
        let transport = backend.transport(session);

        let body: Value = transport.get("/echo", &[]).await.unwrap();
        assert_eq!(body["authorization"], "Bearer tok-abc");
        assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn anonymous_requests_have_no_authorization() {
        let router = Router::new().route(
            "/echo",
            get(|headers: HeaderMap| async move {
                Json(json!({ "has_auth": headers.contains_key("authorization") }))
            }),
        );
        let backend = MockBackend::start(router).await;
        let session = SessionManager::restore(Arc::new(MemoryStore::new()));
        let transport = backend.transport(session);

        let body: Value = transport.get("/echo", &[]).await.unwrap();
        assert_eq!(body["has_auth"], false);
    }

    #[tokio::test]
    async fn unauthorized_clears_session() {
        let router = Router::new().route(
            "/ec2/instances",
            get(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Token expired"})),
                )
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, store) = authenticated_session("tok-abc");
        let transport = backend.transport(session.clone());

        let err = transport
            .get::<Value>("/ec2/instances", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Unauthorized { .. }));
        assert!(!session.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn error_status_carries_parsed_body() {
        let router = Router::new().route(
            "/s3/buckets",
            get(|| async {
                (
                    axum::http::StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"detail": "S3 throttled", "code": "rate_limited"})),
                )
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let transport = backend.transport(session.clone());

        match transport.get::<Value>("/s3/buckets", &[]).await {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body.code.as_deref(), Some("rate_limited"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let session = SessionManager::restore(Arc::new(MemoryStore::new()));
        let transport =
            Transport::with_timeout("http://127.0.0.1:9", Duration::from_secs(2), session).unwrap();
        let err = transport.get::<Value>("/auth/me", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Network(_) | TransportError::Timeout
        ));
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_null() {
        let router = Router::new().route("/auth/logout", axum::routing::post(|| async { "" }));
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let transport = backend.transport(session);

        let body: Value = transport
            .post::<Value, Value>("/auth/logout", None)
            .await
            .unwrap();
        assert_eq!(body, Value::Null);
    }
}
