// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/architecture` operations: health score and recommendations.

use serde_json::Value;

use crate::client::CloudHealthClient;
use crate::error::ApiResult;

impl CloudHealthClient {
    pub async fn architecture_health(&self) -> ApiResult<Value> {
        self.get(
            "/architecture/health",
            &[],
            "Failed to fetch architecture health",
        )
        .await
    }

    pub async fn architecture_recommendations(&self) -> ApiResult<Value> {
        self.get(
            "/architecture/recommendations",
            &[],
            "Failed to fetch architecture recommendations",
        )
        .await
    }

    /// Ask the backend to re-run its analysis.
    pub async fn analyze_architecture(&self) -> ApiResult<Value> {
        self.post::<Value, _>(
            "/architecture/analyze",
            None,
            "Failed to analyze architecture",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    use crate::testing::{authenticated_session, MockBackend};

    #[tokio::test]
    async fn health_and_analyze() {
        let router = Router::new()
            .route(
                "/architecture/health",
                get(|| async { Json(json!({"score": 82, "grade": "B"})) }),
            )
            .route(
                "/architecture/analyze",
                post(|| async { Json(json!({"status": "queued"})) }),
            );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        assert_eq!(
            client.architecture_health().await.unwrap(),
            json!({"score": 82, "grade": "B"})
        );
        assert_eq!(
            client.analyze_architecture().await.unwrap(),
            json!({"status": "queued"})
        );
    }
}
