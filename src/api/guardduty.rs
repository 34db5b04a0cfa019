// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/guardduty` operations.

use serde_json::Value;

use crate::client::{path_segment, CloudHealthClient};
use crate::error::ApiResult;
use crate::models::FindingsFilter;

impl CloudHealthClient {
    pub async fn guardduty_findings(&self, filter: &FindingsFilter) -> ApiResult<Value> {
        self.get(
            "/guardduty/findings",
            &filter.query(),
            "Failed to fetch GuardDuty findings",
        )
        .await
    }

    pub async fn guardduty_finding(&self, finding_id: &str) -> ApiResult<Value> {
        self.get(
            &format!("/guardduty/findings/{}", path_segment(finding_id)),
            &[],
            "Failed to fetch GuardDuty finding",
        )
        .await
    }

    pub async fn guardduty_summary(&self) -> ApiResult<Value> {
        self.get(
            "/guardduty/summary",
            &[],
            "Failed to fetch GuardDuty summary",
        )
        .await
    }

    pub async fn guardduty_detectors(&self) -> ApiResult<Value> {
        self.get(
            "/guardduty/detectors",
            &[],
            "Failed to fetch GuardDuty detectors",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    use crate::error::ErrorCode;
    use crate::models::FindingsFilter;
    use crate::testing::{authenticated_session, MockBackend};

    #[tokio::test]
    async fn findings_send_filters() {
        let router = Router::new().route(
            "/guardduty/findings",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({"severity": params.get("severity"), "days": params.get("days")}))
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        let filter = FindingsFilter {
            severity: Some("HIGH".into()),
            days: Some(30),
            force_refresh: false,
        };
        let body = client.guardduty_findings(&filter).await.unwrap();
        assert_eq!(body, json!({"severity": "high", "days": "30"}));
    }

    #[tokio::test]
    async fn disabled_detector_maps_backend_code() {
        let router = Router::new().route(
            "/guardduty/summary",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"detail": "GuardDuty is not enabled", "code": "access_denied"})),
                )
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session.clone());

        let err = client.guardduty_summary().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);
        assert_eq!(err.message, "GuardDuty is not enabled");
        assert!(session.is_authenticated());
    }
}
