// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/ec2` operations.

use serde_json::Value;

use crate::client::{path_segment, CloudHealthClient};
use crate::error::ApiResult;
use crate::models::{force_refresh_query, CostEstimate, DateRange, InstanceSummary};

impl CloudHealthClient {
    pub async fn ec2_instances(&self, force_refresh: bool) -> ApiResult<Value> {
        self.get(
            "/ec2/instances",
            &force_refresh_query(force_refresh),
            "Failed to fetch EC2 instances",
        )
        .await
    }

    pub async fn ec2_instance(&self, instance_id: &str) -> ApiResult<Value> {
        self.get(
            &format!("/ec2/instances/{}", path_segment(instance_id)),
            &[],
            "Failed to fetch EC2 instance details",
        )
        .await
    }

    pub async fn ec2_instance_summary(&self) -> ApiResult<InstanceSummary> {
        self.get(
            "/ec2/instances/summary",
            &[],
            "Failed to fetch EC2 instance summary",
        )
        .await
    }

    /// CloudWatch metrics for one instance; the backend picks its default
    /// window when `range` is `None`.
    pub async fn ec2_instance_metrics(
        &self,
        instance_id: &str,
        range: Option<DateRange>,
    ) -> ApiResult<Value> {
        let query = range.map(|r| r.query()).unwrap_or_default();
        self.get(
            &format!("/ec2/instances/{}/metrics", path_segment(instance_id)),
            &query,
            "Failed to fetch EC2 instance metrics",
        )
        .await
    }

    pub async fn ec2_cost_estimate(&self) -> ApiResult<CostEstimate> {
        self.get("/ec2/cost-estimate", &[], "Failed to fetch cost estimate")
            .await
    }

    pub async fn ec2_regions(&self) -> ApiResult<Value> {
        self.get("/ec2/regions", &[], "Failed to fetch EC2 regions")
            .await
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    use crate::error::ErrorCode;
    use crate::models::DateRange;
    use crate::testing::{authenticated_session, MockBackend};

    #[tokio::test]
    async fn instances_forward_force_refresh() {
        let router = Router::new().route(
            "/ec2/instances",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({ "instances": [], "force_refresh": params.get("force_refresh") }))
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        let fresh = client.ec2_instances(true).await.unwrap();
        assert_eq!(fresh["force_refresh"], "true");

        let cached = client.ec2_instances(false).await.unwrap();
        assert_eq!(cached["force_refresh"], Value::Null);
    }

    #[tokio::test]
    async fn summary_is_typed() {
        let router = Router::new().route(
            "/ec2/instances/summary",
            get(|| async {
                Json(json!({"total_instances": 5, "by_state": {"running": 3, "stopped": 2}}))
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        let summary = client.ec2_instance_summary().await.unwrap();
        assert_eq!(summary.total_instances, 5);
        assert_eq!(summary.running(), 3);
    }

    #[tokio::test]
    async fn metrics_pass_instance_id_and_range() {
        let router = Router::new().route(
            "/ec2/instances/{id}/metrics",
            get(
                |Path(id): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({"id": id, "start": params.get("start_date"), "end": params.get("end_date")}))
                },
            ),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 7).unwrap(),
        )
        .unwrap();
        let metrics = client
            .ec2_instance_metrics("i-0abc", Some(range))
            .await
            .unwrap();
        assert_eq!(
            metrics,
            json!({"id": "i-0abc", "start": "2026-10-01", "end": "2026-10-07"})
        );
    }

    #[tokio::test]
    async fn missing_instance_uses_backend_detail() {
        let router = Router::new().route(
            "/ec2/instances/{id}",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Instance i-404 not found"})),
                )
            }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        let err = client.ec2_instance("i-404").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Instance i-404 not found");
    }

    #[tokio::test]
    async fn server_error_without_detail_uses_fallback() {
        let router = Router::new().route(
            "/ec2/cost-estimate",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let backend = MockBackend::start(router).await;
        let (session, _store) = authenticated_session("tok");
        let client = backend.client(session);

        let err = client.ec2_cost_estimate().await.unwrap_err();
        assert_eq!(err.message, "Failed to fetch cost estimate");
        assert_eq!(err.status, Some(500));
    }
}
