// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/s3` operations.

use serde_json::Value;

use crate::client::{path_segment, CloudHealthClient};
use crate::error::ApiResult;
use crate::models::force_refresh_query;

impl CloudHealthClient {
    pub async fn s3_buckets(&self, force_refresh: bool) -> ApiResult<Value> {
        self.get(
            "/s3/buckets",
            &force_refresh_query(force_refresh),
            "Failed to fetch S3 buckets",
        )
        .await
    }

    pub async fn s3_bucket(&self, bucket: &str) -> ApiResult<Value> {
        self.get(
            &format!("/s3/buckets/{}", path_segment(bucket)),
            &[],
            "Failed to fetch S3 bucket details",
        )
        .await
    }

    pub async fn s3_bucket_metrics(&self, bucket: &str) -> ApiResult<Value> {
        self.get(
            &format!("/s3/buckets/{}/metrics", path_segment(bucket)),
            &[],
            "Failed to fetch S3 bucket metrics",
        )
        .await
    }

    pub async fn s3_summary(&self) -> ApiResult<Value> {
        self.get("/s3/summary", &[], "Failed to fetch S3 summary")
            .await
    }
}
