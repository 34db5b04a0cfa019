// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/costexplorer` operations.

use serde_json::Value;

use crate::client::CloudHealthClient;
use crate::error::ApiResult;
use crate::models::{CostQuery, DateRange};

impl CloudHealthClient {
    pub async fn cost_and_usage(&self, query: &CostQuery) -> ApiResult<Value> {
        self.get(
            "/costexplorer/cost-and-usage",
            &query.query(),
            "Failed to fetch cost and usage data",
        )
        .await
    }

    pub async fn cost_by_service(&self, range: &DateRange) -> ApiResult<Value> {
        self.get(
            "/costexplorer/cost-by-service",
            &range.query(),
            "Failed to fetch cost by service",
        )
        .await
    }

    pub async fn cost_forecast(&self, range: &DateRange) -> ApiResult<Value> {
        self.get(
            "/costexplorer/forecast",
            &range.query(),
            "Failed to fetch cost forecast",
        )
        .await
    }

    pub async fn cost_summary(&self) -> ApiResult<Value> {
        self.get("/costexplorer/summary", &[], "Failed to fetch cost summary")
            .await
    }
}
