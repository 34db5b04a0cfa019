// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{CostEstimate, InstanceSummary};

use super::placeholder::{self, Alert, PerformancePoint, ServiceStatus};

/// Everything the dashboard displays. `None` means not loaded yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardDataset {
    pub instance_summary: Option<InstanceSummary>,
    pub cost_estimate: Option<CostEstimate>,
    /// Sample data.
    pub performance: Option<Vec<PerformancePoint>>,
    /// Sample data.
    pub alerts: Option<Vec<Alert>>,
    /// Sample data.
    pub service_statuses: Option<Vec<ServiceStatus>>,
}

/// Results of the endpoint-backed fetches of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveData {
    pub instance_summary: InstanceSummary,
    pub cost_estimate: CostEstimate,
}

impl DashboardDataset {
    /// Replace the live payloads and fill in the sample panels.
    pub fn merge(&mut self, live: LiveData) {
        self.instance_summary = Some(live.instance_summary);
        self.cost_estimate = Some(live.cost_estimate);
        self.performance = Some(placeholder::performance_series());
        self.alerts = Some(placeholder::alerts());
        self.service_statuses = Some(placeholder::service_statuses());
    }

    pub fn is_loaded(&self) -> bool {
        self.instance_summary.is_some() && self.cost_estimate.is_some()
    }
}

/// Aggregator state published to views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub data: DashboardDataset,
    /// True while any refresh cycle is in flight.
    pub loading: bool,
    pub error: Option<ApiError>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Generation of the last committed cycle.
    pub generation: u64,
}
