// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request parameters and the response payloads the client renders. The
//! backend owns its schemas, so typed payloads keep unknown fields in
//! `extra` and every other endpoint is surfaced as raw JSON.
//!
//! ## Model Categories
//!
//! - **Auth**: login request/response
//! - **EC2**: instance summary and cost estimate
//! - **Queries**: date ranges, granularity and finding filters

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Auth Models
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'a str>,
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub account_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// =============================================================================
// EC2 Models
// =============================================================================

/// Payload of `GET /ec2/instances/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceSummary {
    #[serde(default)]
    pub total_instances: u64,
    /// Instance count keyed by state name (`running`, `stopped`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_state: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_type: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstanceSummary {
    pub fn count_in_state(&self, state: &str) -> u64 {
        self.by_state.get(state).copied().unwrap_or(0)
    }

    pub fn running(&self) -> u64 {
        self.count_in_state("running")
    }
}

/// Payload of `GET /ec2/cost-estimate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    #[serde(default)]
    pub total_monthly_cost: f64,
    /// ISO currency code when the backend sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_instance_type: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Inclusive date range, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Range rejects `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// The `days` days ending at `end`, or `None` when the start would fall
    /// outside the representable calendar.
    pub fn trailing_days(end: NaiveDate, days: u32) -> Option<Self> {
        let start = end.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self { start, end })
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_date", self.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// Cost Explorer aggregation granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    Hourly,
    #[default]
    Daily,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "HOURLY",
            Granularity::Daily => "DAILY",
            Granularity::Monthly => "MONTHLY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HOURLY" => Some(Granularity::Hourly),
            "DAILY" => Some(Granularity::Daily),
            "MONTHLY" => Some(Granularity::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of `GET /costexplorer/cost-and-usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostQuery {
    pub range: DateRange,
    pub granularity: Granularity,
}

impl CostQuery {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = self.range.query();
        params.push(("granularity", self.granularity.as_str().to_string()));
        params
    }
}

/// Filters for `GET /guardduty/findings`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingsFilter {
    pub severity: Option<String>,
    pub days: Option<u32>,
    pub force_refresh: bool,
}

impl FindingsFilter {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(severity) = &self.severity {
            params.push(("severity", severity.to_ascii_lowercase()));
        }
        if let Some(days) = self.days {
            params.push(("days", days.to_string()));
        }
        if self.force_refresh {
            params.push(("force_refresh", "true".to_string()));
        }
        params
    }
}

/// `force_refresh=true` when requested, nothing otherwise.
pub fn force_refresh_query(force_refresh: bool) -> Vec<(&'static str, String)> {
    if force_refresh {
        vec![("force_refresh", "true".to_string())]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instance_summary_keeps_unknown_fields() {
        let raw = json!({
            "total_instances": 5,
            "by_state": {"running": 3, "stopped": 2},
            "last_scan": "2026-10-01T00:00:00Z"
        });
        let summary: InstanceSummary = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(summary.total_instances, 5);
        assert_eq!(summary.running(), 3);
        assert_eq!(summary.count_in_state("terminated"), 0);
        assert_eq!(serde_json::to_value(&summary).unwrap(), raw);
    }

    #[test]
    fn cost_estimate_does_not_invent_fields() {
        let raw = json!({"total_monthly_cost": 12.5});
        let estimate: CostEstimate = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(estimate.currency, None);
        assert_eq!(serde_json::to_value(&estimate).unwrap(), raw);
    }

    #[test]
    fn login_response_defaults_token_type() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "access_token": "tok",
            "account_id": "123456789012"
        }))
        .unwrap();
        assert_eq!(resp.token_type, "bearer");
        assert_eq!(resp.refresh_token, None);
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let a = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(DateRange::new(a, b).is_none());
        assert!(DateRange::new(b, a).is_some());
    }

    #[test]
    fn trailing_days_outside_calendar_is_none() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(DateRange::trailing_days(end, 200_000_000).is_none());
        let week = DateRange::trailing_days(end, 7).unwrap();
        assert_eq!(week.start, NaiveDate::from_ymd_opt(2026, 10, 11).unwrap());
    }

    #[test]
    fn cost_query_parameters() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let query = CostQuery {
            range: DateRange::trailing_days(end, 30).unwrap(),
            granularity: Granularity::Monthly,
        };
        assert_eq!(
            query.query(),
            vec![
                ("start_date", "2026-09-18".to_string()),
                ("end_date", "2026-10-18".to_string()),
                ("granularity", "MONTHLY".to_string()),
            ]
        );
    }

    #[test]
    fn findings_filter_only_sends_set_fields() {
        assert!(FindingsFilter::default().query().is_empty());
        let filter = FindingsFilter {
            severity: Some("HIGH".into()),
            days: Some(7),
            force_refresh: true,
        };
        assert_eq!(
            filter.query(),
            vec![
                ("severity", "high".to_string()),
                ("days", "7".to_string()),
                ("force_refresh", "true".to_string()),
            ]
        );
    }

    #[test]
    fn granularity_parse() {
        assert_eq!(Granularity::parse("daily"), Some(Granularity::Daily));
        assert_eq!(Granularity::parse("weekly"), None);
    }
}
