// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static sample datasets for dashboard panels that no backend endpoint
//! serves yet. Anything built from this module is sample data and is
//! labelled as such when rendered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    /// Wall-clock label, `HH:MM`.
    pub time: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub network_mbps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u32,
    pub severity: AlertSeverity,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    Healthy,
    Degraded,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub health: ServiceHealth,
    pub uptime_percent: f64,
}

pub fn performance_series() -> Vec<PerformancePoint> {
    [
        ("00:00", 32.0, 48.0, 120.0),
        ("04:00", 28.0, 45.0, 95.0),
        ("08:00", 55.0, 62.0, 210.0),
        ("12:00", 71.0, 68.0, 340.0),
        ("16:00", 64.0, 66.0, 295.0),
        ("20:00", 45.0, 55.0, 180.0),
    ]
    .into_iter()
    .map(|(time, cpu, memory, network)| PerformancePoint {
        time: time.to_string(),
        cpu_percent: cpu,
        memory_percent: memory,
        network_mbps: network,
    })
    .collect()
}

pub fn alerts() -> Vec<Alert> {
    vec![
        Alert {
            id: 1,
            severity: AlertSeverity::Critical,
            service: "EC2".to_string(),
            message: "High CPU utilization on production web tier".to_string(),
        },
        Alert {
            id: 2,
            severity: AlertSeverity::Warning,
            service: "S3".to_string(),
            message: "Bucket without server-side encryption".to_string(),
        },
        Alert {
            id: 3,
            severity: AlertSeverity::Info,
            service: "RDS".to_string(),
            message: "Maintenance window scheduled".to_string(),
        },
    ]
}

pub fn service_statuses() -> Vec<ServiceStatus> {
    [
        ("EC2", ServiceHealth::Healthy, 99.98),
        ("S3", ServiceHealth::Healthy, 99.99),
        ("RDS", ServiceHealth::Degraded, 99.2),
        ("Lambda", ServiceHealth::Healthy, 99.95),
        ("CloudFront", ServiceHealth::Healthy, 100.0),
    ]
    .into_iter()
    .map(|(name, health, uptime)| ServiceStatus {
        name: name.to_string(),
        health,
        uptime_percent: uptime,
    })
    .collect()
}
