// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plain-text rendering of the dashboard for terminal output.

use std::fmt;

use serde::Serialize;

use super::dataset::{DashboardDataset, DashboardState};
use super::placeholder::{AlertSeverity, ServiceHealth};

const NOT_LOADED: &str = "--";

/// One headline figure on the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub detail: String,
    /// Built from sample data rather than a backend response.
    pub sample: bool,
}

pub fn metric_cards(data: &DashboardDataset) -> Vec<MetricCard> {
    let instances = match &data.instance_summary {
        Some(summary) => MetricCard {
            title: "EC2 Instances",
            value: summary.total_instances.to_string(),
            detail: format!("{} running", summary.running()),
            sample: false,
        },
        None => not_loaded("EC2 Instances", false),
    };

    let cost = match &data.cost_estimate {
        Some(estimate) => MetricCard {
            title: "Monthly Cost",
            value: format_cost(estimate.total_monthly_cost, estimate.currency.as_deref()),
            detail: "estimated".to_string(),
            sample: false,
        },
        None => not_loaded("Monthly Cost", false),
    };

    let alerts = match &data.alerts {
        Some(alerts) => {
            let critical = alerts
                .iter()
                .filter(|a| a.severity == AlertSeverity::Critical)
                .count();
            MetricCard {
                title: "Active Alerts",
                value: alerts.len().to_string(),
                detail: format!("{critical} critical"),
                sample: true,
            }
        }
        None => not_loaded("Active Alerts", true),
    };

    let services = match &data.service_statuses {
        Some(services) => {
            let healthy = services
                .iter()
                .filter(|s| s.health == ServiceHealth::Healthy)
                .count();
            MetricCard {
                title: "Services",
                value: format!("{healthy}/{}", services.len()),
                detail: "healthy".to_string(),
                sample: true,
            }
        }
        None => not_loaded("Services", true),
    };

    vec![instances, cost, alerts, services]
}

fn not_loaded(title: &'static str, sample: bool) -> MetricCard {
    MetricCard {
        title,
        value: NOT_LOADED.to_string(),
        detail: String::new(),
        sample,
    }
}

/// Dollar sign unless the backend named another currency.
fn format_cost(amount: f64, currency: Option<&str>) -> String {
    match currency {
        None | Some("") | Some("USD") => format!("${amount:.2}"),
        Some(other) => format!("{amount:.2} {other}"),
    }
}

/// Render the full overview. Sample panels are marked `(sample)`.
pub fn render_text(state: &DashboardState) -> String {
    DashboardView(state).to_string()
}

/// Terminal layout of a [`DashboardState`].
pub struct DashboardView<'a>(pub &'a DashboardState);

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "AWS Cloud Health Dashboard")?;

        if let Some(error) = &state.error {
            writeln!(f, "Error: {}", error.display_message())?;
        }
        if state.loading {
            writeln!(f, "Refreshing...")?;
        }
        writeln!(f)?;

        for card in metric_cards(&state.data) {
            let marker = if card.sample { " (sample)" } else { "" };
            if card.detail.is_empty() {
                writeln!(f, "  {:<14} {}{marker}", card.title, card.value)?;
            } else {
                writeln!(
                    f,
                    "  {:<14} {} ({}){marker}",
                    card.title, card.value, card.detail
                )?;
            }
        }

        if let Some(services) = &state.data.service_statuses {
            writeln!(f, "\nService health (sample)")?;
            for service in services {
                let health = match service.health {
                    ServiceHealth::Healthy => "healthy",
                    ServiceHealth::Degraded => "degraded",
                    ServiceHealth::Down => "down",
                };
                writeln!(
                    f,
                    "  {:<12} {:<9} {:.2}%",
                    service.name, health, service.uptime_percent
                )?;
            }
        }

        if let Some(alerts) = &state.data.alerts {
            writeln!(f, "\nRecent alerts (sample)")?;
            for alert in alerts {
                let severity = match alert.severity {
                    AlertSeverity::Critical => "CRITICAL",
                    AlertSeverity::Warning => "WARNING",
                    AlertSeverity::Info => "INFO",
                };
                writeln!(f, "  [{severity}] {}: {}", alert.service, alert.message)?;
            }
        }

        match state.last_updated {
            Some(at) => writeln!(f, "\nLast updated: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => writeln!(f, "\nLast updated: never"),
        }
    }
}
