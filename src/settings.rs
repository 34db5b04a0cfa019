// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Dashboard Settings
//!
//! [`DashboardSettings`] is kept locally under the `dashboard_settings` key.
//! Every field has a default, so a partial or empty document loads with all
//! keys present. Keys this client does not know are carried in `extra`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::storage::{KeyValueStore, StoreError, SETTINGS_KEY};

const REFRESH_INTERVAL_FIELD: &str = "refresh_interval_secs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email: bool,
    pub slack: bool,
    /// Only notify for high/critical findings.
    pub critical_only: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            slack: false,
            critical_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "last_24_hours")]
    Last24Hours,
    #[default]
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
}

impl TimeRange {
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Last24Hours => 1,
            TimeRange::Last7Days => 7,
            TimeRange::Last30Days => 30,
            TimeRange::Last90Days => 90,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub notifications: NotificationSettings,
    pub refresh_interval_secs: u64,
    pub default_time_range: TimeRange,
    pub session_timeout_minutes: u32,
    pub theme: Theme,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            notifications: NotificationSettings::default(),
            refresh_interval_secs: 300,
            default_time_range: TimeRange::default(),
            session_timeout_minutes: 60,
            theme: Theme::default(),
            extra: Map::new(),
        }
    }
}

impl DashboardSettings {
    /// Refresh interval, with zero treated as the default.
    pub fn refresh_interval(&self) -> Duration {
        if self.refresh_interval_secs == 0 {
            Duration::from_secs(Self::default().refresh_interval_secs)
        } else {
            Duration::from_secs(self.refresh_interval_secs)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("settings serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Settings persisted in the local key/value store.
pub struct LocalSettings {
    store: Arc<dyn KeyValueStore>,
}

impl LocalSettings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored settings, or defaults when missing or unreadable.
    pub fn load(&self) -> DashboardSettings {
        match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored settings are corrupt, using defaults");
                DashboardSettings::default()
            }),
            Ok(None) => DashboardSettings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored settings, using defaults");
                DashboardSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &DashboardSettings) -> Result<(), SettingsError> {
        let json = serde_json::to_string(settings)?;
        self.store.set(SETTINGS_KEY, &json)?;
        Ok(())
    }

    /// Apply `change` to the current settings and persist the result.
    pub fn update<F>(&self, change: F) -> Result<DashboardSettings, SettingsError>
    where
        F: FnOnce(&mut DashboardSettings),
    {
        let mut settings = self.load();
        change(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Saved refresh interval, or `fallback` unless the stored document
    /// explicitly carries a positive `refresh_interval_secs`.
    pub fn refresh_interval_or(&self, fallback: Duration) -> Duration {
        let Ok(Some(raw)) = self.store.get(SETTINGS_KEY) else {
            return fallback;
        };
        serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|doc| doc.get(REFRESH_INTERVAL_FIELD).and_then(Value::as_u64))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(fallback)
    }

    pub fn reset(&self) -> Result<DashboardSettings, SettingsError> {
        self.store.remove(SETTINGS_KEY)?;
        Ok(DashboardSettings::default())
    }
}
