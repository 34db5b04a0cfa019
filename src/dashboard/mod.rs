// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dashboard data: aggregation, sample panels and text rendering.

pub mod aggregator;
pub mod dataset;
pub mod placeholder;
pub mod render;

pub use aggregator::{CycleOutcome, DashboardAggregator, DashboardSource};
pub use dataset::{DashboardDataset, DashboardState, LiveData};
pub use render::{metric_cards, render_text, DashboardView, MetricCard};
