// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cloud Health - AWS monitoring dashboard client
//!
//! Typed async client for the Cloud Health backend REST API, the session
//! state it depends on, and the dashboard aggregation used by the
//! `cloud-health` terminal frontend.
//!
//! ## Modules
//!
//! - `api` - Per-resource backend operations on [`client::CloudHealthClient`]
//! - `auth` - AWS credential validation and the persisted login session
//! - `dashboard` - Concurrent refresh, sample panels and text rendering
//! - `storage` - Key/value persistence (in-memory or redb)
//! - `transport` - HTTP plumbing (bearer auth, 401 handling, error bodies)

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod settings;
pub mod storage;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::CloudHealthClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
