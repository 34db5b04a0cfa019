// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-resource operations on [`crate::client::CloudHealthClient`].
//!
//! | Module | Backend group |
//! |--------|---------------|
//! | `auth` | `/auth` |
//! | `ec2` | `/ec2` |
//! | `s3` | `/s3` |
//! | `guardduty` | `/guardduty` |
//! | `cost_explorer` | `/costexplorer` |
//! | `architecture` | `/architecture` |
//! | `settings` | `/settings` |

pub mod architecture;
pub mod auth;
pub mod cost_explorer;
pub mod ec2;
pub mod guardduty;
pub mod s3;
pub mod settings;
