// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/settings` operations (server-side copy of the dashboard settings).
//!
//! The backend owns this document, so it travels as raw JSON and keys the
//! client does not know about survive a read-modify-write.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::CloudHealthClient;
use crate::error::{ApiError, ApiResult, ErrorCode};

impl CloudHealthClient {
    pub async fn remote_settings(&self) -> ApiResult<Value> {
        self.get("/settings", &[], "Failed to fetch settings").await
    }

    pub async fn update_remote_settings<S>(&self, settings: &S) -> ApiResult<Value>
    where
        S: Serialize + ?Sized,
    {
        self.put("/settings", settings, "Failed to save settings")
            .await
    }

    pub async fn reset_remote_settings(&self) -> ApiResult<Value> {
        self.post::<Value, _>("/settings/reset", None, "Failed to reset settings")
            .await
    }

    /// Fetch the backend document, overwrite only `changes` and save it back.
    pub async fn patch_remote_settings(&self, changes: Map<String, Value>) -> ApiResult<Value> {
        let mut document = self.remote_settings().await?;
        let Some(fields) = document.as_object_mut() else {
            return Err(ApiError::new(
                ErrorCode::InvalidResponse,
                "Backend settings are not a JSON object",
            ));
        };
        fields.extend(changes);
        self.update_remote_settings(&document).await
    }
}
