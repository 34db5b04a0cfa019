// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Error Model
//!
//! Every API operation returns [`ApiResult<T>`]. The transport rejects with a
//! [`TransportError`]; each operation normalizes that rejection into an
//! [`ApiError`] carrying a structured [`ErrorCode`] and a human-readable
//! message that is never empty.
//!
//! Backend error bodies look like `{"detail": "...", "code": "..."}`. The
//! `code` is matched exactly against [`ErrorCode`]; when it is missing the
//! HTTP status decides.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of every client operation.
pub type ApiResult<T> = Result<T, ApiError>;

/// Structured error classification shared with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidCredentials,
    SessionExpired,
    AccessDenied,
    NotFound,
    RateLimited,
    Validation,
    ServiceUnavailable,
    Network,
    Timeout,
    InvalidResponse,
    Storage,
    Cancelled,
    Unknown,
}

impl ErrorCode {
    /// Wire name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCredentials => "invalid_credentials",
            ErrorCode::SessionExpired => "session_expired",
            ErrorCode::AccessDenied => "access_denied",
            ErrorCode::NotFound => "not_found",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::Validation => "validation",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::Network => "network",
            ErrorCode::Timeout => "timeout",
            ErrorCode::InvalidResponse => "invalid_response",
            ErrorCode::Storage => "storage",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Unknown => "unknown",
        }
    }

    /// Exact match of a backend-provided code. Unknown codes yield `None`.
    pub fn from_backend(code: &str) -> Option<Self> {
        let code = match code {
            "invalid_credentials" => ErrorCode::InvalidCredentials,
            "session_expired" => ErrorCode::SessionExpired,
            "access_denied" => ErrorCode::AccessDenied,
            "not_found" => ErrorCode::NotFound,
            "rate_limited" => ErrorCode::RateLimited,
            "validation" => ErrorCode::Validation,
            "service_unavailable" => ErrorCode::ServiceUnavailable,
            "network" => ErrorCode::Network,
            "timeout" => ErrorCode::Timeout,
            "invalid_response" => ErrorCode::InvalidResponse,
            "storage" => ErrorCode::Storage,
            "cancelled" => ErrorCode::Cancelled,
            "unknown" => ErrorCode::Unknown,
            _ => return None,
        };
        Some(code)
    }

    /// Classification used when the backend sends no usable code.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 | 422 => ErrorCode::Validation,
            401 => ErrorCode::SessionExpired,
            403 => ErrorCode::AccessDenied,
            404 => ErrorCode::NotFound,
            408 => ErrorCode::Timeout,
            429 => ErrorCode::RateLimited,
            502..=504 => ErrorCode::ServiceUnavailable,
            _ => ErrorCode::Unknown,
        }
    }

    /// Display text for end users, selected by code.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCredentials => {
                "Invalid AWS credentials. Check your access key and secret key."
            }
            ErrorCode::SessionExpired => "Your session has expired. Please log in again.",
            ErrorCode::AccessDenied => {
                "Access denied. The credentials lack permission for this resource."
            }
            ErrorCode::NotFound => "The requested resource was not found.",
            ErrorCode::RateLimited => "Too many requests. Try again in a moment.",
            ErrorCode::Validation => "The request was rejected as invalid.",
            ErrorCode::ServiceUnavailable => "The backend service is currently unavailable.",
            ErrorCode::Network => "Unable to reach the backend. Check your connection.",
            ErrorCode::Timeout => "The backend did not respond in time.",
            ErrorCode::InvalidResponse => "The backend returned an unexpected response.",
            ErrorCode::Storage => "Local session storage failed.",
            ErrorCode::Cancelled => "The request was cancelled.",
            ErrorCode::Unknown => "An unexpected error occurred.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized error returned by every client operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// HTTP status when the failure came from a backend response.
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.friendly_message().to_string()
        } else {
            message
        };
        Self {
            code,
            message,
            status: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Request cancelled")
    }

    pub fn session_expired() -> Self {
        Self::new(ErrorCode::SessionExpired, "Session expired")
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16());
        self
    }

    /// Display text chosen by code, falling back to the raw message.
    pub fn display_message(&self) -> &str {
        match self.code {
            ErrorCode::Unknown => &self.message,
            code => code.friendly_message(),
        }
    }
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Parse a raw response body, tolerating non-JSON payloads.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Human-readable detail, if the body carried one.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().and_then(ErrorCode::from_backend)
    }
}

/// Rejection produced by the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("backend returned {status}")]
    Status { status: StatusCode, body: ErrorBody },

    #[error("backend rejected the session (401)")]
    Unauthorized { body: ErrorBody },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl TransportError {
    /// Normalize into an [`ApiError`], using `fallback` when the backend
    /// did not supply a detail message.
    pub fn into_api_error(self, fallback: &str) -> ApiError {
        match self {
            TransportError::Network(_) => ApiError::new(ErrorCode::Network, fallback),
            TransportError::Timeout => ApiError::new(ErrorCode::Timeout, fallback),
            TransportError::Decode(_) => ApiError::new(ErrorCode::InvalidResponse, fallback),
            TransportError::Unauthorized { body } => {
                let code = body.error_code().unwrap_or(ErrorCode::SessionExpired);
                let message = body.detail_message().unwrap_or_else(|| fallback.to_string());
                ApiError::new(code, message).with_status(StatusCode::UNAUTHORIZED)
            }
            TransportError::Status { status, body } => {
                let code = body
                    .error_code()
                    .unwrap_or_else(|| ErrorCode::from_status(status));
                let message = body.detail_message().unwrap_or_else(|| fallback.to_string());
                ApiError::new(code, message).with_status(status)
            }
        }
    }
}

/// Wire shape `{success, data | error}` used for machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl<T> From<ApiResult<T>> for Envelope<T> {
    fn from(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => Envelope {
                success: true,
                data: Some(data),
                error: None,
                code: None,
            },
            Err(err) => Envelope {
                success: false,
                data: None,
                error: Some(err.message),
                code: Some(err.code),
            },
        }
    }
}

impl From<crate::config::ConfigError> for ApiError {
    fn from(err: crate::config::ConfigError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<crate::storage::StoreError> for ApiError {
    fn from(err: crate::storage::StoreError) -> Self {
        ApiError::new(ErrorCode::Storage, err.to_string())
    }
}

impl From<crate::settings::SettingsError> for ApiError {
    fn from(err: crate::settings::SettingsError) -> Self {
        ApiError::new(ErrorCode::Storage, err.to_string())
    }
}
