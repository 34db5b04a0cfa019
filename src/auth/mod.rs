// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side auth state for the Cloud Health backend.
//!
//! ## Auth Flow
//!
//! 1. Credentials are validated locally (key lengths) before any request
//! 2. `POST /auth/login` returns a bearer token and the account id
//! 3. Token, refresh token and profile are persisted to the local store
//! 4. Every request carries `Authorization: Bearer <token>`
//! 5. A 401 on any request clears the persisted session
//!
//! There is no refresh loop; expiry is handled reactively by the transport.

pub mod credentials;
pub mod session;

pub use credentials::AwsCredentials;
pub use session::{AuthSession, AuthSnapshot, AuthState, SessionManager, UserProfile};
