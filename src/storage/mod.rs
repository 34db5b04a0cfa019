// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client-Side Storage
//!
//! A small string key/value store holding the persisted session and local
//! settings. [`MemoryStore`] backs tests and throwaway runs; [`RedbStore`]
//! persists to `client.redb` in the data directory.
//!
//! ## Keys
//!
//! ```text
//! access_token         # bearer token
//! user                 # JSON UserProfile
//! refresh_token        # optional, persisted but never used
//! dashboard_settings   # JSON DashboardSettings
//! ```

pub mod local_db;
pub mod memory;

pub use local_db::RedbStore;
pub use memory::MemoryStore;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const SETTINGS_KEY: &str = "dashboard_settings";

/// Keys owned by the auth session.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, USER_KEY, REFRESH_TOKEN_KEY];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Synchronous string key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}
