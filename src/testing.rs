// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test helpers: an in-process axum backend on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;

use crate::auth::SessionManager;
use crate::client::CloudHealthClient;
use crate::storage::{MemoryStore, ACCESS_TOKEN_KEY, USER_KEY};
use crate::transport::Transport;

pub(crate) const TEST_ACCOUNT_ID: &str = "123456789012";

/// Mock backend serving `router` under `/api/v1`.
pub(crate) struct MockBackend {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let app = Router::new().nest("/api/v1", router);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });
        Self {
            base_url: format!("http://{addr}/api/v1"),
            handle,
        }
    }

    pub fn transport(&self, session: SessionManager) -> Transport {
        Transport::with_timeout(&self.base_url, Duration::from_secs(5), session)
            .expect("transport")
    }

    pub fn client(&self, session: SessionManager) -> CloudHealthClient {
        CloudHealthClient::from_transport(self.transport(session))
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Session restored from a store that already holds `token` and a profile.
pub(crate) fn authenticated_session(token: &str) -> (SessionManager, Arc<MemoryStore>) {
    let profile = format!(
        r#"{{"account_id":"{TEST_ACCOUNT_ID}","region":"us-east-1","login_time":"2026-10-01T12:00:00Z"}}"#
    );
    let store = Arc::new(MemoryStore::with_entries([
        (ACCESS_TOKEN_KEY, token.to_string()),
        (USER_KEY, profile),
    ]));
    let session = SessionManager::restore(store.clone());
    (session, store)
}

pub(crate) fn anonymous_session() -> (SessionManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (SessionManager::restore(store.clone()), store)
}
