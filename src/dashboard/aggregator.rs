// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Dashboard Aggregator
//!
//! Fetches the endpoint-backed dashboard data concurrently, merges it with
//! the sample panels and publishes one [`DashboardState`] on a `watch`
//! channel.
//!
//! ## Cycle Rules
//!
//! - Both fetches are issued together and the result is committed only
//!   after both settle. Any failure fails the cycle and leaves the last
//!   committed data in place.
//! - Every cycle takes a fresh generation. A cycle finishing after a newer
//!   one has committed is discarded, so a slow automatic refresh cannot
//!   overwrite a manual one.
//! - Cycles run under a cancellation scope tied to the authenticated
//!   session. Logout, session expiry and shutdown drop in-flight requests.
//!
//! ## Auto-refresh
//!
//! [`DashboardAggregator::run`] waits for an authenticated session, runs
//! one cycle immediately and then one per `refresh_interval`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{AuthSnapshot, SessionManager};
use crate::client::CloudHealthClient;
use crate::config::DEFAULT_REFRESH_INTERVAL;
use crate::error::{ApiError, ApiResult};
use crate::models::{CostEstimate, InstanceSummary};

use super::dataset::{DashboardState, LiveData};

/// The endpoint-backed fetches of one cycle.
pub trait DashboardSource: Send + Sync {
    fn instance_summary(&self) -> impl Future<Output = ApiResult<InstanceSummary>> + Send;
    fn cost_estimate(&self) -> impl Future<Output = ApiResult<CostEstimate>> + Send;
}

impl DashboardSource for CloudHealthClient {
    fn instance_summary(&self) -> impl Future<Output = ApiResult<InstanceSummary>> + Send {
        self.ec2_instance_summary()
    }

    fn cost_estimate(&self) -> impl Future<Output = ApiResult<CostEstimate>> + Send {
        self.ec2_cost_estimate()
    }
}

/// How a single refresh cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Committed { generation: u64 },
    Failed { generation: u64, error: ApiError },
    /// A newer cycle had already committed; results dropped.
    Stale { generation: u64 },
    Cancelled { generation: u64 },
    /// No authenticated session, nothing fetched.
    Unauthenticated,
}

pub struct DashboardAggregator<S> {
    source: Arc<S>,
    session: SessionManager,
    refresh_interval: Duration,
    state: watch::Sender<DashboardState>,
    next_generation: AtomicU64,
    in_flight: AtomicUsize,
    scope: Mutex<CycleScope>,
}

/// Cancellation for in-flight cycles. `current` is always a child of
/// `parent`, which becomes the shutdown token once `run` starts.
struct CycleScope {
    parent: CancellationToken,
    current: CancellationToken,
}

impl CycleScope {
    fn new(parent: CancellationToken) -> Self {
        let current = parent.child_token();
        Self { parent, current }
    }
}

impl<S: DashboardSource> DashboardAggregator<S> {
    pub fn new(source: Arc<S>, session: SessionManager) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            source,
            session,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            state,
            next_generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            scope: Mutex::new(CycleScope::new(CancellationToken::new())),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Run one cycle now, sharing state with the automatic refresh.
    pub async fn refresh(&self) -> CycleOutcome {
        if !self.session.is_authenticated() {
            return CycleOutcome::Unauthenticated;
        }
        let scope = self.current_scope();
        self.run_cycle(&scope).await
    }

    /// Drop every in-flight cycle. Later cycles run normally.
    pub fn cancel_in_flight(&self) {
        let mut scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = scope.parent.child_token();
        std::mem::replace(&mut scope.current, fresh).cancel();
    }

    /// Auto-refresh loop. Returns once `shutdown` is cancelled.
    ///
    /// Spawn it as a background task:
    /// ```rust,ignore
    /// tokio::spawn(aggregator.clone().run(shutdown.clone()));
    /// ```
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken)
    where
        S: 'static,
    {
        info!(
            interval_secs = self.refresh_interval.as_secs(),
            "Dashboard aggregator starting"
        );
        {
            let mut scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
            *scope = CycleScope::new(shutdown.clone());
        }
        let mut auth = self.session.subscribe();

        loop {
            tokio::select! {
                authenticated = wait_for_login(&mut auth) => {
                    if !authenticated {
                        info!("Session channel closed, dashboard aggregator stopping");
                        return;
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Dashboard aggregator shutting down");
                    return;
                }
            }

            loop {
                let scope = self.current_scope();
                self.run_cycle(&scope).await;

                tokio::select! {
                    _ = tokio::time::sleep(self.refresh_interval) => {},
                    _ = session_ended(&mut auth) => break,
                    _ = shutdown.cancelled() => {
                        info!("Dashboard aggregator shutting down");
                        return;
                    }
                }
            }

            info!("Session ended, dashboard refresh paused");
            self.reset();
        }
    }

    async fn run_cycle(&self, cancel: &CancellationToken) -> CycleOutcome {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| state.loading = true);
        debug!(generation, "Dashboard refresh cycle started");

        let mut auth = self.session.subscribe();
        let fetched = tokio::select! {
            _ = cancel.cancelled() => None,
            _ = session_ended(&mut auth) => None,
            results = async {
                tokio::join!(self.source.instance_summary(), self.source.cost_estimate())
            } => Some(results),
        };
        let still_running = self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1;

        // Results fetched for a session that has since ended are never committed
        let results = match fetched {
            Some(results) if self.session.is_authenticated() => results,
            _ => {
                self.state.send_modify(|state| state.loading = still_running);
                info!(generation, "Dashboard refresh cycle cancelled");
                return CycleOutcome::Cancelled { generation };
            }
        };

        let result = match results {
            (Ok(instance_summary), Ok(cost_estimate)) => Ok(LiveData {
                instance_summary,
                cost_estimate,
            }),
            (Err(error), _) | (_, Err(error)) => Err(error),
        };

        let mut outcome = CycleOutcome::Stale { generation };
        self.state.send_modify(|state| {
            state.loading = still_running;
            if generation < state.generation {
                return;
            }
            state.generation = generation;
            match result {
                Ok(live) => {
                    state.data.merge(live);
                    state.error = None;
                    state.last_updated = Some(next_timestamp(state.last_updated));
                    outcome = CycleOutcome::Committed { generation };
                }
                Err(error) => {
                    state.error = Some(error.clone());
                    outcome = CycleOutcome::Failed { generation, error };
                }
            }
        });

        match &outcome {
            CycleOutcome::Committed { .. } => {
                info!(generation, "Dashboard data refreshed");
            }
            CycleOutcome::Failed { error, .. } => {
                warn!(generation, code = %error.code, error = %error.message, "Dashboard refresh failed");
            }
            CycleOutcome::Stale { .. } => {
                debug!(generation, "Discarded stale dashboard refresh");
            }
            CycleOutcome::Cancelled { .. } | CycleOutcome::Unauthenticated => {}
        }
        outcome
    }

    fn reset(&self) {
        let still_running = self.in_flight.load(Ordering::SeqCst) > 0;
        self.state.send_modify(|state| {
            *state = DashboardState {
                loading: still_running,
                generation: state.generation,
                ..DashboardState::default()
            };
        });
    }

    fn current_scope(&self) -> CancellationToken {
        self.scope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }
}

/// Resolves `true` once authenticated, `false` if the session is gone.
async fn wait_for_login(auth: &mut watch::Receiver<AuthSnapshot>) -> bool {
    auth.wait_for(AuthSnapshot::is_authenticated).await.is_ok()
}

/// Resolves once the session is no longer authenticated.
async fn session_ended(auth: &mut watch::Receiver<AuthSnapshot>) {
    let _ = auth.wait_for(|snapshot| !snapshot.is_authenticated()).await;
}

/// Strictly later than `previous`, even if the clock has not advanced.
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}
