//! Read-only admin handlers.

use std::sync::atomic::Ordering;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub total_requests: usize,
}

#[derive(Serialize)]
pub struct ReplicaStatus {
    pub address: String,
    pub state: &'static str,
}

#[derive(Serialize)]
pub struct StoreHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let inner = state.inner.load();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: inner.started_at.elapsed().as_secs(),
        total_requests: inner.request_count.load(Ordering::Relaxed),
    })
}

pub async fn get_upstreams(State(state): State<AppState>) -> Json<Vec<ReplicaStatus>> {
    let inner = state.inner.load();
    let statuses = inner
        .upstream
        .replicas()
        .iter()
        .map(|r| ReplicaStatus {
            address: r.addr.to_string(),
            state: r.health_state().as_str(),
        })
        .collect();
    Json(statuses)
}

pub async fn get_store(State(state): State<AppState>) -> Json<StoreHealth> {
    // Clone the client out so the hot-state guard is not held across the probe.
    let store = state.inner.load().store.clone();
    match store.ping().await {
        Ok(()) => Json(StoreHealth {
            reachable: true,
            error_kind: None,
            error: None,
        }),
        Err(err) => Json(StoreHealth {
            reachable: false,
            error_kind: Some(err.kind().as_str()),
            error: Some(err.message().to_string()),
        }),
    }
}
