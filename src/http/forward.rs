//! Upstream request forwarding.
//!
//! Requests that survive the guard get streamed to a page-rendering
//! replica. Bodies are not buffered and failed forwards are not retried
//! here; a browser in front of the gateway re-issues page loads itself,
//! and only the document store client retries (with backoff) on its own
//! channel.
//!
//! # Data Flow
//!
//! ```text
//! guarded request
//!     |
//!     v
//! select replica (round-robin, skip unhealthy)
//!     |
//!     v
//! rewrite URI -> http://<replica><path?query>
//!     |
//!     v
//! stream request / response through hyper client
//!     |
//!     +-- 502/503/504 or transport error -> mark_failure
//!     +-- anything else -> mark_success
//! ```

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Forward a guarded request to the next eligible replica.
pub async fn forward_handler(
    State(state): State<AppState>,
    ConnectInfo(_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> impl IntoResponse {
    let start_time = Instant::now();
    let inner = state.inner.load_full();
    inner.request_count.fetch_add(1, Ordering::Relaxed);

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method_str = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method_str,
        path = %path,
        "Forwarding request"
    );

    let replica = match inner.upstream.select() {
        Some(r) => r,
        None => {
            tracing::warn!(request_id = %request_id, "No upstream replicas configured");
            metrics::record_request(&method_str, 503, "none", start_time);
            return (StatusCode::SERVICE_UNAVAILABLE, "No upstream replicas").into_response();
        }
    };
    let replica_addr = replica.addr.to_string();

    let (mut parts, body) = request.into_parts();

    // Absolute-form URI for the client, keeping path and query intact.
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    if let Ok(authority) = Authority::from_str(&replica_addr) {
        uri_parts.authority = Some(authority);
    }
    if let Ok(uri) = Uri::from_parts(uri_parts) {
        parts.uri = uri;
    }

    let upstream_request = Request::from_parts(parts, body);

    match inner.client.request(upstream_request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method_str, status.as_u16(), &replica_addr, start_time);

            // Passive health: only gateway-class errors count against the replica.
            match status {
                StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT => {
                    inner.upstream.mark_failure(&replica);
                }
                _ => {
                    inner.upstream.mark_success(&replica);
                }
            }

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                replica = %replica_addr,
                error = %err,
                "Upstream request error"
            );
            metrics::record_request(&method_str, 502, &replica_addr, start_time);
            inner.upstream.mark_failure(&replica);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
