//! Per-IP rate limiting middleware.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::schema::RateLimitConfig;
use crate::http::server::AppState;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Bucket table plus the timestamp of the last prune sweep.
struct BucketMap {
    by_ip: HashMap<IpAddr, TokenBucket>,
    last_prune: Instant,
}

/// Per-IP token buckets. Rebuilt (and reset) on config reload; buckets
/// idle past a full refill are pruned so the map only holds recently
/// active addresses.
pub struct RateLimiterState {
    buckets: Mutex<BucketMap>,
    requests_per_second: f64,
    burst_size: f64,
    enabled: bool,
}

impl RateLimiterState {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(BucketMap {
                by_ip: HashMap::new(),
                last_prune: Instant::now(),
            }),
            requests_per_second: config.requests_per_second as f64,
            burst_size: config.burst_size as f64,
            enabled: config.enabled,
        }
    }

    /// Time for an empty bucket to refill completely. Buckets idle at
    /// least this long are indistinguishable from fresh ones and can
    /// be dropped.
    fn idle_cutoff(&self) -> Duration {
        let refill_secs = if self.requests_per_second > 0.0 {
            (self.burst_size / self.requests_per_second).max(1.0)
        } else {
            1.0
        };
        Duration::from_secs_f64(refill_secs)
    }

    /// Check whether a request from `ip` may proceed. Idle entries are
    /// swept at most once per refill period.
    pub fn check(&self, ip: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");

        let now = Instant::now();
        let cutoff = self.idle_cutoff();
        if now.duration_since(buckets.last_prune) >= cutoff {
            buckets
                .by_ip
                .retain(|_, bucket| now.duration_since(bucket.last_update) < cutoff);
            buckets.last_prune = now;
        }

        let bucket = buckets
            .by_ip
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(self.burst_size));

        bucket.try_acquire(self.burst_size, self.requests_per_second)
    }

    /// Number of addresses currently holding a bucket.
    pub fn tracked_ips(&self) -> usize {
        self.buckets
            .lock()
            .expect("rate limiter mutex poisoned")
            .by_ip
            .len()
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Drop the hot-state guard before awaiting downstream.
    let allowed = { state.inner.load().limiter.check(addr.ip()) };
    if allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %addr.ip(), "Rate limit exceeded");
        metrics::record_rate_limited("per_ip");
        let mut response = Response::new(Body::from("Rate limit exceeded"));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}
