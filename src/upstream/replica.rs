//! Upstream replica and its health state machine.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Health state of a replica.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

impl HealthState {
    /// Stable label for logs and the admin API.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

/// A single page-rendering replica.
#[derive(Debug)]
pub struct Replica {
    pub addr: SocketAddr,
    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
}

impl Replica {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
        }
    }

    pub fn health_state(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Relaxed))
    }

    /// True unless the replica is marked down. Unknown counts as eligible.
    pub fn is_eligible(&self) -> bool {
        self.state.load(Ordering::Relaxed) != HealthState::Unhealthy as u8
    }

    /// Report a successful proxy attempt. Returns true on the transition
    /// back to healthy.
    pub fn mark_success(&self, healthy_threshold: usize) -> bool {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        if self.state.load(Ordering::Relaxed) == HealthState::Healthy as u8 {
            return false;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= healthy_threshold {
            self.state.store(HealthState::Healthy as u8, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Report a failed proxy attempt. Returns true on the transition to
    /// unhealthy.
    pub fn mark_failure(&self, unhealthy_threshold: usize) -> bool {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        if self.state.load(Ordering::Relaxed) == HealthState::Unhealthy as u8 {
            return false;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= unhealthy_threshold {
            self.state.store(HealthState::Unhealthy as u8, Ordering::Relaxed);
            return true;
        }
        false
    }
}
