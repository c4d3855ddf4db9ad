//! Replica pool with round-robin selection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::schema::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::replica::Replica;

/// The page-rendering replica pool.
#[derive(Debug)]
pub struct UpstreamPool {
    replicas: Vec<Arc<Replica>>,
    counter: AtomicUsize,
    unhealthy_threshold: usize,
    healthy_threshold: usize,
}

impl UpstreamPool {
    /// Build the pool from configuration. Unparseable addresses are
    /// skipped with a warning; validation normally rejects them earlier.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let mut replicas = Vec::with_capacity(config.replicas.len());
        for address in &config.replicas {
            match address.parse() {
                Ok(addr) => replicas.push(Arc::new(Replica::new(addr))),
                Err(_) => tracing::warn!(address = %address, "Invalid replica address, skipping"),
            }
        }

        Self {
            replicas,
            counter: AtomicUsize::new(0),
            unhealthy_threshold: config.unhealthy_threshold as usize,
            healthy_threshold: config.healthy_threshold as usize,
        }
    }

    /// Select the next replica, rotating past ones marked down.
    ///
    /// When every replica is down, falls back to plain rotation so traffic
    /// keeps probing for recovery. Returns None only on an empty pool.
    pub fn select(&self) -> Option<Arc<Replica>> {
        if self.replicas.is_empty() {
            return None;
        }

        let start = self.counter.fetch_add(1, Ordering::Relaxed);
        let len = self.replicas.len();

        for i in 0..len {
            let replica = &self.replicas[(start + i) % len];
            if replica.is_eligible() {
                return Some(replica.clone());
            }
        }

        tracing::warn!("All replicas marked down, falling back to rotation");
        Some(self.replicas[start % len].clone())
    }

    /// Feed back a successful proxy attempt.
    pub fn mark_success(&self, replica: &Replica) {
        if replica.mark_success(self.healthy_threshold) {
            tracing::info!(replica = %replica.addr, "Replica recovered");
        }
        metrics::record_replica_health(&replica.addr.to_string(), true);
    }

    /// Feed back a failed proxy attempt.
    pub fn mark_failure(&self, replica: &Replica) {
        if replica.mark_failure(self.unhealthy_threshold) {
            tracing::warn!(replica = %replica.addr, "Replica marked down");
        }
        metrics::record_replica_health(&replica.addr.to_string(), false);
    }

    /// All replicas, for the admin API.
    pub fn replicas(&self) -> &[Arc<Replica>] {
        &self.replicas
    }
}
