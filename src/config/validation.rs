//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic deserialization. Runs before
//! a config is accepted into the system, both at startup and on hot reload.
//! All errors are collected and returned together, not just the first.

use std::net::SocketAddr;
use crate::config::schema::GateConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "upstream.replicas").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("not a valid socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(err("listener.max_connections", "must be greater than zero"));
    }

    if config.upstream.replicas.is_empty() {
        errors.push(err("upstream.replicas", "at least one replica is required"));
    }
    for (i, replica) in config.upstream.replicas.iter().enumerate() {
        if replica.parse::<SocketAddr>().is_err() {
            errors.push(err(
                &format!("upstream.replicas[{}]", i),
                format!("not a valid socket address: {:?}", replica),
            ));
        }
    }
    if config.upstream.unhealthy_threshold == 0 {
        errors.push(err("upstream.unhealthy_threshold", "must be greater than zero"));
    }
    if config.upstream.healthy_threshold == 0 {
        errors.push(err("upstream.healthy_threshold", "must be greater than zero"));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(err("timeouts.connect_secs", "must be greater than zero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be greater than zero"));
    }

    match url::Url::parse(&config.store.base_url) {
        Ok(parsed) => {
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                errors.push(err(
                    "store.base_url",
                    format!("unsupported scheme: {:?}", parsed.scheme()),
                ));
            }
        }
        Err(e) => {
            errors.push(err("store.base_url", format!("not a valid URL: {}", e)));
        }
    }
    if config.store.timeout_secs == 0 {
        errors.push(err("store.timeout_secs", "must be greater than zero"));
    }
    if config.store.retry.base_delay_ms == 0 {
        errors.push(err("store.retry.base_delay_ms", "must be greater than zero"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second == 0 {
            errors.push(err("rate_limit.requests_per_second", "must be greater than zero"));
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(err("rate_limit.burst_size", "must be greater than zero"));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(err("security.max_body_size", "must be greater than zero"));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => {
            errors.push(err(
                "observability.log_format",
                format!("expected \"pretty\" or \"json\", got {:?}", other),
            ));
        }
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(err(
            "observability.metrics_address",
            format!("not a valid socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(err(
                "admin.bind_address",
                format!("not a valid socket address: {:?}", config.admin.bind_address),
            ));
        }
        if config.admin.api_key.is_empty() || config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
            errors.push(err("admin.api_key", "must be set to a real key when admin is enabled"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GateConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_replicas_rejected() {
        let mut config = GateConfig::default();
        config.upstream.replicas.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "upstream.replicas"));
    }

    #[test]
    fn bad_replica_address_rejected() {
        let mut config = GateConfig::default();
        config.upstream.replicas = vec!["not-an-address".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "upstream.replicas[0]"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = GateConfig::default();
        config.timeouts.request_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "timeouts.request_secs"));
    }

    #[test]
    fn all_errors_collected() {
        let mut config = GateConfig::default();
        config.upstream.replicas.clear();
        config.timeouts.request_secs = 0;
        config.store.retry.base_delay_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn enabled_admin_requires_real_key() {
        let mut config = GateConfig::default();
        config.admin.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "admin.api_key"));
    }

    #[test]
    fn bad_store_url_rejected() {
        let mut config = GateConfig::default();
        config.store.base_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "store.base_url"));
    }
}
