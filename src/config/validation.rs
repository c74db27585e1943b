//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (fees > 0, timeouts > 0, URLs parse)
//! - Warn about unbounded waits that are legal but risky
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure apart from warnings:
//!   ClientConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::{BackoffKind, ClientConfig};
use crate::network::Network;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config` and return every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.rpc.url) {
        errors.push(ValidationError::new("rpc.url", format!("invalid URL '{}': {}", config.rpc.url, e)));
    }
    for failover in &config.rpc.failover_urls {
        if let Err(e) = url::Url::parse(failover) {
            errors.push(ValidationError::new(
                "rpc.failover_urls",
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be greater than 0"));
    }

    if config.network.passphrase.is_none() && Network::preset(&config.network.name).is_none() {
        errors.push(ValidationError::new(
            "network.name",
            format!("unknown network '{}' requires a passphrase", config.network.name),
        ));
    }
    if config.network.passphrase.as_deref() == Some("") {
        errors.push(ValidationError::new("network.passphrase", "must not be empty"));
    }

    if config.transaction.base_fee <= 0 {
        errors.push(ValidationError::new("transaction.base_fee", "must be greater than 0"));
    }
    if config.transaction.base_fee > i64::from(u32::MAX) {
        errors.push(ValidationError::new("transaction.base_fee", "must fit in 32 bits"));
    }

    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new("polling.interval_ms", "must be greater than 0"));
    }
    if config.polling.max_attempts == Some(0) {
        errors.push(ValidationError::new("polling.max_attempts", "must be at least 1 when set"));
    }
    if config.polling.backoff == BackoffKind::Exponential
        && config.polling.max_backoff_ms < config.polling.interval_ms
    {
        errors.push(ValidationError::new(
            "polling.max_backoff_ms",
            "must not be below polling.interval_ms",
        ));
    }

    if config.signer.secret_key_env.is_empty() {
        errors.push(ValidationError::new("signer.secret_key_env", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if config.transaction.timeout_secs == 0 {
        tracing::warn!("transaction.timeout_secs is 0: envelopes stay valid indefinitely");
    }
    if config.polling.max_attempts.is_none() {
        tracing::warn!("polling.max_attempts is unset: confirmation waits are unbounded");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
